//! Still-image enhancement through an opaque super-resolution model.
//!
//! The model itself is a black box behind [`Enhancer`]. This module owns
//! the parts around it: decoding the picked file, turning a raster into a
//! normalised NHWC tensor, and turning the prediction back into pixels.

use std::path::{Path, PathBuf};

use ndarray::{Array4, Axis};

use crate::raster::Raster;

/// Errors raised on the enhancement path.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("no image loaded")]
    NoImage,
    #[error("model produced a tensor of shape {0:?}, expected [1, height, width, 3]")]
    ShapeMismatch(Vec<usize>),
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("failed to read image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A model mapping a `[1, H, W, 3]` tensor of values in [0, 1] to another
/// tensor of the same layout (usually larger in H and W).
pub trait Enhancer {
    fn name(&self) -> &str;

    fn predict(&self, input: Array4<f32>) -> Result<Array4<f32>, EnhanceError>;
}

/// Stand-in model that repeats every sample `factor` times per axis.
#[derive(Debug, Clone, Copy)]
pub struct NearestEnhancer {
    factor: usize,
}

impl NearestEnhancer {
    /// `factor` below 1 is treated as 1.
    pub fn new(factor: usize) -> Self {
        Self {
            factor: factor.max(1),
        }
    }

    pub fn factor(&self) -> usize {
        self.factor
    }
}

impl Enhancer for NearestEnhancer {
    fn name(&self) -> &str {
        "nearest"
    }

    fn predict(&self, input: Array4<f32>) -> Result<Array4<f32>, EnhanceError> {
        let (n, h, w, c) = input.dim();
        let f = self.factor;
        Ok(Array4::from_shape_fn((n, h * f, w * f, c), |(b, y, x, ch)| {
            input[[b, y / f, x / f, ch]]
        }))
    }
}

/// RGB channels scaled to [0, 1] with a batch axis of 1. Alpha is dropped.
pub fn raster_to_tensor(raster: &Raster) -> Array4<f32> {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let bytes = raster.as_bytes();
    Array4::from_shape_fn((1, height, width, 3), |(_, y, x, c)| {
        bytes[(y * width + x) * 4 + c] as f32 / 255.0
    })
}

/// Squeeze the batch axis, clip to [0, 1], scale to 0..=255 and truncate.
/// The result is fully opaque.
pub fn tensor_to_raster(tensor: &Array4<f32>) -> Result<Raster, EnhanceError> {
    let shape = tensor.shape().to_vec();
    if shape[0] != 1 || shape[3] != 3 {
        return Err(EnhanceError::ShapeMismatch(shape));
    }
    let image = tensor.index_axis(Axis(0), 0);
    let (height, width) = (shape[1], shape[2]);

    let mut data = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let v = image[[y, x, c]].clamp(0.0, 1.0) * 255.0;
                data.push(v as u8);
            }
            data.push(255);
        }
    }
    Raster::from_rgba(width as u32, height as u32, data)
        .map_err(|_| EnhanceError::ShapeMismatch(shape))
}

/// Run a raster through `enhancer`.
pub fn enhance_raster(raster: &Raster, enhancer: &dyn Enhancer) -> Result<Raster, EnhanceError> {
    if raster.is_empty() {
        return Err(EnhanceError::NoImage);
    }
    let input = raster_to_tensor(raster);
    log::debug!(
        "Running {} on {}x{} image",
        enhancer.name(),
        raster.width(),
        raster.height()
    );
    let output = enhancer.predict(input)?;
    let result = tensor_to_raster(&output)?;
    log::info!(
        "Enhanced {}x{} -> {}x{} with {}",
        raster.width(),
        raster.height(),
        result.width(),
        result.height(),
        enhancer.name()
    );
    Ok(result)
}

/// Decode an image file into a raster on the blocking pool.
pub async fn load_raster(path: impl AsRef<Path>) -> Result<Raster, EnhanceError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || {
        image::open(&path)
            .map(|img| Raster::from(img.to_rgba8()))
            .map_err(|source| EnhanceError::Load { path, source })
    })
    .await?
}

/// Encode a raster to disk; the format follows the file extension.
pub async fn save_raster(raster: Raster, path: impl AsRef<Path>) -> Result<(), EnhanceError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || {
        let img: image::RgbaImage = raster.into();
        img.save(&path)
            .map_err(|source| EnhanceError::Save { path, source })
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_normalises_channels() {
        let raster = Raster::from_rgba(1, 1, vec![255, 0, 51, 7]).unwrap();
        let t = raster_to_tensor(&raster);
        assert_eq!(t.dim(), (1, 1, 1, 3));
        assert_eq!(t[[0, 0, 0, 0]], 1.0);
        assert_eq!(t[[0, 0, 0, 1]], 0.0);
        assert!((t[[0, 0, 0, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_layout_is_row_major() {
        let mut raster = Raster::new(2, 1);
        raster.put_pixel(1, 0, [255, 255, 255, 255]);
        let t = raster_to_tensor(&raster);
        assert_eq!(t.dim(), (1, 1, 2, 3));
        assert_eq!(t[[0, 0, 0, 0]], 0.0);
        assert_eq!(t[[0, 0, 1, 0]], 1.0);
    }

    #[test]
    fn test_output_is_clipped_and_truncated() {
        let t = Array4::from_shape_vec((1, 1, 1, 3), vec![-0.5, 1.7, 0.999]).unwrap();
        let r = tensor_to_raster(&t).unwrap();
        // 0.999 * 255 = 254.745 truncates to 254
        assert_eq!(r.pixel(0, 0), [0, 255, 254, 255]);
    }

    #[test]
    fn test_wrong_channel_count_rejected() {
        let t = Array4::<f32>::zeros((1, 2, 2, 4));
        assert!(matches!(
            tensor_to_raster(&t),
            Err(EnhanceError::ShapeMismatch(shape)) if shape == vec![1, 2, 2, 4]
        ));
    }

    #[test]
    fn test_nearest_enhancer_doubles_dimensions() {
        let raster = Raster::filled(3, 2, [255, 0, 255, 255]);
        let out = enhance_raster(&raster, &NearestEnhancer::new(2)).unwrap();
        assert_eq!(out.dimensions(), (6, 4));
        assert_eq!(out.pixel(5, 3), [255, 0, 255, 255]);
    }

    #[test]
    fn test_nearest_enhancer_factor_floor() {
        assert_eq!(NearestEnhancer::new(0).factor(), 1);
    }

    #[test]
    fn test_empty_raster_rejected() {
        let err = enhance_raster(&Raster::new(0, 0), &NearestEnhancer::new(2)).unwrap_err();
        assert!(matches!(err, EnhanceError::NoImage));
    }

    #[tokio::test]
    async fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        let raster = Raster::filled(4, 3, [1, 2, 3, 255]);
        save_raster(raster.clone(), &path).await.unwrap();
        assert_eq!(load_raster(&path).await.unwrap(), raster);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_raster("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, EnhanceError::Load { .. }));
    }
}
