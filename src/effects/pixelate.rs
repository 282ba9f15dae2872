//! Nearest-neighbor pixelation.

use super::EffectError;
use crate::raster::{Raster, BYTES_PER_PIXEL};

/// Size of the intermediate raster for a given scale.
///
/// Each axis is `floor(len / scale)`, never less than one pixel.
pub fn downsample_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let shrink = |len: u32| ((len as f64 / scale as f64).floor() as u32).max(1);
    (shrink(width), shrink(height))
}

/// Map a destination index to the source index whose pixel center is
/// closest, without blending.
fn nearest_index(dst: u32, dst_len: u32, src_len: u32) -> u32 {
    // floor((dst + 0.5) * src_len / dst_len) in integer arithmetic
    let idx = ((2 * dst as u64 + 1) * src_len as u64) / (2 * dst_len as u64);
    idx.min(src_len as u64 - 1) as u32
}

/// Resize a raster with nearest-neighbor sampling.
///
/// No smoothing is applied, so upscaling produces hard-edged blocks.
/// Returns [`EffectError::InvalidRaster`] if either raster would have zero area.
pub fn resample_nearest(source: &Raster, width: u32, height: u32) -> Result<Raster, EffectError> {
    if source.is_empty() {
        return Err(EffectError::InvalidRaster {
            width: source.width(),
            height: source.height(),
        });
    }
    if width == 0 || height == 0 {
        return Err(EffectError::InvalidRaster { width, height });
    }
    if source.dimensions() == (width, height) {
        return Ok(source.clone());
    }

    let (src_w, src_h) = source.dimensions();
    let src = source.as_bytes();
    let src_stride = src_w as usize * BYTES_PER_PIXEL;

    // Column lookup is the same for every row
    let columns: Vec<usize> = (0..width)
        .map(|x| nearest_index(x, width, src_w) as usize * BYTES_PER_PIXEL)
        .collect();

    let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
    for y in 0..height {
        let row_start = nearest_index(y, height, src_h) as usize * src_stride;
        let row = &src[row_start..row_start + src_stride];
        for &col in &columns {
            data.extend_from_slice(&row[col..col + BYTES_PER_PIXEL]);
        }
    }

    Raster::from_rgba(width, height, data).map_err(|_| EffectError::InvalidRaster { width, height })
}

/// Pixelate a raster by shrinking it by `scale` and blowing it back up.
///
/// The output always has the source's dimensions. The source is left
/// untouched. Callers decide whether a level is high enough to bother;
/// see [`super::voxelize`].
///
/// # Errors
/// * [`EffectError::InvalidRaster`] - source has zero width or height
/// * [`EffectError::InvalidScale`] - scale is not finite or below 1.0
pub fn pixelate(source: &Raster, scale: f32) -> Result<Raster, EffectError> {
    if !scale.is_finite() || scale < 1.0 {
        return Err(EffectError::InvalidScale(scale));
    }
    if source.is_empty() {
        return Err(EffectError::InvalidRaster {
            width: source.width(),
            height: source.height(),
        });
    }

    let (width, height) = source.dimensions();
    let (small_w, small_h) = downsample_dimensions(width, height, scale);
    let small = resample_nearest(source, small_w, small_h)?;
    resample_nearest(&small, width, height)
}
