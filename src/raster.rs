//! Owned RGBA pixel grids passed between pipeline stages.

/// Number of bytes per RGBA sample.
pub const BYTES_PER_PIXEL: usize = 4;

/// A single RGBA sample.
pub type Rgba = [u8; 4];

/// Fully transparent black, the value of a cleared surface.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Errors raised when building a raster from raw bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A rectangular grid of RGBA8 samples in row-major order.
///
/// A raster is owned by whichever stage currently holds it; stages that
/// need to keep a frame around clone it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Create a fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Create a raster where every sample is `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(RasterError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an opaque raster from packed RGB bytes (3 bytes per pixel).
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self, RasterError> {
        let pixels = width as usize * height as usize;
        if rgb.len() != pixels * 3 {
            return Err(RasterError::LengthMismatch {
                width,
                height,
                expected: pixels * 3,
                actual: rgb.len(),
            });
        }
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for px in rgb.chunks_exact(3) {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Read a sample. Panics when `(x, y)` is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite a sample. Panics when `(x, y)` is out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&color);
    }

    /// Reset every sample to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl From<image::RgbaImage> for Raster {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<Raster> for image::RgbaImage {
    fn from(raster: Raster) -> Self {
        let (width, height) = raster.dimensions();
        // Length is checked on every constructor, so this cannot fail.
        image::RgbaImage::from_raw(width, height, raster.data)
            .unwrap_or_else(|| image::RgbaImage::new(width, height))
    }
}
