//! Frame conversion and transformation utilities.

use crate::raster::{Raster, BYTES_PER_PIXEL};

/// Convert a nokhwa buffer to an opaque RGBA raster.
///
/// Handles the camera's native format (MJPEG, YUYV, NV12, ...) through
/// nokhwa's decoder. Returns `None` if decoding fails.
#[cfg(feature = "native-camera")]
pub fn convert_to_raster(buffer: &nokhwa::Buffer) -> Option<Raster> {
    use nokhwa::pixel_format::RgbFormat;

    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();
    Raster::from_rgb(resolution.width(), resolution.height(), decoded.as_raw()).ok()
}

/// Mirror a raster horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(raster: &mut Raster) {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let bpp = BYTES_PER_PIXEL;
    let data = raster.as_bytes_mut();

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
