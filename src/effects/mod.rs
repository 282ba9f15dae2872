//! Frame effects for the voxel upscaler.
//!
//! Two effects are applied by the frame pipeline:
//!
//! 1. **Pixelation** - nearest-neighbor downsample then upsample back to the
//!    source size, giving the blocky "voxel" look
//! 2. **Overlay** - a translucent gradient plus grid whose opacity follows
//!    the processing level, drawn when there is no live feed to transform
//!
//! Pixelation is only meaningful above [`EFFECT_THRESHOLD`]; use
//! [`voxelize`] to get the thresholded behaviour the pipeline relies on.

mod overlay;
mod pixelate;

pub use overlay::{render_overlay, render_overlay_styled, OverlayStyle};
pub use pixelate::{downsample_dimensions, pixelate, resample_nearest};

use crate::level::{ProcessingLevel, EFFECT_THRESHOLD};
use crate::raster::Raster;

/// Errors raised by the pixel effects.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EffectError {
    /// Source raster has zero width or height
    #[error("cannot process a {width}x{height} raster")]
    InvalidRaster { width: u32, height: u32 },
    /// Scale factor is not finite or below 1.0
    #[error("pixelation scale must be a finite number >= 1.0, got {0}")]
    InvalidScale(f32),
}

/// Apply the voxel effect for a processing level.
///
/// Levels at or below [`EFFECT_THRESHOLD`] return an identical copy of the
/// source; higher levels pixelate with `scale = level`.
pub fn voxelize(source: &Raster, level: ProcessingLevel) -> Result<Raster, EffectError> {
    if level.value() <= EFFECT_THRESHOLD {
        return Ok(source.clone());
    }
    pixelate(source, level.value())
}
