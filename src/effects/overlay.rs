//! Gradient and grid overlay that visualises the processing level.
//!
//! This is cosmetic feedback, not image processing: with no live feed to
//! transform (desktop mode), the overlay is what shows the slider moving.

use crate::level::ProcessingLevel;
use crate::raster::{Raster, BYTES_PER_PIXEL};

/// Colours used by the overlay. Alpha comes from the level, not the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Gradient colour at the top-left corner
    pub start: [u8; 3],
    /// Gradient colour halfway along the diagonal
    pub mid: [u8; 3],
    /// Gradient colour at the bottom-right corner
    pub end: [u8; 3],
    /// Grid line colour
    pub grid: [u8; 3],
    /// Whether to draw grid lines above the threshold
    pub grid_enabled: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            start: [0, 200, 255],
            mid: [255, 255, 255],
            end: [160, 0, 255],
            grid: [255, 255, 255],
            grid_enabled: true,
        }
    }
}

/// Composite `color` with coverage `alpha` over a destination sample
/// (source-over, straight alpha).
fn blend_over(dst: &mut [u8], color: [u8; 3], alpha: f32) {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let src_c = color[c] as f32 / 255.0;
        let dst_c = dst[c] as f32 / 255.0;
        let out_c = (src_c * alpha + dst_c * dst_a * (1.0 - alpha)) / out_a;
        dst[c] = (out_c * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Colour and alpha of the three-stop gradient at position `t` in [0, 1].
fn gradient_at(style: &OverlayStyle, outer: f32, mid: f32, t: f32) -> ([u8; 3], f32) {
    let (from, to, from_a, to_a, local) = if t <= 0.5 {
        (style.start, style.mid, outer, mid, t * 2.0)
    } else {
        (style.mid, style.end, mid, outer, (t - 0.5) * 2.0)
    };
    let color = [
        lerp(from[0] as f32, to[0] as f32, local).round() as u8,
        lerp(from[1] as f32, to[1] as f32, local).round() as u8,
        lerp(from[2] as f32, to[2] as f32, local).round() as u8,
    ];
    (color, lerp(from_a, to_a, local))
}

/// Paint the level overlay onto `target` with the default style.
///
/// See [`render_overlay_styled`].
pub fn render_overlay(target: &mut Raster, level: ProcessingLevel) {
    render_overlay_styled(target, level, &OverlayStyle::default());
}

/// Paint a diagonal three-stop gradient over the whole raster and, for
/// effective levels, a grid of 1px lines.
///
/// Outer stops use alpha `0.1 * (level - 1)`, the middle stop
/// `0.05 * (level - 1)`. At level 1.0 the raster is left bit-for-bit
/// unchanged. Grid lines sit on every multiple of
/// [`ProcessingLevel::grid_spacing`] and use the outer-stop alpha.
pub fn render_overlay_styled(target: &mut Raster, level: ProcessingLevel, style: &OverlayStyle) {
    let outer = level.outer_alpha();
    let mid = level.mid_alpha();
    if outer <= 0.0 || target.is_empty() {
        return;
    }

    let (width, height) = target.dimensions();
    let draw_grid = style.grid_enabled && level.is_effective();
    let spacing = level.grid_spacing();
    // Project each pixel onto the top-left -> bottom-right diagonal
    let span = (width.saturating_sub(1) + height.saturating_sub(1)).max(1) as f32;
    let stride = width as usize * BYTES_PER_PIXEL;
    let data = target.as_bytes_mut();

    for y in 0..height {
        for x in 0..width {
            let i = y as usize * stride + x as usize * BYTES_PER_PIXEL;
            let px = &mut data[i..i + BYTES_PER_PIXEL];

            let t = (x + y) as f32 / span;
            let (color, alpha) = gradient_at(style, outer, mid, t);
            blend_over(px, color, alpha);

            if draw_grid && (x % spacing == 0 || y % spacing == 0) {
                blend_over(px, style.grid, outer);
            }
        }
    }
}
