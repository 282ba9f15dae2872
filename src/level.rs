//! The user-controlled upscale intensity.

use std::fmt;

/// Levels at or below this value are treated as "no upscale".
///
/// Note the mismatch with [`ProcessingLevel::NONE`]: a level of 1.05 still
/// tints the overlay gradient but neither pixelates nor draws the grid.
pub const EFFECT_THRESHOLD: f32 = 1.1;

/// Errors raised when a slider value cannot be used as a level.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LevelError {
    #[error("level must be a finite number, got {0}")]
    NotFinite(f32),
    #[error("level must not be negative, got {0}")]
    Negative(f32),
}

/// Upscale intensity. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ProcessingLevel(f32);

impl ProcessingLevel {
    /// The neutral level.
    pub const NONE: ProcessingLevel = ProcessingLevel(1.0);

    pub fn new(value: f32) -> Result<Self, LevelError> {
        if !value.is_finite() {
            return Err(LevelError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(LevelError::Negative(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Whether this level is above [`EFFECT_THRESHOLD`].
    pub fn is_effective(self) -> bool {
        self.0 > EFFECT_THRESHOLD
    }

    /// Alpha for the outer gradient stops and the grid lines.
    pub fn outer_alpha(self) -> f32 {
        (0.1 * (self.0 - 1.0)).clamp(0.0, 1.0)
    }

    /// Alpha for the middle gradient stop.
    pub fn mid_alpha(self) -> f32 {
        (0.05 * (self.0 - 1.0)).clamp(0.0, 1.0)
    }

    /// Distance in pixels between grid lines.
    pub fn grid_spacing(self) -> u32 {
        ((self.0 * 4.0).floor() as u32).max(2)
    }
}

impl Default for ProcessingLevel {
    fn default() -> Self {
        Self::NONE
    }
}

impl TryFrom<f32> for ProcessingLevel {
    type Error = LevelError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ProcessingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}
