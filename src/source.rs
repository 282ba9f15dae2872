//! Frame sources feeding the pipeline.

use std::fmt;

use crate::raster::Raster;

/// What kind of input a [`FrameSource`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Live camera frames, transformed by the pixelation effect
    Camera,
    /// No capturable input; the overlay is painted synthetically
    SyntheticDesktop,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::SyntheticDesktop => write!(f, "desktop"),
        }
    }
}

/// Anything that can produce the current frame.
///
/// Acquired when processing starts and released when it stops.
pub trait FrameSource {
    fn kind(&self) -> SourceKind;

    /// Latest frame, or `None` if nothing is available yet.
    fn current_frame(&mut self) -> Option<Raster>;

    /// Give back any underlying device. Called once when processing stops.
    fn release(&mut self) {}
}

/// Desktop background that cannot be captured.
///
/// It never yields a frame; the pipeline paints the overlay directly on
/// the surface instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticDesktopSource;

impl FrameSource for SyntheticDesktopSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SyntheticDesktop
    }

    fn current_frame(&mut self) -> Option<Raster> {
        None
    }
}
