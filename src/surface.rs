//! The display surface that receives each rendered frame.

use std::path::Path;

use crate::raster::Raster;

/// Errors raised when exporting the surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface is empty, nothing to save")]
    Empty,
    #[error("failed to write {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// In-memory canvas standing in for the on-screen display.
///
/// Only the frame pipeline writes to it. Drawing a raster of a different
/// size resizes the canvas to match, the way a canvas element is sized to
/// the incoming video.
#[derive(Debug, Clone)]
pub struct Canvas {
    raster: Raster,
    presented: u64,
    video_visible: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
            presented: 0,
            video_visible: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Blank the canvas to transparent.
    pub fn clear(&mut self) {
        self.raster.clear();
    }

    /// Present a finished frame.
    pub fn draw_raster(&mut self, raster: Raster) {
        self.raster = raster;
        self.presented += 1;
    }

    /// Run a compositing closure against the canvas pixels and count it as
    /// a presented frame.
    pub fn composite<F>(&mut self, paint: F)
    where
        F: FnOnce(&mut Raster),
    {
        paint(&mut self.raster);
        self.presented += 1;
    }

    /// Current canvas contents.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Copy of the current canvas contents.
    pub fn snapshot(&self) -> Raster {
        self.raster.clone()
    }

    /// True when every sample is transparent black.
    pub fn is_blank(&self) -> bool {
        self.raster.as_bytes().iter().all(|&b| b == 0)
    }

    /// Total frames presented since creation.
    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    pub fn set_video_visible(&mut self, visible: bool) {
        self.video_visible = visible;
    }

    /// Whether the live video element is currently shown.
    pub fn video_visible(&self) -> bool {
        self.video_visible
    }

    /// Write the canvas to an image file; format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), SurfaceError> {
        if self.raster.is_empty() {
            return Err(SurfaceError::Empty);
        }
        let img: image::RgbaImage = self.raster.clone().into();
        img.save(path).map_err(|source| SurfaceError::Save {
            path: path.display().to_string(),
            source,
        })
    }
}
