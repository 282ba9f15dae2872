//! A "camera" that replays a single still image.
//!
//! Lets the camera path run on machines without a webcam, and gives the
//! CLI a way to feed a file through the live pipeline.

use super::frame_utils::mirror_horizontal;
use super::{CameraError, CameraProvider};
use crate::raster::Raster;
use crate::source::{FrameSource, SourceKind};

/// Provider handing out sources that repeat one image.
#[derive(Debug, Clone)]
pub struct StillCamera {
    image: Raster,
    mirror: bool,
}

impl StillCamera {
    pub fn new(image: Raster, mirror: bool) -> Self {
        Self { image, mirror }
    }
}

impl CameraProvider for StillCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        if self.image.is_empty() {
            return Err(CameraError::ImageUnavailable(format!(
                "image is {}x{}",
                self.image.width(),
                self.image.height()
            )));
        }
        let mut frame = self.image.clone();
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        log::debug!(
            "Still camera acquired ({}x{}, mirror={})",
            frame.width(),
            frame.height(),
            self.mirror
        );
        Ok(Box::new(StillSource {
            frame: Some(frame),
        }))
    }
}

/// Source returned by [`StillCamera`]. Yields nothing once released.
#[derive(Debug)]
struct StillSource {
    frame: Option<Raster>,
}

impl FrameSource for StillSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    fn current_frame(&mut self) -> Option<Raster> {
        self.frame.clone()
    }

    fn release(&mut self) {
        self.frame = None;
    }
}
