//! Camera acquisition for the live pipeline.
//!
//! This module provides:
//! - The [`CameraProvider`] capability the controller acquires sources from
//! - [`StillCamera`], which replays an image file as a camera feed
//! - Native webcam capture via nokhwa ([`NativeCamera`], [`CameraCapture`],
//!   [`list_devices`]) behind the `native-camera` feature

#[cfg(feature = "native-camera")]
mod capture;
#[cfg(feature = "native-camera")]
mod capture_loop;
mod frame_utils;
mod still;
mod types;

#[cfg(feature = "native-camera")]
pub use capture::{list_devices, CameraCapture, NativeCamera};
pub use frame_utils::mirror_horizontal;
pub use still::StillCamera;
pub use types::{CameraError, CameraInfo, CameraSettings, Resolution};

use crate::source::FrameSource;

/// Something that can hand out a live camera source.
///
/// Acquisition may fail (no device, permission denied); callers report the
/// failure and may try again later.
pub trait CameraProvider {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// Provider used when no camera backend is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl CameraProvider for NoCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        Err(CameraError::NoDevices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_camera_always_fails() {
        let mut provider = NoCamera;
        assert!(matches!(provider.acquire(), Err(CameraError::NoDevices)));
    }
}
