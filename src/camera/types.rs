//! Camera types and data structures.

use std::fmt;

use crate::source::SourceKind;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Medium resolution (640x480) - balanced, recommended
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true, // Default to selfie mode
        }
    }
}

/// Errors that can occur while acquiring or running a camera.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("No cameras found")]
    NoDevices,
    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),
    #[error("Failed to open camera: {0}")]
    OpenFailed(String),
    #[error("Camera permission denied. Grant camera access in your system privacy settings")]
    PermissionDenied,
    #[error("Camera device {0} not found. Run 'list-cameras' to see available devices")]
    DeviceNotFound(u32),
    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
    #[error("Provider returned a {0} source instead of a camera")]
    NotACamera(SourceKind),
    #[error("Camera image unavailable: {0}")]
    ImageUnavailable(String),
    #[error("Native camera support not compiled in (enable the `native-camera` feature)")]
    Unsupported,
}
