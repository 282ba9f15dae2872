//! CLI enum types.

use clap::ValueEnum;

/// Where the live loop takes its frames from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceArg {
    /// No capturable input; paint the level overlay
    #[default]
    Desktop,
    /// Replay an image file as the camera feed (needs --image)
    Still,
    /// System webcam (needs the native-camera feature)
    Camera,
}

impl SourceArg {
    pub fn uses_camera(self) -> bool {
        !matches!(self, SourceArg::Desktop)
    }
}
