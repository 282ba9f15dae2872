//! Configuration file handling for voxel-upscaler.
//!
//! Loads configuration from `<config dir>/voxel-upscaler/config.toml` or a
//! custom path given with `--config`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{CameraSettings, Resolution};
use crate::effects::OverlayStyle;
use crate::level::ProcessingLevel;

/// Level used by `pixelate` and `overlay` when neither `--level` nor the
/// config file sets one.
pub const DEFAULT_STILL_LEVEL: f32 = 2.0;

/// Default contents written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# voxel-upscaler configuration

[pipeline]
# Upscale level used when --level is not given (effects kick in above 1.1).
# Unset, `pixelate` and `overlay` use 2.0 and `run` starts at 1.0.
# level = 2.0
# Display refreshes per second for the live loop
fps = 30

[surface]
# Canvas size used in desktop mode
width = 640
height = 480

[camera]
device = 0
mirror = true
width = 640
height = 480
fps = 30

[overlay]
# Draw grid lines above level 1.1
grid = true
"#;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub level: Option<f32>,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            level: None,
            fps: default_fps(),
        }
    }
}

impl PipelineConfig {
    /// Level for the one-shot image commands.
    pub fn still_level(&self) -> f32 {
        self.level.unwrap_or(DEFAULT_STILL_LEVEL)
    }

    /// Starting level for the live loop.
    pub fn live_level(&self) -> f32 {
        self.level.unwrap_or(ProcessingLevel::NONE.value())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SurfaceConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: true,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

impl CameraConfig {
    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            device_index: self.device,
            resolution: Resolution {
                width: self.width,
                height: self.height,
            },
            fps: self.fps,
            mirror: self.mirror,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OverlayConfig {
    #[serde(default = "default_true")]
    pub grid: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { grid: true }
    }
}

impl OverlayConfig {
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            grid_enabled: self.grid,
            ..OverlayStyle::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fps() -> u32 {
    30
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

impl Config {
    /// Load configuration from a file path, or the default location.
    ///
    /// A missing default file yields the default config. A path passed
    /// explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::read(path)
            }
            None => {
                let path = default_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    log::debug!("No config at {}, using defaults", path.display());
                    Ok(Config::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound(_) => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("voxel-upscaler").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/voxel-upscaler/config.toml")
        })
}
