//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::SourceArg;

/// Voxel-style pixel upscaler for images, webcams and a synthetic desktop
#[derive(Parser, Debug)]
#[command(name = "voxel-upscaler")]
#[command(version, about = "Voxel pixelation effect and live frame loop", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the voxel effect to an image file
    Pixelate {
        /// Input image
        input: PathBuf,
        /// Output image (format from extension)
        output: PathBuf,
        /// Upscale level; at or below 1.1 the image is copied unchanged
        #[arg(long, short, value_parser = parse_level)]
        level: Option<f32>,
    },
    /// Render the level overlay onto a blank canvas
    Overlay {
        /// Output image
        output: PathBuf,
        #[arg(long, short, value_parser = parse_level)]
        level: Option<f32>,
        /// Canvas width (default from config)
        #[arg(long)]
        width: Option<u32>,
        /// Canvas height (default from config)
        #[arg(long)]
        height: Option<u32>,
        /// Skip the grid lines
        #[arg(long)]
        no_grid: bool,
    },
    /// Run an image through the enhancer model
    Enhance {
        input: PathBuf,
        output: PathBuf,
        /// Upscale factor of the built-in nearest-neighbor model
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..=8))]
        factor: u32,
    },
    /// Run the live frame loop
    Run {
        /// Frame source
        #[arg(long, short, default_value = "desktop")]
        source: SourceArg,
        /// Image replayed by the still source
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, short, value_parser = parse_level)]
        level: Option<f32>,
        /// Refreshes per second (default from config)
        #[arg(long)]
        fps: Option<u32>,
        /// Stop after this many refreshes
        #[arg(long)]
        frames: Option<u64>,
        /// Save the last presented frame here
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Do not mirror camera frames
        #[arg(long)]
        no_mirror: bool,
    },
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse a level: finite and not negative.
pub fn parse_level(s: &str) -> Result<f32, String> {
    let level: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !level.is_finite() || level < 0.0 {
        return Err(format!("Level must be a finite number >= 0, got {}", s));
    }
    Ok(level)
}
