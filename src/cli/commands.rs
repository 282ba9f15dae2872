//! Subcommand handlers.

use std::path::Path;

use super::args::ConfigAction;
use super::enums::SourceArg;
use crate::camera::{CameraProvider, NoCamera, StillCamera};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG};
use crate::controller::Controller;
use crate::effects::{render_overlay_styled, voxelize};
use crate::enhance::{enhance_raster, load_raster, save_raster, NearestEnhancer};
use crate::event_loop::{self, RunOptions, StopReason};
use crate::level::ProcessingLevel;
use crate::raster::Raster;
use crate::surface::Canvas;

pub type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Options for the `run` subcommand after merging CLI and config.
#[derive(Debug, Clone)]
pub struct LiveOptions {
    pub source: SourceArg,
    pub image: Option<std::path::PathBuf>,
    pub level: f32,
    pub run: RunOptions,
    pub output: Option<std::path::PathBuf>,
    pub mirror: bool,
}

/// `pixelate`: load, voxelize, save.
pub async fn pixelate_file(input: &Path, output: &Path, level: f32) -> CommandResult {
    let level = ProcessingLevel::new(level)?;
    let source = load_raster(input).await?;
    if !level.is_effective() {
        log::warn!(
            "Level {} is at or below the effect threshold, copying unchanged",
            level
        );
    }
    let result = voxelize(&source, level)?;
    save_raster(result, output).await?;
    println!(
        "Wrote {} ({}x{}, level {})",
        output.display(),
        source.width(),
        source.height(),
        level
    );
    Ok(())
}

/// `overlay`: paint the level overlay on a blank canvas.
pub async fn overlay_file(
    output: &Path,
    level: f32,
    width: u32,
    height: u32,
    config: &Config,
    grid: bool,
) -> CommandResult {
    let level = ProcessingLevel::new(level)?;
    let style = crate::effects::OverlayStyle {
        grid_enabled: grid && config.overlay.grid,
        ..config.overlay.style()
    };
    let mut canvas = Raster::new(width, height);
    render_overlay_styled(&mut canvas, level, &style);
    save_raster(canvas, output).await?;
    println!("Wrote {} ({}x{}, level {})", output.display(), width, height, level);
    Ok(())
}

/// `enhance`: run the built-in model over an image.
pub async fn enhance_file(input: &Path, output: &Path, factor: u32) -> CommandResult {
    let source = load_raster(input).await?;
    let enhancer = NearestEnhancer::new(factor as usize);
    let result = enhance_raster(&source, &enhancer)?;
    let (w, h) = result.dimensions();
    save_raster(result, output).await?;
    println!("Wrote {} ({}x{})", output.display(), w, h);
    Ok(())
}

/// `run`: drive the live loop with the chosen source.
pub async fn run_live(options: LiveOptions, config: &Config) -> CommandResult {
    let surface = Canvas::new(config.surface.width, config.surface.height);

    match options.source {
        SourceArg::Desktop => drive(NoCamera, surface, &options, config).await,
        SourceArg::Still => {
            let path = options
                .image
                .as_deref()
                .ok_or("--source still needs --image <path>")?;
            let image = load_raster(path).await?;
            drive(StillCamera::new(image, options.mirror), surface, &options, config).await
        }
        SourceArg::Camera => native_camera(surface, &options, config).await,
    }
}

#[cfg(feature = "native-camera")]
async fn native_camera(surface: Canvas, options: &LiveOptions, config: &Config) -> CommandResult {
    let mut settings = config.camera.settings();
    settings.mirror = options.mirror;
    drive(crate::camera::NativeCamera::new(settings), surface, options, config).await
}

#[cfg(not(feature = "native-camera"))]
async fn native_camera(
    _surface: Canvas,
    _options: &LiveOptions,
    _config: &Config,
) -> CommandResult {
    Err(Box::new(crate::camera::CameraError::Unsupported))
}

async fn drive<P: CameraProvider>(
    provider: P,
    surface: Canvas,
    options: &LiveOptions,
    config: &Config,
) -> CommandResult {
    let mut controller = Controller::new(provider, surface).with_style(config.overlay.style());

    controller.set_level(options.level)?;
    if options.source.uses_camera() {
        if let Err(e) = controller.toggle_camera() {
            eprintln!("Warning: {}", e);
            eprintln!("Continuing in desktop mode.\n");
        }
    }
    if !controller.pipeline().is_running() {
        println!(
            "Nothing to render: desktop mode needs a level above {}.",
            crate::level::EFFECT_THRESHOLD
        );
        if let Some(path) = &options.output {
            log::warn!("No frame was rendered, {} was not written", path.display());
        }
        return Ok(());
    }

    let shutdown = event_loop::setup_ctrlc_handler()?;
    let summary = event_loop::run(&mut controller, options.run, shutdown).await;
    println!(
        "Rendered {} frame(s) over {} refresh(es)",
        summary.iterations, summary.refreshes
    );

    if let Some(path) = &options.output {
        if summary.reason == StopReason::Idle {
            log::warn!("Pipeline went idle, the saved frame will be blank");
        }
        controller.surface().save(path)?;
        println!("Saved last frame to {}", path.display());
    }
    controller.shutdown();
    Ok(())
}

/// List available cameras and print them to stdout.
#[cfg(feature = "native-camera")]
pub fn list_cameras() -> CommandResult {
    let devices = crate::camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Set [camera] device = <index> in the config file to select a camera.");
    }
    Ok(())
}

#[cfg(not(feature = "native-camera"))]
pub fn list_cameras() -> CommandResult {
    Err(Box::new(crate::camera::CameraError::Unsupported))
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    explicit: Option<&Path>,
) -> CommandResult {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            match config.pipeline.level {
                Some(level) => println!("  Level: {}", level),
                None => println!(
                    "  Level: unset (pixelate/overlay {}, run {})",
                    config.pipeline.still_level(),
                    config.pipeline.live_level()
                ),
            }
            println!("  FPS: {}", config.pipeline.fps);
            println!("  Surface: {}x{}", config.surface.width, config.surface.height);
            println!(
                "  Camera: device {} at {}x{} @ {} fps, mirror {}",
                config.camera.device,
                config.camera.width,
                config.camera.height,
                config.camera.fps,
                if config.camera.mirror { "yes" } else { "no" }
            );
            println!("  Grid: {}", if config.overlay.grid { "yes" } else { "no" });
            println!();

            let config_path = explicit.map(Path::to_path_buf).unwrap_or_else(get_config_path);
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            let config_path = explicit.map(Path::to_path_buf).unwrap_or_else(get_config_path);
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\n\
                     Use 'voxel-upscaler config show' to view current settings.",
                    config_path.display()
                )
                .into());
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
