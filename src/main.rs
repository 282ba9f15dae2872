use clap::Parser;

use voxel_upscaler::cli::{self, Args, Command, CommandResult, LiveOptions};
use voxel_upscaler::config::Config;
use voxel_upscaler::event_loop::RunOptions;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

/// Load the config file.
///
/// An explicit `--config` must exist and parse; a broken default file only
/// produces a warning. `lenient` downgrades every failure to a warning, for
/// commands that manage the file itself.
fn load_config(
    path: Option<&std::path::Path>,
    lenient: bool,
) -> Result<Config, voxel_upscaler::config::ConfigError> {
    match Config::load(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if path.is_none() || lenient => {
            eprintln!("Warning: Failed to load config file: {}", e);
            eprintln!("Using default settings.\n");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

async fn dispatch(args: Args, config: Config) -> CommandResult {
    match args.command {
        Command::Pixelate {
            input,
            output,
            level,
        } => {
            let level = level.unwrap_or_else(|| config.pipeline.still_level());
            cli::pixelate_file(&input, &output, level).await
        }
        Command::Overlay {
            output,
            level,
            width,
            height,
            no_grid,
        } => {
            let level = level.unwrap_or_else(|| config.pipeline.still_level());
            let width = width.unwrap_or(config.surface.width);
            let height = height.unwrap_or(config.surface.height);
            cli::overlay_file(&output, level, width, height, &config, !no_grid).await
        }
        Command::Enhance {
            input,
            output,
            factor,
        } => cli::enhance_file(&input, &output, factor).await,
        Command::Run {
            source,
            image,
            level,
            fps,
            frames,
            output,
            no_mirror,
        } => {
            // Merge settings: CLI args > config file > built-in defaults
            let options = LiveOptions {
                source,
                image,
                level: level.unwrap_or_else(|| config.pipeline.live_level()),
                run: RunOptions {
                    fps: fps.unwrap_or(config.pipeline.fps),
                    max_refreshes: frames,
                },
                output,
                mirror: config.camera.mirror && !no_mirror,
            };
            cli::run_live(options, &config).await
        }
        Command::ListCameras => cli::list_cameras(),
        Command::Config { action } => {
            cli::handle_config_action(action, &config, args.config.as_deref())
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let lenient = matches!(args.command, Command::Config { .. });
    let config = match load_config(args.config.as_deref(), lenient) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatch(args, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
