//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{parse_level, Args, Command, ConfigAction};
pub use commands::{
    enhance_file, handle_config_action, list_cameras, overlay_file, pixelate_file, run_live,
    CommandResult, LiveOptions,
};
pub use enums::SourceArg;
