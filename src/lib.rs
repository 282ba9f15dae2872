//! voxel-upscaler library crate.
//!
//! A nearest-neighbor "voxel" pixelation effect, a level-driven overlay,
//! and the cooperative frame loop that applies them to a camera feed or a
//! synthetic desktop background. A separate path runs still images
//! through an opaque enhancer model.

pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod effects;
pub mod enhance;
pub mod event_loop;
pub mod level;
pub mod pipeline;
pub mod raster;
pub mod scheduler;
pub mod source;
pub mod surface;

pub use controller::Controller;
pub use level::{ProcessingLevel, EFFECT_THRESHOLD};
pub use pipeline::PipelineState;
pub use raster::Raster;
