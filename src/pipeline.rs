//! Frame pipeline for the voxel upscaler.
//!
//! A two-state loop (`Idle` / `Running`) that pulls a frame from the active
//! source, applies the voxel effect or the level overlay, presents the
//! result, and asks the scheduler for the next frame while there is still
//! something to show.

use std::fmt;

use crate::effects::{render_overlay_styled, voxelize, OverlayStyle};
use crate::level::ProcessingLevel;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::source::{FrameSource, SourceKind};
use crate::surface::Canvas;

/// Lifecycle of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Controller flags as seen by one iteration.
///
/// Captured once when the iteration starts, so a flag flipped while a
/// frame is being produced only takes effect on the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub level: ProcessingLevel,
    pub camera_active: bool,
}

/// Everything an iteration touches, borrowed from the owning controller.
pub struct FrameContext<'a> {
    pub inputs: FrameInputs,
    /// The active source: the synthetic desktop, or a camera once acquired
    pub source: &'a mut Box<dyn FrameSource>,
    pub surface: &'a mut Canvas,
    pub scheduler: &'a mut dyn FrameScheduler,
    pub style: &'a OverlayStyle,
}

/// The self-rescheduling frame loop.
///
/// At most one frame request is outstanding at any time; starting an
/// already running pipeline cancels the old request first.
#[derive(Debug, Default)]
pub struct FramePipeline {
    state: PipelineState,
    pending: Option<FrameHandle>,
    iterations: u64,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PipelineState::Running
    }

    /// Outstanding frame request, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Number of iterations run since creation.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Enter `Running` and render the first frame immediately.
    pub fn start(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(handle) = self.pending.take() {
            log::debug!("Restarting pipeline, cancelling frame {}", handle.id());
            ctx.scheduler.cancel(handle);
        }
        if self.state == PipelineState::Idle {
            log::info!("Pipeline started at level {}", ctx.inputs.level);
        }
        self.state = PipelineState::Running;
        self.iterate(ctx);
    }

    /// Cancel the pending frame, go `Idle`, and blank the surface.
    pub fn stop(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(handle) = self.pending.take() {
            ctx.scheduler.cancel(handle);
        }
        if self.state == PipelineState::Running {
            log::info!("Pipeline stopped after {} frame(s)", self.iterations);
        }
        self.state = PipelineState::Idle;
        ctx.surface.clear();
    }

    /// Run the iteration for a scheduler callback.
    ///
    /// Returns `false` without doing anything if `handle` is not the
    /// outstanding request (cancelled or stale).
    pub fn on_frame(&mut self, handle: FrameHandle, ctx: &mut FrameContext<'_>) -> bool {
        if self.state != PipelineState::Running || self.pending != Some(handle) {
            log::trace!("Ignoring stale frame {}", handle.id());
            return false;
        }
        self.pending = None;
        self.iterate(ctx);
        true
    }

    fn iterate(&mut self, ctx: &mut FrameContext<'_>) {
        let inputs = ctx.inputs;
        self.iterations += 1;

        match ctx.source.kind() {
            SourceKind::Camera => match ctx.source.current_frame() {
                Some(frame) => match voxelize(&frame, inputs.level) {
                    Ok(out) => ctx.surface.draw_raster(out),
                    Err(e) => log::warn!("Dropping camera frame: {}", e),
                },
                None => log::trace!("Camera has no frame yet"),
            },
            SourceKind::SyntheticDesktop => {
                let style = ctx.style;
                ctx.surface.clear();
                ctx.surface
                    .composite(|raster| render_overlay_styled(raster, inputs.level, style));
            }
        }

        if inputs.camera_active || inputs.level.is_effective() {
            self.pending = Some(ctx.scheduler.request_frame());
        } else {
            log::info!("Nothing left to render, pipeline going idle");
            self.state = PipelineState::Idle;
            ctx.surface.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::scheduler::ManualScheduler;
    use crate::source::SyntheticDesktopSource;

    struct FixedCamera(Raster);

    impl FrameSource for FixedCamera {
        fn kind(&self) -> SourceKind {
            SourceKind::Camera
        }

        fn current_frame(&mut self) -> Option<Raster> {
            Some(self.0.clone())
        }
    }

    fn desktop_source() -> Box<dyn FrameSource> {
        Box::new(SyntheticDesktopSource)
    }

    fn inputs(level: f32, camera_active: bool) -> FrameInputs {
        FrameInputs {
            level: ProcessingLevel::new(level).unwrap(),
            camera_active,
        }
    }

    #[test]
    fn test_desktop_start_schedules_next_frame() {
        let mut desktop = desktop_source();
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(16, 16);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(1.5, false),
            source: &mut desktop,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        assert!(pipeline.is_running());
        assert!(pipeline.pending_frame().is_some());
        assert_eq!(pipeline.iterations(), 1);
        assert!(!surface.is_blank());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_desktop_at_neutral_level_goes_idle() {
        let mut desktop = desktop_source();
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(8, 8);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(1.0, false),
            source: &mut desktop,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.pending_frame().is_none());
        assert!(surface.is_blank());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut desktop = desktop_source();
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(8, 8);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(2.0, false),
            source: &mut desktop,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        let first = pipeline.pending_frame().unwrap();
        pipeline.start(&mut ctx);
        assert!(!pipeline.on_frame(first, &mut ctx));
        assert_eq!(pipeline.iterations(), 2);
    }

    #[test]
    fn test_camera_path_pixelates_frame() {
        let mut frame = Raster::new(4, 4);
        for x in 0..4 {
            for y in 0..4 {
                frame.put_pixel(x, y, [(x * 60) as u8, (y * 60) as u8, 0, 255]);
            }
        }
        let mut camera: Box<dyn FrameSource> = Box::new(FixedCamera(frame.clone()));
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(4, 4);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(2.0, true),
            source: &mut camera,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        let expected = crate::effects::pixelate(&frame, 2.0).unwrap();
        assert_eq!(surface.raster(), &expected);
        assert!(pipeline.is_running());
    }

    #[test]
    fn test_camera_at_neutral_level_copies_frame() {
        let frame = Raster::filled(3, 3, [5, 6, 7, 255]);
        let mut camera: Box<dyn FrameSource> = Box::new(FixedCamera(frame.clone()));
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(3, 3);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(1.0, true),
            source: &mut camera,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        // Camera mode keeps running even without an effect
        assert!(pipeline.is_running());
        assert_eq!(surface.raster(), &frame);
    }

    #[test]
    fn test_stop_clears_and_cancels() {
        let mut desktop = desktop_source();
        let mut pipeline = FramePipeline::new();
        let mut surface = Canvas::new(8, 8);
        let mut scheduler = ManualScheduler::new();
        let style = OverlayStyle::default();
        let mut ctx = FrameContext {
            inputs: inputs(3.0, false),
            source: &mut desktop,
            surface: &mut surface,
            scheduler: &mut scheduler,
            style: &style,
        };

        pipeline.start(&mut ctx);
        pipeline.stop(&mut ctx);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(surface.is_blank());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_pipeline_state_display() {
        assert_eq!(PipelineState::Idle.to_string(), "idle");
        assert_eq!(PipelineState::Running.to_string(), "running");
    }
}
