//! Mode and level control.
//!
//! The [`Controller`] is the one owner of everything the frame loop
//! touches: the level, the active frame source, the surface, and the
//! scheduler. UI events (slider moves, camera toggle)
//! and scheduler callbacks all go through it.

use crate::camera::{CameraError, CameraProvider};
use crate::effects::OverlayStyle;
use crate::level::{LevelError, ProcessingLevel};
use crate::pipeline::{FrameContext, FrameInputs, FramePipeline, PipelineState};
use crate::scheduler::{FrameScheduler, ManualScheduler};
use crate::source::{FrameSource, SourceKind, SyntheticDesktopSource};
use crate::surface::Canvas;

/// Owned application state for one display surface.
pub struct Controller<P: CameraProvider, S: FrameScheduler = ManualScheduler> {
    level: ProcessingLevel,
    /// Synthetic desktop until a camera is acquired
    source: Box<dyn FrameSource>,
    provider: P,
    pipeline: FramePipeline,
    surface: Canvas,
    scheduler: S,
    style: OverlayStyle,
}

impl<P: CameraProvider> Controller<P, ManualScheduler> {
    /// Controller with a [`ManualScheduler`] and the default overlay style.
    pub fn new(provider: P, surface: Canvas) -> Self {
        Self::with_scheduler(provider, surface, ManualScheduler::new())
    }
}

impl<P: CameraProvider, S: FrameScheduler> Controller<P, S> {
    pub fn with_scheduler(provider: P, surface: Canvas, scheduler: S) -> Self {
        Self {
            level: ProcessingLevel::NONE,
            source: Box::new(SyntheticDesktopSource),
            provider,
            pipeline: FramePipeline::new(),
            surface,
            scheduler,
            style: OverlayStyle::default(),
        }
    }

    /// Replace the overlay colours and grid switch.
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn level(&self) -> ProcessingLevel {
        self.level
    }

    /// Whether the active source is a camera.
    pub fn is_camera_active(&self) -> bool {
        self.source.kind() == SourceKind::Camera
    }

    /// Kind of the source the pipeline currently reads from.
    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline.state()
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    pub fn surface(&self) -> &Canvas {
        &self.surface
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Handle a slider change.
    ///
    /// The value is taken as given apart from rejecting non-finite or
    /// negative numbers. In desktop mode an effective level starts an idle
    /// pipeline; a neutral level stops it unless the camera is on.
    pub fn set_level(&mut self, value: f32) -> Result<(), LevelError> {
        let level = ProcessingLevel::new(value)?;
        log::debug!("Level set to {}", level);
        self.level = level;

        let camera_active = self.is_camera_active();
        if !camera_active && level.is_effective() && !self.pipeline.is_running() {
            self.start_pipeline();
        } else if !level.is_effective() && !camera_active {
            self.stop_pipeline();
        }
        Ok(())
    }

    /// Handle the camera toggle button.
    ///
    /// Turning on acquires a source from the provider; on failure the mode
    /// is left unchanged and the error is logged and returned so the user
    /// can retry. A provider handing back anything but a camera counts as
    /// a failure. Turning off releases the camera, falls back to the
    /// synthetic desktop and stops the pipeline.
    pub fn toggle_camera(&mut self) -> Result<(), CameraError> {
        if self.is_camera_active() {
            self.release_source();
            self.surface.set_video_visible(false);
            log::info!("Camera off");
            self.stop_pipeline();
            return Ok(());
        }

        let acquired = self
            .provider
            .acquire()
            .and_then(|mut source| match source.kind() {
                SourceKind::Camera => Ok(source),
                kind => {
                    source.release();
                    Err(CameraError::NotACamera(kind))
                }
            });
        match acquired {
            Ok(source) => {
                self.source = source;
                self.surface.set_video_visible(true);
                log::info!("Camera on at level {}", self.level);
                self.start_pipeline();
                Ok(())
            }
            Err(e) => {
                log::warn!("Could not start camera: {}", e);
                Err(e)
            }
        }
    }

    /// Process one display refresh: run every frame callback that is due.
    ///
    /// Returns the number of iterations actually run.
    pub fn pump(&mut self) -> usize {
        let due = self.scheduler.take_due();
        let mut ran = 0;
        for handle in due {
            let mut ctx = Self::context(
                self.level,
                &mut self.source,
                &mut self.surface,
                &mut self.scheduler,
                &self.style,
            );
            if self.pipeline.on_frame(handle, &mut ctx) {
                ran += 1;
            }
        }
        ran
    }

    /// Release the camera and stop the pipeline.
    pub fn shutdown(&mut self) {
        if self.is_camera_active() {
            let _ = self.toggle_camera();
        } else {
            self.stop_pipeline();
        }
    }

    /// Release the camera and hand back the surface with its last frame.
    pub fn into_surface(mut self) -> Canvas {
        self.release_source();
        self.surface
    }

    /// Release the active source and go back to the synthetic desktop.
    fn release_source(&mut self) {
        let mut previous = std::mem::replace(&mut self.source, Box::new(SyntheticDesktopSource));
        previous.release();
    }

    fn start_pipeline(&mut self) {
        let mut ctx = Self::context(
            self.level,
            &mut self.source,
            &mut self.surface,
            &mut self.scheduler,
            &self.style,
        );
        self.pipeline.start(&mut ctx);
    }

    fn stop_pipeline(&mut self) {
        let mut ctx = Self::context(
            self.level,
            &mut self.source,
            &mut self.surface,
            &mut self.scheduler,
            &self.style,
        );
        self.pipeline.stop(&mut ctx);
    }

    fn context<'a>(
        level: ProcessingLevel,
        source: &'a mut Box<dyn FrameSource>,
        surface: &'a mut Canvas,
        scheduler: &'a mut S,
        style: &'a OverlayStyle,
    ) -> FrameContext<'a> {
        FrameContext {
            inputs: FrameInputs {
                level,
                camera_active: source.kind() == SourceKind::Camera,
            },
            source,
            surface,
            scheduler,
            style,
        }
    }
}
