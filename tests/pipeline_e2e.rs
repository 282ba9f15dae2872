//! End-to-end tests for the controller and frame pipeline.
//!
//! These tests drive the controller refresh by refresh with the manual
//! scheduler and verify:
//! - At most one frame request is outstanding, however often it is started
//! - Camera mode pixelates every frame and stops cleanly
//! - Desktop mode starts and stops with the level slider
//! - A failed camera acquisition leaves the mode unchanged
//! - Flags changed between refreshes apply from the next frame on

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use voxel_upscaler::camera::{CameraError, CameraProvider};
use voxel_upscaler::effects::pixelate;
use voxel_upscaler::event_loop::{self, RunOptions, StopReason};
use voxel_upscaler::raster::Raster;
use voxel_upscaler::scheduler::FrameScheduler;
use voxel_upscaler::source::{FrameSource, SourceKind, SyntheticDesktopSource};
use voxel_upscaler::surface::Canvas;
use voxel_upscaler::{Controller, PipelineState};

/// Shared state between a test and the camera it hands to the controller.
#[derive(Default)]
struct Rig {
    frame: RefCell<Option<Raster>>,
    acquired: Cell<u32>,
    released: Cell<u32>,
    fail: Cell<bool>,
}

struct RigCamera(Rc<Rig>);

impl CameraProvider for RigCamera {
    fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        if self.0.fail.get() {
            return Err(CameraError::PermissionDenied);
        }
        self.0.acquired.set(self.0.acquired.get() + 1);
        Ok(Box::new(RigSource(Rc::clone(&self.0))))
    }
}

struct RigSource(Rc<Rig>);

impl FrameSource for RigSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    fn current_frame(&mut self) -> Option<Raster> {
        self.0.frame.borrow().clone()
    }

    fn release(&mut self) {
        self.0.released.set(self.0.released.get() + 1);
    }
}

/// 8x8 frame where every pixel is distinct.
fn make_frame() -> Raster {
    let mut raster = Raster::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            raster.put_pixel(x, y, [(x * 30) as u8, (y * 30) as u8, (x + y) as u8, 255]);
        }
    }
    raster
}

fn rig_with_frame() -> Rc<Rig> {
    let rig = Rc::new(Rig::default());
    *rig.frame.borrow_mut() = Some(make_frame());
    rig
}

// ==================== Scheduling ====================

#[test]
fn test_double_start_keeps_one_outstanding_request() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));

    // Desktop start, then camera start on top of it
    c.set_level(2.0).unwrap();
    c.toggle_camera().unwrap();
    assert_eq!(c.scheduler().pending(), 1);

    for _ in 0..5 {
        let before = c.surface().frames_presented();
        assert_eq!(c.pump(), 1);
        assert_eq!(c.surface().frames_presented(), before + 1);
        assert_eq!(c.scheduler().pending(), 1);
    }
}

// ==================== Camera Mode ====================

#[test]
fn test_camera_mode_pixelates_each_frame() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));
    c.set_level(1.5).unwrap();
    c.toggle_camera().unwrap();
    assert!(c.is_camera_active());
    assert!(c.surface().video_visible());

    let expected = pixelate(&make_frame(), 1.5).unwrap();
    for _ in 0..3 {
        c.pump();
        assert_eq!(c.surface().raster(), &expected);
    }
    assert_eq!(rig.acquired.get(), 1);

    c.toggle_camera().unwrap();
    assert_eq!(c.pipeline_state(), PipelineState::Idle);
    assert!(c.surface().is_blank());
    assert!(!c.surface().video_visible());
    assert_eq!(c.scheduler().pending(), 0);
    assert_eq!(rig.released.get(), 1);
}

#[test]
fn test_camera_without_frame_draws_nothing() {
    let rig = Rc::new(Rig::default());
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));
    c.set_level(3.0).unwrap();
    let desktop_frames = c.surface().frames_presented();
    c.toggle_camera().unwrap();

    assert_eq!(c.pump(), 1);
    assert_eq!(c.surface().frames_presented(), desktop_frames);
    assert_eq!(c.pipeline_state(), PipelineState::Running);

    // Frames arriving later are picked up
    *rig.frame.borrow_mut() = Some(make_frame());
    c.pump();
    assert_eq!(c.surface().raster(), &pixelate(&make_frame(), 3.0).unwrap());
}

#[test]
fn test_camera_failure_stays_in_desktop_mode() {
    let rig = rig_with_frame();
    rig.fail.set(true);
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));
    c.set_level(2.0).unwrap();
    let overlay = c.surface().snapshot();

    let err = c.toggle_camera().unwrap_err();
    assert!(matches!(err, CameraError::PermissionDenied));
    assert!(!c.is_camera_active());
    assert_eq!(c.pipeline_state(), PipelineState::Running);

    c.pump();
    assert_eq!(c.surface().raster(), &overlay);

    // The user can retry once the permission is granted
    rig.fail.set(false);
    c.toggle_camera().unwrap();
    assert!(c.is_camera_active());
}

#[test]
fn test_desktop_source_from_provider_is_not_a_camera() {
    struct DesktopOnly;

    impl CameraProvider for DesktopOnly {
        fn acquire(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
            Ok(Box::new(SyntheticDesktopSource))
        }
    }

    let mut c = Controller::new(DesktopOnly, Canvas::new(8, 8));
    assert!(matches!(
        c.toggle_camera(),
        Err(CameraError::NotACamera(SourceKind::SyntheticDesktop))
    ));
    assert!(!c.is_camera_active());
    assert_eq!(c.pipeline_state(), PipelineState::Idle);
    assert_eq!(c.scheduler().pending(), 0);
    assert_eq!(c.pump(), 0);
}

// ==================== Desktop Mode ====================

#[test]
fn test_desktop_level_drives_pipeline_state() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(rig), Canvas::new(16, 16));
    assert_eq!(c.pipeline_state(), PipelineState::Idle);

    c.set_level(1.5).unwrap();
    assert_eq!(c.pipeline_state(), PipelineState::Running);
    assert!(!c.surface().is_blank());

    c.set_level(1.0).unwrap();
    assert_eq!(c.pipeline_state(), PipelineState::Idle);
    assert!(c.surface().is_blank());
    assert_eq!(c.pump(), 0);
}

#[test]
fn test_threshold_level_does_not_start_desktop() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(rig), Canvas::new(4, 4));
    c.set_level(1.1).unwrap();
    assert_eq!(c.pipeline_state(), PipelineState::Idle);
    assert!(c.surface().is_blank());
}

// ==================== Snapshots ====================

#[test]
fn test_level_change_applies_on_next_frame() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));
    c.set_level(4.0).unwrap();
    c.toggle_camera().unwrap();
    let coarse = pixelate(&make_frame(), 4.0).unwrap();
    assert_eq!(c.surface().raster(), &coarse);

    // In camera mode a slider move does not re-render by itself
    c.set_level(2.0).unwrap();
    assert_eq!(c.surface().raster(), &coarse);

    c.pump();
    assert_eq!(c.surface().raster(), &pixelate(&make_frame(), 2.0).unwrap());

    // Dropping to neutral shows the camera feed unchanged
    c.set_level(1.0).unwrap();
    c.pump();
    assert_eq!(c.surface().raster(), &make_frame());
}

#[test]
fn test_camera_off_between_frames_cancels_next() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(Rc::clone(&rig)), Canvas::new(8, 8));
    c.toggle_camera().unwrap();
    let presented = c.surface().frames_presented();

    c.toggle_camera().unwrap();
    assert_eq!(c.pump(), 0);
    assert_eq!(c.surface().frames_presented(), presented);
}

// ==================== Realtime Driver ====================

#[tokio::test]
async fn test_run_stops_on_frame_budget() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(rig), Canvas::new(8, 8));
    c.set_level(2.0).unwrap();

    let options = RunOptions {
        fps: 500,
        max_refreshes: Some(4),
    };
    let summary = event_loop::run(&mut c, options, Arc::new(AtomicBool::new(false))).await;
    assert_eq!(summary.reason, StopReason::FrameBudget);
    assert_eq!(summary.refreshes, 4);
    assert_eq!(summary.iterations, 4);
    assert_eq!(c.pipeline().iterations(), 5);
}

#[tokio::test]
async fn test_run_returns_when_idle() {
    let rig = rig_with_frame();
    let mut c = Controller::new(RigCamera(rig), Canvas::new(8, 8));
    let shutdown = Arc::new(AtomicBool::new(false));
    let summary = event_loop::run(&mut c, RunOptions::default(), shutdown).await;
    assert_eq!(summary.reason, StopReason::Idle);
    assert_eq!(summary.refreshes, 0);
}
