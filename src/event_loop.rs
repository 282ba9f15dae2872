//! Realtime driver for the frame pipeline.
//!
//! Stands in for the display refresh: a tokio interval ticks at the
//! configured rate and each tick pumps the controller's scheduler once.
//! The pipeline decides for itself whether to ask for another frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::camera::CameraProvider;
use crate::controller::Controller;
use crate::pipeline::PipelineState;
use crate::scheduler::FrameScheduler;

/// How long to keep the loop alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Refreshes per second
    pub fps: u32,
    /// Stop after this many refreshes, if set
    pub max_refreshes: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            max_refreshes: None,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The pipeline went idle on its own
    Idle,
    /// The refresh budget ran out
    FrameBudget,
    /// Shutdown was requested (Ctrl+C)
    Interrupted,
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub refreshes: u64,
    pub iterations: u64,
    pub reason: StopReason,
}

/// Interval between refreshes; a zero rate is treated as 1 fps.
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(fps.max(1)))
}

/// Drive `controller` until the pipeline idles, the budget runs out, or
/// `shutdown` is set.
pub async fn run<P, S>(
    controller: &mut Controller<P, S>,
    options: RunOptions,
    shutdown: Arc<AtomicBool>,
) -> RunSummary
where
    P: CameraProvider,
    S: FrameScheduler,
{
    let mut ticker = tokio::time::interval(frame_interval(options.fps));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut refreshes = 0u64;
    let mut iterations = 0u64;

    let reason = loop {
        if shutdown.load(Ordering::SeqCst) {
            break StopReason::Interrupted;
        }
        if controller.pipeline_state() == PipelineState::Idle {
            break StopReason::Idle;
        }
        if options.max_refreshes.is_some_and(|max| refreshes >= max) {
            break StopReason::FrameBudget;
        }

        ticker.tick().await;
        iterations += controller.pump() as u64;
        refreshes += 1;

        if refreshes % u64::from(options.fps.max(1)) == 0 {
            log::debug!("{} refreshes, {} frames rendered", refreshes, iterations);
        }
    };

    log::info!(
        "Live loop ended ({:?}) after {} refreshes and {} frames",
        reason,
        refreshes,
        iterations
    );
    RunSummary {
        refreshes,
        iterations,
        reason,
    }
}

/// Install a Ctrl+C handler that raises the returned flag.
///
/// Call once at program startup.
pub fn setup_ctrlc_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        log::warn!("Received Ctrl+C, shutting down...");
    })?;
    Ok(flag)
}
