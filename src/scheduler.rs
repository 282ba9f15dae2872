//! Frame scheduling: one callback per display refresh.
//!
//! The pipeline never loops on its own. Each iteration asks the scheduler
//! for the next frame and receives a [`FrameHandle`]; whoever drives the
//! display refresh calls [`FrameScheduler::take_due`] once per refresh and
//! feeds the handles back to the pipeline. Cancelling a handle guarantees
//! it is never returned from `take_due`.

use std::collections::VecDeque;

/// Identifies a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Ask for a callback on the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Drop a previously requested callback. Unknown handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// Handles due on this refresh, in request order.
    ///
    /// Handles requested while processing the returned batch belong to the
    /// next refresh.
    fn take_due(&mut self) -> Vec<FrameHandle>;

    /// Number of callbacks waiting for the next refresh.
    fn pending(&self) -> usize;
}

/// Scheduler that only advances when told to.
///
/// Used by tests to step frames deterministically and by the realtime
/// driver, which calls [`FrameScheduler::take_due`] from a timer.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    queue: VecDeque<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.queue.push_back(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.queue.retain(|h| *h != handle);
    }

    fn take_due(&mut self) -> Vec<FrameHandle> {
        self.queue.drain(..).collect()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        assert_ne!(a, b);
        assert_eq!(s.pending(), 2);
    }

    #[test]
    fn test_cancel_removes_handle() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        s.cancel(a);
        assert_eq!(s.take_due(), vec![b]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_cancel_unknown_handle_is_noop() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        s.cancel(a);
        s.cancel(a);
        assert!(s.take_due().is_empty());
    }

    #[test]
    fn test_requests_after_take_wait_for_next_refresh() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let due = s.take_due();
        assert_eq!(due, vec![a]);
        let b = s.request_frame();
        assert_eq!(s.take_due(), vec![b]);
    }
}
