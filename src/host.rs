use std::collections::BTreeSet;

use crate::progress::Viewport;

/// Host-provided geometry: viewport, container box, display density.
///
/// Abstracting the environment's globals keeps the scene testable without a
/// real rendering surface.
pub trait DisplayMetrics {
    fn viewport(&self) -> Viewport;
    /// Container layout box in device-independent pixels.
    fn container(&self) -> (f64, f64);
    fn device_pixel_ratio(&self) -> f64;
    fn scroll_y(&self) -> f64;
}

/// Handle identifying one scheduled paint callback.
pub type DrawHandle = u64;

/// Host-provided paint-callback scheduling, the environment's equivalent of
/// an animation-frame request. The scene keeps at most one request
/// outstanding and cancels the prior one before scheduling anew.
pub trait FrameScheduler {
    /// Request one paint callback; the host later delivers the handle back to
    /// [`crate::scene::RotationScene::on_frame`].
    fn request(&mut self) -> DrawHandle;

    /// Cancel a not-yet-delivered request. Unknown or already-delivered
    /// handles are ignored.
    fn cancel(&mut self, handle: DrawHandle);
}

/// Hand-cranked scheduler for hosts that own their own paint loop, and for
/// tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: DrawHandle,
    live: BTreeSet<DrawHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles due for delivery, oldest first. Draining does not deliver;
    /// the host calls the scene with each handle.
    pub fn take_due(&mut self) -> Vec<DrawHandle> {
        let due: Vec<_> = self.live.iter().copied().collect();
        self.live.clear();
        due
    }

    pub fn pending(&self) -> usize {
        self.live.len()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> DrawHandle {
        self.next += 1;
        self.live.insert(self.next);
        self.requested += 1;
        self.next
    }

    fn cancel(&mut self, handle: DrawHandle) {
        if self.live.remove(&handle) {
            self.cancelled += 1;
        }
    }
}

/// Fixed display metrics with mutable scroll position, for hosts that poll
/// their environment once per event and for tests.
#[derive(Clone, Copy, Debug)]
pub struct StaticDisplay {
    pub viewport: Viewport,
    pub container: (f64, f64),
    pub device_pixel_ratio: f64,
    pub scroll_y: f64,
}

impl DisplayMetrics for StaticDisplay {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn container(&self) -> (f64, f64) {
        self.container
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_hands_out_distinct_handles() {
        let mut s = ManualScheduler::new();
        let a = s.request();
        let b = s.request();
        assert_ne!(a, b);
        assert_eq!(s.pending(), 2);
    }

    #[test]
    fn cancel_removes_pending_and_ignores_unknown() {
        let mut s = ManualScheduler::new();
        let a = s.request();
        s.cancel(a);
        s.cancel(a);
        s.cancel(999);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.cancelled(), 1);
    }

    #[test]
    fn take_due_drains_in_request_order() {
        let mut s = ManualScheduler::new();
        let a = s.request();
        let b = s.request();
        assert_eq!(s.take_due(), vec![a, b]);
        assert_eq!(s.pending(), 0);
    }
}
