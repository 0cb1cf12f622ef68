//! Frame scheduling and deferred cascades.
//!
//! Everything here runs on the host's single event thread. The controller
//! owns one scheduler handle and one cascade queue, and cancels both on stop.

use crate::error::Result;
use crate::landscape::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Source of "call me on the next display refresh" requests.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Headless scheduler: the host asks whether a frame is pending and then
/// drives `on_frame` itself (timer loop, test, offline render).
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Option<FrameHandle>,
    next_id: u64,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending request, as if the display refreshed.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        self.next_id += 1;
        self.requested += 1;
        let h = FrameHandle(self.next_id);
        self.pending = Some(h);
        Ok(h)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCascade {
    pub id: u64,
    pub due_ms: f64,
    pub origin: NodeId,
    /// Landscape generation the origin id belongs to.
    pub generation: u64,
}

/// Cancellable deferred cascades, fired in due order.
#[derive(Debug, Clone, Default)]
pub struct CascadeQueue {
    pending: Vec<PendingCascade>,
    next_id: u64,
}

impl CascadeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, origin: NodeId, generation: u64, due_ms: f64) -> u64 {
        self.next_id += 1;
        self.pending.push(PendingCascade {
            id: self.next_id,
            due_ms,
            origin,
            generation,
        });
        self.next_id
    }

    pub fn cancel(&mut self, id: u64) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Remove and return every entry due at or before `now_ms`, oldest first.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<PendingCascade> {
        let mut due: Vec<PendingCascade> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        due
    }

    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| p.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(feature = "web")]
pub use web::AnimationFrameScheduler;

#[cfg(feature = "web")]
mod web {
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{FrameHandle, FrameScheduler};
    use crate::error::{LandscapeError, Result};

    /// `requestAnimationFrame`-backed scheduler. `on_frame` receives the
    /// browser's high-resolution timestamp in milliseconds.
    pub struct AnimationFrameScheduler {
        on_frame: Rc<dyn Fn(f64)>,
    }

    impl AnimationFrameScheduler {
        pub fn new(on_frame: Rc<dyn Fn(f64)>) -> Self {
            Self { on_frame }
        }
    }

    impl FrameScheduler for AnimationFrameScheduler {
        fn request_frame(&mut self) -> Result<FrameHandle> {
            let window = web_sys::window()
                .ok_or_else(|| LandscapeError::Scheduler("no window".into()))?;
            let cb = self.on_frame.clone();
            // Frees itself after the single invocation.
            let js = Closure::once_into_js(move |ts: f64| cb(ts));
            let id = window
                .request_animation_frame(js.unchecked_ref())
                .map_err(|_| LandscapeError::Scheduler("requestAnimationFrame failed".into()))?;
            Ok(FrameHandle(id as u32 as u64))
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0 as u32 as i32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_scheduler_tracks_single_pending_frame() {
        let mut s = ManualScheduler::new();
        assert!(!s.is_pending());
        let h1 = s.request_frame().unwrap();
        let h2 = s.request_frame().unwrap();
        assert_ne!(h1, h2);
        // A stale handle cannot cancel the newer request.
        s.cancel_frame(h1);
        assert!(s.is_pending());
        s.cancel_frame(h2);
        assert!(!s.is_pending());
        assert_eq!(s.requested(), 2);
        assert_eq!(s.cancelled(), 1);
    }

    #[test]
    fn cascades_fire_in_due_order() {
        let mut q = CascadeQueue::new();
        q.schedule(3, 1, 300.0);
        q.schedule(1, 1, 100.0);
        q.schedule(2, 1, 200.0);
        assert_eq!(q.next_due(), Some(100.0));

        assert!(q.take_due(50.0).is_empty());
        let due = q.take_due(250.0);
        assert_eq!(due.iter().map(|p| p.origin).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancelled_cascades_never_fire() {
        let mut q = CascadeQueue::new();
        let a = q.schedule(1, 1, 10.0);
        q.schedule(2, 1, 10.0);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.take_due(100.0).len(), 1);

        q.schedule(5, 1, 10.0);
        q.schedule(6, 1, 20.0);
        assert_eq!(q.cancel_all(), 2);
        assert!(q.take_due(1e9).is_empty());
        assert!(q.is_empty());
    }
}
