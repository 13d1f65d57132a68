//! Synchronization primitives shared between a searching player and its
//! host (or ponder supervisor).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// A thread-safe stop flag for cooperative search termination.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Shared handle controlling one player's search: an abort flag plus a
/// movable wall-clock deadline.
///
/// The deadline sits behind a mutex rather than an atomic because the
/// search only consults it at its periodic node-count check; the ponder
/// host moves it while the worker is mid-search.
#[derive(Clone, Default)]
pub struct SearchControl {
    abort: StopFlag,
    deadline: Arc<Mutex<Option<Instant>>>,
}

impl SearchControl {
    #[must_use]
    pub fn new() -> SearchControl {
        SearchControl {
            abort: StopFlag::new(),
            deadline: Arc::new(Mutex::new(None)),
        }
    }

    /// Request the search stop at its next check. The search clears this
    /// flag when a new top-level call begins, so a canceller racing that
    /// clear must keep re-asserting until it observes completion.
    pub fn abort(&self) {
        self.abort.stop();
    }

    #[inline]
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.abort.is_stopped()
    }

    pub(crate) fn clear_abort(&self) {
        self.abort.reset();
    }

    pub fn set_deadline(&self, deadline: Option<Instant>) {
        *self.deadline.lock() = deadline;
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.lock()
    }

    /// True when a deadline is set and has passed.
    #[must_use]
    pub fn deadline_expired(&self, now: Instant) -> bool {
        match *self.deadline.lock() {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stop_flag_lifecycle() {
        let flag = StopFlag::new();
        assert!(!flag.is_stopped());
        flag.stop();
        assert!(flag.is_stopped());
        flag.reset();
        assert!(!flag.is_stopped());
    }

    #[test]
    fn stop_flag_is_shared_between_clones() {
        let a = StopFlag::new();
        let b = a.clone();
        a.stop();
        assert!(b.is_stopped());
    }

    #[test]
    fn control_deadline_moves() {
        let control = SearchControl::new();
        let now = Instant::now();
        assert!(!control.deadline_expired(now));

        control.set_deadline(Some(now));
        assert!(control.deadline_expired(now + Duration::from_millis(1)));

        control.set_deadline(Some(now + Duration::from_secs(3600)));
        assert!(!control.deadline_expired(now));
    }
}
