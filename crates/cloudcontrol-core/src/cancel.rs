//! Cooperative cancellation.
//!
//! A [`CancellationFlag`] is owned by each client and is the only mutable state the wait
//! machinery shares between calls. It is set by an external caller (a signal handler, a UI
//! action) and read by the poller once per tick. Nothing resets it automatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation switch. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create a flag in the non-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of all in-flight waits.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so later waits can run again.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());

        handle.cancel();
        assert!(flag.is_cancelled());

        flag.reset();
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn cancel_is_sticky() {
        let flag = CancellationFlag::new();
        flag.cancel();
        flag.cancel();
        assert!(flag.is_cancelled());
    }
}
