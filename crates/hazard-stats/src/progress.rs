//! Progress reporting and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress events from a running operator and can ask it to stop.
pub trait ProgressListener: Send + Sync {
    fn started(&self) {}

    /// Fraction of work done, in `0.0..=1.0`.
    fn progress(&self, _fraction: f32) {}

    fn complete(&self) {}

    /// Polled between units of work.
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Listener that ignores events and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressListener;

impl ProgressListener for NullProgressListener {}

/// Shared cancellation flag.
///
/// Clones share the flag, so one clone can be handed to the operator while
/// another cancels it from a different thread.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl ProgressListener for CancelFlag {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
