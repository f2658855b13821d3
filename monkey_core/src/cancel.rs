use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-way stop signal shared by every worker of a campaign.
///
/// The flag moves from unset to set exactly once and is never reset.
/// Writers are the OS signal handlers, a worker hitting a fatal oracle
/// failure, and a worker whose candidate was accepted; every worker polls
/// it at the top of each loop iteration, so the propagation delay is
/// bounded by one in-flight oracle invocation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    stop: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Asks every worker holding a clone of this token to stop at its next
    /// loop iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// The underlying flag, for registering OS signal handlers onto the
    /// same write path workers already poll.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}
