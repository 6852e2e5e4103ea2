//! Mock host lifecycle source for testing and development.

use crate::traits::HostLifecycle;
use scalelink_core::constants::RESUME_CHANNEL_CAPACITY;
use tokio::sync::broadcast;

/// Mock host lifecycle source.
///
/// Simulates the host application's foreground-resume signal. Resume
/// waiters subscribe through [`HostLifecycle::subscribe_resume`]; the
/// paired handle fires signals.
///
/// # Examples
///
/// ```
/// use scalelink_driver::HostLifecycle;
/// use scalelink_driver::mock::MockHostLifecycle;
///
/// #[tokio::main]
/// async fn main() {
///     let (lifecycle, handle) = MockHostLifecycle::new();
///
///     let mut resume = lifecycle.subscribe_resume();
///     handle.fire_resume();
///     resume.recv().await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct MockHostLifecycle {
    resume_tx: broadcast::Sender<()>,
}

impl MockHostLifecycle {
    /// Create a new mock lifecycle source and its control handle.
    pub fn new() -> (Self, MockHostLifecycleHandle) {
        let (resume_tx, _) = broadcast::channel(RESUME_CHANNEL_CAPACITY);

        let lifecycle = Self {
            resume_tx: resume_tx.clone(),
        };
        let handle = MockHostLifecycleHandle { resume_tx };

        (lifecycle, handle)
    }
}

impl HostLifecycle for MockHostLifecycle {
    fn subscribe_resume(&self) -> broadcast::Receiver<()> {
        self.resume_tx.subscribe()
    }
}

/// Handle for firing resume signals on a [`MockHostLifecycle`].
#[derive(Debug, Clone)]
pub struct MockHostLifecycleHandle {
    resume_tx: broadcast::Sender<()>,
}

impl MockHostLifecycleHandle {
    /// Fire a foreground-resume signal.
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is not an error; resumes with no pending waiter are simply dropped.
    pub fn fire_resume(&self) -> usize {
        self.resume_tx.send(()).unwrap_or(0)
    }

    /// Number of currently subscribed resume waiters.
    pub fn waiter_count(&self) -> usize {
        self.resume_tx.receiver_count()
    }
}
