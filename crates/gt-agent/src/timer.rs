//! Handle to a route's periodic tick task.

use tokio::task::AbortHandle;

/// Owned by exactly one active agent.
///
/// Dropping the handle does not stop the task; call [`cancel`][Self::cancel].
/// A task whose handle was dropped still stops on its own at its next tick,
/// when it finds the agent's generation has moved on.
#[derive(Debug)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    /// Abort the task.  No tick starts after this returns.
    pub fn cancel(self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}
