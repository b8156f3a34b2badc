//! Scoped handle for a live room subscription.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running room subscription.
///
/// Delivery stops when the handle is released or dropped. Only
/// [`release`](Self::release) guarantees that no callback is still running
/// once it returns; dropping only requests cancellation.
#[derive(Debug)]
pub struct Subscription {
    room: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a delivery task that watches `cancel`.
    pub fn new(room: String, cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            room,
            cancel,
            task: Some(task),
        }
    }

    /// The normalized room this subscription delivers.
    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop delivery and wait for the delivery task to exit.
    pub async fn release(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(room = %self.room, "Subscription task panicked");
                }
            }
        }
        tracing::debug!(room = %self.room, "Subscription released");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
