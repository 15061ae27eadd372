//! In-process change feed backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use apiary_domain::change::Change;
use apiary_domain::error::ApiaryError;

use crate::ports::ChangePublisher;

/// In-process change feed using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when nobody listens; the change is dropped.
pub struct InProcessChangeFeed {
    sender: broadcast::Sender<Change>,
}

impl InProcessChangeFeed {
    /// Create a feed with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every change published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }
}

impl Default for InProcessChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangePublisher for InProcessChangeFeed {
    fn publish(&self, change: Change) -> impl Future<Output = Result<(), ApiaryError>> + Send {
        // send only fails without receivers
        let _ = self.sender.send(change);
        async { Ok(()) }
    }
}
