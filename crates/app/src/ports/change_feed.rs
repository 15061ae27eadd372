//! Change feed port: tell presentation layers what changed.

use std::future::Future;

use apiary_domain::change::Change;
use apiary_domain::error::ApiaryError;

/// Publishes confirmed changes to interested subscribers.
pub trait ChangePublisher {
    /// Publish a change to all current subscribers.
    fn publish(&self, change: Change) -> impl Future<Output = Result<(), ApiaryError>> + Send;
}

impl<T: ChangePublisher + Send + Sync> ChangePublisher for std::sync::Arc<T> {
    fn publish(&self, change: Change) -> impl Future<Output = Result<(), ApiaryError>> + Send {
        (**self).publish(change)
    }
}
