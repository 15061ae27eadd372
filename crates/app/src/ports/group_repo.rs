//! Group repository port: groups are listed and updated, never created here.

use std::future::Future;

use apiary_domain::error::ApiaryError;
use apiary_domain::group::Group;

pub trait GroupRepository {
    /// Get all groups.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Group>, ApiaryError>> + Send;

    /// Replace a group's assignments and flags, returning it as stored.
    fn update(&self, group: Group) -> impl Future<Output = Result<Group, ApiaryError>> + Send;
}
