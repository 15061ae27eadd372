//! Tag repository port: the read-only tag catalog.

use std::future::Future;

use apiary_domain::error::ApiaryError;
use apiary_domain::tag::Tag;

pub trait TagRepository {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Tag>, ApiaryError>> + Send;
}
