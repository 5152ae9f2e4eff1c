//! Per-author aggregates for profile and detail views.
//!
//! Computed fresh on every call; these back views where staleness is not
//! tolerated. The count must agree with the author timeline filter at all
//! times.

use crate::error::Result;
use crate::store::DataStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CounterService {
    store: Arc<dyn DataStore>,
}

impl CounterService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn post_count(&self, author_id: Uuid) -> Result<i64> {
        Ok(self.store.count_posts_by_author(author_id).await?)
    }
}
