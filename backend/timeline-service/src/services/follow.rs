//! Follow graph operations.
//!
//! Creation is forgiving (get-or-create, self-follow silently refused);
//! removal is strict and surfaces NotFound when the edge is missing. The
//! asymmetry is intentional: unfollow is only reachable where a follow
//! indicator was shown.

use crate::error::{AppError, Result};
use crate::store::DataStore;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn DataStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Idempotent follow. Self-follow and an already-existing edge are both
    /// silent no-ops.
    pub async fn follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<()> {
        if follower_id == author_id {
            debug!(%follower_id, "refusing self-follow");
            return Ok(());
        }

        let created = self.store.insert_follow(follower_id, author_id).await?;
        if created {
            debug!(%follower_id, %author_id, "created follow edge");
        }
        Ok(())
    }

    /// Strict unfollow: the edge must exist.
    pub async fn unfollow(&self, follower_id: Uuid, author_id: Uuid) -> Result<()> {
        let removed = self.store.delete_follow(follower_id, author_id).await?;
        if !removed {
            return Err(AppError::NotFound("follow edge does not exist".into()));
        }

        debug!(%follower_id, %author_id, "removed follow edge");
        Ok(())
    }

    pub async fn is_following(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        Ok(self.store.is_following(follower_id, author_id).await?)
    }

    pub async fn followed_authors(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self.store.following_of(follower_id).await?)
    }
}
