//! Data-store seam for the timeline core.
//!
//! Every core service works against [`DataStore`] so the pipeline runs the
//! same way over PostgreSQL in production and the in-memory store in tests.
//! Implementations own filter and order semantics: post listings come back
//! in the timeline total order (created_at descending, id descending), and
//! follow-edge mutations are atomic with respect to their uniqueness and
//! existence checks.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDataStore;

use crate::domain::{Comment, Group, Post, User};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Fields required to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_key: Option<String>,
}

/// Author-editable fields of an existing post.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<Uuid>,
}

/// Fields required to create a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    // ===== Users & groups =====

    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>>;

    // ===== Posts =====

    /// Every post, timeline-ordered.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Posts tagged to a group, timeline-ordered.
    async fn posts_by_group(&self, group_id: Uuid) -> Result<Vec<Post>>;

    /// Posts by a single author, timeline-ordered.
    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>>;

    /// Posts by any of the given authors, timeline-ordered. An empty author
    /// set yields an empty sequence.
    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<Post>>;

    /// Must count exactly the posts `posts_by_author` returns.
    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64>;

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    async fn insert_post(&self, new_post: NewPost) -> Result<Post>;

    /// Returns `None` when the post no longer exists.
    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    /// Removing a post must drop it from every listing and count; removing
    /// an unknown id is a no-op.
    async fn delete_post(&self, post_id: Uuid) -> Result<()>;

    // ===== Comments =====

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment>;

    /// Comments under a post in creation order (oldest first).
    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    // ===== Follow edges =====

    /// Create the edge unless it already exists; returns whether a new edge
    /// was inserted. Check and insert are atomic.
    async fn insert_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Delete the edge; returns whether one was removed.
    async fn delete_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool>;

    async fn is_following(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool>;

    /// Authors the follower has edges to, in no particular order.
    async fn following_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>>;
}
