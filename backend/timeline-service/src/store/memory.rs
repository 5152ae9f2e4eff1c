//! In-memory data store.
//!
//! Backs the test suite and local development so the timeline core runs
//! without PostgreSQL. Filter and order semantics must match
//! [`PgDataStore`](super::PgDataStore) exactly; mutations take the single
//! write lock, which makes each check-then-act atomic.

use super::{DataStore, NewComment, NewPost, PostChanges};
use crate::domain::{Comment, Group, Post, User};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    follows: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user; fixture setup only, account management is not part
    /// of this service.
    pub async fn seed_user(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Register a group; fixture setup only.
    pub async fn seed_group(&self, title: &str, slug: &str, description: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };
        self.tables
            .write()
            .await
            .groups
            .insert(group.id, group.clone());
        group
    }

    /// Insert a post with a caller-chosen timestamp, for ordering and
    /// tie-break fixtures.
    pub async fn seed_post_at(
        &self,
        author_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            text: text.to_string(),
            group_id,
            image_key: None,
            created_at,
        };
        self.tables
            .write()
            .await
            .posts
            .insert(post.id, post.clone());
        post
    }
}

fn timeline_sorted(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.timeline_key().cmp(&a.timeline_key()));
    posts
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(timeline_sorted(tables.posts.values().cloned().collect()))
    }

    async fn posts_by_group(&self, group_id: Uuid) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(timeline_sorted(
            tables
                .posts
                .values()
                .filter(|p| p.group_id == Some(group_id))
                .cloned()
                .collect(),
        ))
    }

    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(timeline_sorted(
            tables
                .posts
                .values()
                .filter(|p| p.author_id == author_id)
                .cloned()
                .collect(),
        ))
    }

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(timeline_sorted(
            tables
                .posts
                .values()
                .filter(|p| author_ids.contains(&p.author_id))
                .cloned()
                .collect(),
        ))
    }

    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .count() as i64)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            author_id: new_post.author_id,
            text: new_post.text,
            group_id: new_post.group_id,
            image_key: new_post.image_key,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .posts
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.get_mut(&post_id).map(|post| {
            post.text = changes.text;
            post.group_id = changes.group_id;
            post.clone()
        }))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(&post_id);
        tables.comments.retain(|_, c| c.post_id != post_id);
        Ok(())
    }

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            text: new_comment.text,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments)
    }

    async fn insert_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.insert((follower_id, author_id)))
    }

    async fn delete_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.remove(&(follower_id, author_id)))
    }

    async fn is_following(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains(&(follower_id, author_id)))
    }

    async fn following_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|(follower, _)| *follower == follower_id)
            .map(|(_, author)| *author)
            .collect())
    }
}
