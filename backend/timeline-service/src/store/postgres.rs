use super::{DataStore, NewComment, NewPost, PostChanges};
use crate::domain::{Comment, Group, Post, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const POST_COLUMNS: &str = "id, author_id, text, group_id, image_key, created_at";
const COMMENT_COLUMNS: &str = "id, post_id, author_id, text, created_at";

/// PostgreSQL-backed data store (source of truth).
#[derive(Clone)]
pub struct PgDataStore {
    pool: PgPool,
}

impl PgDataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PgDataStore {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by username")?;

        Ok(user)
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up group by slug")?;

        Ok(group)
    }

    async fn group_by_id(&self, id: Uuid) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up group by id")?;

        Ok(group)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts")?;

        Ok(posts)
    }

    async fn posts_by_group(&self, group_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE group_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list group posts")?;

        Ok(posts)
    }

    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list author posts")?;

        Ok(posts)
    }

    async fn posts_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ANY($1)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts for author set")?;

        Ok(posts)
    }

    async fn count_posts_by_author(&self, author_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count author posts")?;

        Ok(count)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up post by id")?;

        Ok(post)
    }

    async fn insert_post(&self, new_post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, author_id, text, group_id, image_key, created_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new_post.author_id)
        .bind(&new_post.text)
        .bind(new_post.group_id)
        .bind(&new_post.image_key)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert post")?;

        debug!(post_id = %post.id, author_id = %post.author_id, "inserted post");
        Ok(post)
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts
             SET text = $2, group_id = $3
             WHERE id = $1
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .bind(&changes.text)
        .bind(changes.group_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        debug!(%post_id, "deleted post");
        Ok(())
    }

    async fn insert_comment(&self, new_comment: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (id, post_id, author_id, text, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new_comment.post_id)
        .bind(new_comment.author_id)
        .bind(&new_comment.text)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert comment")?;

        Ok(comment)
    }

    async fn comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE post_id = $1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        Ok(comments)
    }

    async fn insert_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        // The unique pair constraint makes check-then-act a single statement.
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, author_id, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (follower_id, author_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .context("Failed to insert follow edge")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND author_id = $2")
            .bind(follower_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete follow edge")?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn is_following(&self, follower_id: Uuid, author_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND author_id = $2)",
        )
        .bind(follower_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check follow edge")?;

        Ok(exists)
    }

    async fn following_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>> {
        let authors: Vec<(Uuid,)> =
            sqlx::query_as("SELECT author_id FROM follows WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list followed authors")?;

        Ok(authors.into_iter().map(|(id,)| id).collect())
    }
}
