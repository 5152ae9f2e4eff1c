//! Post and comment write path.
//!
//! Ownership and validation live here so the HTTP boundary stays thin:
//! only authors edit their posts, text is never empty, and group tags must
//! resolve.

use crate::domain::{Comment, Post};
use crate::error::{AppError, Result};
use crate::store::{DataStore, NewComment, NewPost, PostChanges};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn DataStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
        image_key: Option<String>,
    ) -> Result<Post> {
        let text = non_empty_text(text)?;
        self.check_group(group_id).await?;

        let post = self
            .store
            .insert_post(NewPost {
                author_id,
                text,
                group_id,
                image_key,
            })
            .await?;

        debug!(post_id = %post.id, %author_id, "created post");
        Ok(post)
    }

    /// Only the author may edit; author and creation time never change.
    pub async fn edit_post(
        &self,
        editor_id: Uuid,
        post_id: Uuid,
        text: &str,
        group_id: Option<Uuid>,
    ) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        if post.author_id != editor_id {
            return Err(AppError::Unauthorized(
                "only the author may edit a post".into(),
            ));
        }

        let text = non_empty_text(text)?;
        self.check_group(group_id).await?;

        self.store
            .update_post(post_id, PostChanges { text, group_id })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} does not exist", post_id)))
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {} does not exist", post_id)))
    }

    pub async fn add_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        text: &str,
    ) -> Result<Comment> {
        let text = non_empty_text(text)?;
        // The parent post must exist; comments are always scoped to one post.
        self.get_post(post_id).await?;

        let comment = self
            .store
            .insert_comment(NewComment {
                post_id,
                author_id,
                text,
            })
            .await?;

        debug!(comment_id = %comment.id, %post_id, "added comment");
        Ok(comment)
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self.store.comments_by_post(post_id).await?)
    }

    async fn check_group(&self, group_id: Option<Uuid>) -> Result<()> {
        if let Some(group_id) = group_id {
            self.store
                .group_by_id(group_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("group {} does not exist", group_id)))?;
        }
        Ok(())
    }
}

fn non_empty_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("text must not be empty".into()));
    }
    Ok(trimmed.to_string())
}
