//! Timeline query builder.
//!
//! Resolves a view kind plus scope into the ordered post sequence that
//! feeds the pagination engine. Scope resolution failures are hard
//! not-found conditions, distinct from an empty-but-valid result set.

use crate::domain::{Group, Post, User};
use crate::error::{AppError, Result};
use crate::store::DataStore;
use pagination::{paginate, Page, DEFAULT_PAGE_SIZE};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Which posts a timeline includes. Closed set: adding a view kind forces
/// every match below to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineView {
    /// All posts, unfiltered.
    Global,
    /// Posts tagged to the group with this slug.
    Group { slug: String },
    /// Posts authored by the user with this username.
    Author { username: String },
    /// Posts by authors the viewer follows; requires an authenticated viewer.
    FollowFeed,
}

#[derive(Clone)]
pub struct TimelineService {
    store: Arc<dyn DataStore>,
}

impl TimelineService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Resolve the full ordered sequence for a view.
    pub async fn build(&self, view: &TimelineView, viewer: Option<Uuid>) -> Result<Vec<Post>> {
        match view {
            TimelineView::Global => Ok(self.store.list_posts().await?),
            TimelineView::Group { slug } => {
                let group = self.resolve_group(slug).await?;
                Ok(self.store.posts_by_group(group.id).await?)
            }
            TimelineView::Author { username } => {
                let author = self.resolve_author(username).await?;
                Ok(self.store.posts_by_author(author.id).await?)
            }
            TimelineView::FollowFeed => {
                let viewer = viewer.ok_or_else(|| {
                    AppError::Unauthorized("follow feed requires an authenticated viewer".into())
                })?;
                let authors = self.store.following_of(viewer).await?;
                debug!(%viewer, followed = authors.len(), "building follow feed");
                Ok(self.store.posts_by_authors(&authors).await?)
            }
        }
    }

    /// Build a view and slice one page out of it.
    pub async fn page(
        &self,
        view: &TimelineView,
        viewer: Option<Uuid>,
        token: Option<&str>,
    ) -> Result<Page<Post>> {
        let posts = self.build(view, viewer).await?;
        Ok(paginate(&posts, token, DEFAULT_PAGE_SIZE))
    }

    /// Group timeline page together with the resolved group, for views that
    /// render group metadata next to the page.
    pub async fn group_page(&self, slug: &str, token: Option<&str>) -> Result<(Group, Page<Post>)> {
        let group = self.resolve_group(slug).await?;
        let posts = self.store.posts_by_group(group.id).await?;
        Ok((group, paginate(&posts, token, DEFAULT_PAGE_SIZE)))
    }

    /// Author timeline page together with the resolved author.
    pub async fn author_page(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<(User, Page<Post>)> {
        let author = self.resolve_author(username).await?;
        let posts = self.store.posts_by_author(author.id).await?;
        Ok((author, paginate(&posts, token, DEFAULT_PAGE_SIZE)))
    }

    async fn resolve_group(&self, slug: &str) -> Result<Group> {
        self.store
            .group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}' does not exist", slug)))
    }

    async fn resolve_author(&self, username: &str) -> Result<User> {
        self.store
            .user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' does not exist", username)))
    }
}
