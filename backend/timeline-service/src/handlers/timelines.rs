//! Read endpoints: the four timeline views.

use super::{AppState, PageParams, TimelinePageResponse};
use crate::auth::Viewer;
use crate::cache::CacheKey;
use crate::domain::{Group, User};
use crate::error::Result;
use crate::services::TimelineView;
use actix_web::{http::header::ContentType, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupTimelineResponse {
    pub group: GroupResponse,
    pub timeline: TimelinePageResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub author: UserResponse,
    pub post_count: i64,
    /// Whether the viewer follows this author; drives the follow/unfollow
    /// affordance. Always false for anonymous viewers.
    pub following: bool,
    pub timeline: TimelinePageResponse,
}

/// Global timeline. The first page is served from the snapshot cache and
/// may lag writes by the staleness window; deeper pages are always fresh.
pub async fn global_timeline(
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let token = query.page.as_deref();

    // Out-of-range tokens clamp at paginate time, so only tokens that
    // already resolve to page 1 can share the cached snapshot.
    if pagination::requested_page(token) == 1 {
        let timelines = state.timelines.clone();
        let body = state
            .cache
            .get_or_compute(&CacheKey::global_page(1), || async move {
                let page = timelines.page(&TimelineView::Global, None, None).await?;
                Ok(serde_json::to_string(&TimelinePageResponse::from(page))?)
            })
            .await?;

        return Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body));
    }

    let page = state
        .timelines
        .page(&TimelineView::Global, None, token)
        .await?;
    Ok(HttpResponse::Ok().json(TimelinePageResponse::from(page)))
}

/// Group timeline; an unknown slug is 404, a known group with no posts is
/// an empty page.
pub async fn group_timeline(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let (group, page) = state
        .timelines
        .group_page(&slug, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(GroupTimelineResponse {
        group: group.into(),
        timeline: page.into(),
    }))
}

/// Author timeline with profile context: fresh post count and the viewer's
/// follow state.
pub async fn profile_timeline(
    state: web::Data<AppState>,
    viewer: Viewer,
    username: web::Path<String>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let (author, page) = state
        .timelines
        .author_page(&username, query.page.as_deref())
        .await?;

    let post_count = state.counters.post_count(author.id).await?;
    let following = match viewer.0 {
        Some(viewer_id) => state.follows.is_following(viewer_id, author.id).await?,
        None => false,
    };

    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: author.into(),
        post_count,
        following,
        timeline: page.into(),
    }))
}

/// Personalized follow feed; anonymous callers get 401 from the core.
pub async fn follow_feed(
    state: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let page = state
        .timelines
        .page(&TimelineView::FollowFeed, viewer.0, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(TimelinePageResponse::from(page)))
}
