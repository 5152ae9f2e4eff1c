//! Thin HTTP boundary over the timeline core.
//!
//! Handlers translate requests into explicit-identity core calls and map
//! the error taxonomy onto status codes via `AppError`; no business rules
//! live here.

pub mod follows;
pub mod posts;
pub mod timelines;

use crate::cache::SnapshotCache;
use crate::domain::Post;
use crate::error::Result;
use crate::services::{CounterService, FollowService, PostService, TimelineService};
use crate::store::DataStore;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler state: the core services plus the snapshot cache.
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub timelines: TimelineService,
    pub follows: FollowService,
    pub posts: PostService,
    pub counters: CounterService,
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            timelines: TimelineService::new(store.clone()),
            follows: FollowService::new(store.clone()),
            posts: PostService::new(store.clone()),
            counters: CounterService::new(store.clone()),
            store,
            cache,
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/internal/cache/clear", web::post().to(clear_cache))
        .service(
            web::scope("/api/v1")
                .route("/timeline", web::get().to(timelines::global_timeline))
                .route("/feed", web::get().to(timelines::follow_feed))
                .route(
                    "/groups/{slug}/timeline",
                    web::get().to(timelines::group_timeline),
                )
                .route(
                    "/users/{username}/timeline",
                    web::get().to(timelines::profile_timeline),
                )
                .route(
                    "/users/{username}/follow",
                    web::post().to(follows::follow_author),
                )
                .route(
                    "/users/{username}/follow",
                    web::delete().to(follows::unfollow_author),
                )
                .route("/posts", web::post().to(posts::create_post))
                .route("/posts/{id}", web::get().to(posts::post_detail))
                .route("/posts/{id}", web::put().to(posts::edit_post))
                .route("/posts/{id}/comments", web::post().to(posts::add_comment)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "timeline-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Manual snapshot invalidation hook for operational tooling and tests.
async fn clear_cache(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.cache.clear().await;
    Ok(HttpResponse::NoContent().finish())
}

/// Raw page token as supplied by the client; the pagination engine owns
/// parsing and fallback.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            text: post.text,
            group_id: post.group_id,
            image_key: post.image_key,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelinePageResponse {
    pub posts: Vec<PostResponse>,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl From<Page<Post>> for TimelinePageResponse {
    fn from(page: Page<Post>) -> Self {
        Self {
            posts: page.items.into_iter().map(PostResponse::from).collect(),
            page: page.number,
            total_pages: page.total_pages,
            has_previous: page.has_previous,
            has_next: page.has_next,
        }
    }
}
