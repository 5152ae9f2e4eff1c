//! Boundary tests: routing, identity extraction, error mapping, and the
//! snapshot-cache window, all over the in-memory store.

use actix_web::{test, web, App};
use chrono::{Duration as TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use timeline_service::auth::{issue_token, JwtKeys};
use timeline_service::cache::SnapshotCache;
use timeline_service::handlers::timelines::{GroupTimelineResponse, ProfileResponse};
use timeline_service::handlers::posts::PostDetailResponse;
use timeline_service::handlers::{self, AppState, PostResponse, TimelinePageResponse};
use timeline_service::store::{DataStore, MemoryStore};
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn state(store: &Arc<MemoryStore>) -> web::Data<AppState> {
    let cache = Arc::new(SnapshotCache::new(Duration::from_secs(20)));
    web::Data::new(AppState::new(store.clone(), cache))
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(state($store))
                .app_data(web::Data::new(JwtKeys::from_secret(SECRET)))
                .configure(handlers::routes),
        )
        .await
    };
}

fn bearer(user_id: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", issue_token(SECRET, user_id)))
}

#[actix_web::test]
async fn health_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(&store);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn global_timeline_paginates_and_clamps() {
    let store = Arc::new(MemoryStore::new());
    let author = store.seed_user("poster").await;
    let base = Utc::now();
    for i in 0..15 {
        store
            .seed_post_at(author.id, &format!("post {}", i), None, base + TimeDelta::seconds(i))
            .await;
    }
    let app = init_app!(&store);

    let first: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/timeline").to_request(),
    )
    .await;
    assert_eq!(first.posts.len(), 10);
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_next);

    let second: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/timeline?page=2")
            .to_request(),
    )
    .await;
    assert_eq!(second.posts.len(), 5);
    assert_eq!(second.page, 2);
    assert!(!second.has_next);

    // Past the end clamps to the last page.
    let clamped: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/timeline?page=3")
            .to_request(),
    )
    .await;
    assert_eq!(clamped.page, 2);
    assert_eq!(clamped.posts.len(), 5);

    // Non-numeric tokens fall back to page 1.
    let fallback: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/timeline?page=abc")
            .to_request(),
    )
    .await;
    assert_eq!(fallback.page, 1);
    assert_eq!(fallback.posts.len(), 10);
}

#[actix_web::test]
async fn global_snapshot_survives_deletion_until_cleared() {
    let store = Arc::new(MemoryStore::new());
    let author = store.seed_user("poster").await;
    let post = store
        .seed_post_at(author.id, "ephemeral text", None, Utc::now())
        .await;
    let app = init_app!(&store);

    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get().uri("/api/v1/timeline").to_request(),
    )
    .await;
    assert!(String::from_utf8_lossy(&body).contains("ephemeral text"));

    // The post is gone from the store, but the snapshot window still serves it.
    store.delete_post(post.id).await.unwrap();
    let body = test::call_and_read_body(
        &app,
        test::TestRequest::get().uri("/api/v1/timeline").to_request(),
    )
    .await;
    assert!(String::from_utf8_lossy(&body).contains("ephemeral text"));

    // Manual clear is the explicit invalidation hook.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/internal/cache/clear")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let fresh: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/v1/timeline").to_request(),
    )
    .await;
    assert!(fresh.posts.is_empty());
}

#[actix_web::test]
async fn follow_feed_requires_auth_and_respects_the_graph() {
    let store = Arc::new(MemoryStore::new());
    let u1 = store.seed_user("u1").await;
    let u2 = store.seed_user("u2").await;
    let u3 = store.seed_user("u3").await;
    store.seed_post_at(u1.id, "from u1", None, Utc::now()).await;
    let app = init_app!(&store);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/feed").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/u1/follow")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let feed: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/feed")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert_eq!(feed.posts.len(), 1);
    assert_eq!(feed.posts[0].text, "from u1");

    let feed: TimelinePageResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/feed")
            .insert_header(bearer(u3.id))
            .to_request(),
    )
    .await;
    assert!(feed.posts.is_empty());
}

#[actix_web::test]
async fn follow_and_unfollow_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let u1 = store.seed_user("u1").await;
    let u2 = store.seed_user("u2").await;
    let app = init_app!(&store);

    // No edge yet: strict unfollow is 404.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/u1/follow")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/users/u1/follow")
                .insert_header(bearer(u2.id))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 204);
    }

    let profile: ProfileResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/u1/timeline")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert!(profile.following);
    assert_eq!(profile.author.id, u1.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/u1/follow")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/users/u1/follow")
            .insert_header(bearer(u2.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn self_follow_is_accepted_but_creates_nothing() {
    let store = Arc::new(MemoryStore::new());
    let u1 = store.seed_user("u1").await;
    let app = init_app!(&store);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/u1/follow")
            .insert_header(bearer(u1.id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let profile: ProfileResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/u1/timeline")
            .insert_header(bearer(u1.id))
            .to_request(),
    )
    .await;
    assert!(!profile.following);
}

#[actix_web::test]
async fn unknown_scopes_are_not_found() {
    let store = Arc::new(MemoryStore::new());
    let app = init_app!(&store);

    let missing_post = format!("/api/v1/posts/{}", Uuid::new_v4());
    for uri in [
        "/api/v1/groups/missing/timeline",
        "/api/v1/users/missing/timeline",
        missing_post.as_str(),
    ] {
        let resp =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), 404, "uri {}", uri);
    }
}

#[actix_web::test]
async fn post_creation_validates_and_requires_auth() {
    let store = Arc::new(MemoryStore::new());
    let author = store.seed_user("author").await;
    let group = store.seed_group("Group", "g", "desc").await;
    let app = init_app!(&store);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .set_json(serde_json::json!({ "text": "hi" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(author.id))
            .set_json(serde_json::json!({ "text": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header(bearer(author.id))
            .set_json(serde_json::json!({ "text": "hi", "group_id": Uuid::new_v4() }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(author.id))
        .set_json(serde_json::json!({ "text": "a grouped post", "group_id": group.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: PostResponse = test::read_body_json(resp).await;
    assert_eq!(created.author_id, author.id);
    assert_eq!(created.group_id, Some(group.id));

    let group_page: GroupTimelineResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/groups/g/timeline")
            .to_request(),
    )
    .await;
    assert_eq!(group_page.group.slug, "g");
    assert_eq!(group_page.timeline.posts.len(), 1);
    assert_eq!(group_page.timeline.posts[0].id, created.id);
}

#[actix_web::test]
async fn only_the_author_edits_a_post() {
    let store = Arc::new(MemoryStore::new());
    let owner = store.seed_user("owner").await;
    let intruder = store.seed_user("intruder").await;
    let post = store
        .seed_post_at(owner.id, "original", None, Utc::now())
        .await;
    let app = init_app!(&store);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{}", post.id))
            .insert_header(bearer(intruder.id))
            .set_json(serde_json::json!({ "text": "hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let edited: PostResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/posts/{}", post.id))
            .insert_header(bearer(owner.id))
            .set_json(serde_json::json!({ "text": "revised" }))
            .to_request(),
    )
    .await;
    assert_eq!(edited.text, "revised");
    assert_eq!(edited.author_id, owner.id);
    assert_eq!(edited.created_at, post.created_at);
}

#[actix_web::test]
async fn comments_attach_to_an_existing_post() {
    let store = Arc::new(MemoryStore::new());
    let author = store.seed_user("author").await;
    let commenter = store.seed_user("commenter").await;
    let post = store.seed_post_at(author.id, "post", None, Utc::now()).await;
    let app = init_app!(&store);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/comments", post.id))
            .set_json(serde_json::json!({ "text": "anon" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/comments", Uuid::new_v4()))
            .insert_header(bearer(commenter.id))
            .set_json(serde_json::json!({ "text": "lost" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/comments", post.id))
            .insert_header(bearer(commenter.id))
            .set_json(serde_json::json!({ "text": "first!" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let detail: PostDetailResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/posts/{}", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(detail.post.id, post.id);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].text, "first!");
    assert_eq!(detail.comments[0].author_id, commenter.id);
    assert_eq!(detail.author_post_count, 1);
}
