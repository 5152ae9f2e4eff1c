//! Post and comment endpoints.

use super::{AppState, PostResponse};
use crate::auth::Identity;
use crate::domain::Comment;
use crate::error::Result;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub text: String,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    /// Comments in creation order, oldest first.
    pub comments: Vec<CommentResponse>,
    /// Fresh post count for the post's author, shown next to the detail.
    pub author_post_count: i64,
}

pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = state
        .posts
        .create_post(
            identity.0,
            &req.text,
            req.group_id,
            req.image_key.clone(),
        )
        .await?;

    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

pub async fn edit_post(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = state
        .posts
        .edit_post(identity.0, *post_id, &req.text, req.group_id)
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.posts.get_post(*post_id).await?;
    let comments = state.posts.comments(*post_id).await?;
    let author_post_count = state.counters.post_count(post.author_id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post.into(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
        author_post_count,
    }))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = state
        .posts
        .add_comment(identity.0, *post_id, &req.text)
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}
