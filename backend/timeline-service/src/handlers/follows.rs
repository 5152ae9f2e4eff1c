//! Follow graph endpoints.

use super::AppState;
use crate::auth::Identity;
use crate::domain::User;
use crate::error::{AppError, Result};
use actix_web::{web, HttpResponse};

async fn resolve_author(state: &AppState, username: &str) -> Result<User> {
    state
        .store
        .user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{}' does not exist", username)))
}

/// Follow an author. Idempotent; following yourself is a silent no-op.
pub async fn follow_author(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = resolve_author(&state, &username).await?;
    state.follows.follow(identity.0, author.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Unfollow an author. Removing an edge that does not exist is 404.
pub async fn unfollow_author(
    state: web::Data<AppState>,
    identity: Identity,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = resolve_author(&state, &username).await?;
    state.follows.unfollow(identity.0, author.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
