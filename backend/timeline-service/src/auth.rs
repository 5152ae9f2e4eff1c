//! Bearer-token identity extraction for the HTTP boundary.
//!
//! The boundary only validates tokens and threads the resulting identity
//! into core calls as an explicit parameter; credential management lives
//! outside this service. Read endpoints take [`Viewer`] (anonymous allowed),
//! mutation endpoints and the follow feed take [`Identity`].

use crate::error::AppError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}

/// Shared token verification state, registered as app data.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid token subject".into()))
    }
}

/// Mint a short-lived HS256 token for a user. Used by test fixtures and
/// operational tooling; the production issuer is the identity provider.
pub fn issue_token(secret: &str, user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 signing cannot fail with an in-memory key")
}

fn bearer_identity(req: &HttpRequest) -> Result<Option<Uuid>, AppError> {
    let Some(header) = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(None);
    };

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("invalid Authorization scheme".into()))?;

    let keys = req
        .app_data::<web::Data<JwtKeys>>()
        .ok_or_else(|| AppError::Internal("JWT keys not configured".into()))?;

    keys.verify(token).map(Some)
}

/// Authenticated caller identity; extraction fails with Unauthorized when
/// the request carries no valid token.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Uuid);

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(bearer_identity(req).and_then(|identity| {
            identity
                .map(Identity)
                .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
        }))
    }
}

/// Optional viewer identity for read endpoints; anonymous requests extract
/// as `Viewer(None)`. A malformed or expired token is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<Uuid>);

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(bearer_identity(req).map(Viewer))
    }
}
