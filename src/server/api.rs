//! JSON endpoints: login, logout, post creation, configuration report

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::ServerState;
use crate::auth::{cleared_marker, is_trusted, trust_marker, AuthError};
use crate::content::{is_valid_slug, NewPost};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: Option<String>,
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<Arc<ServerState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let auth = &state.blog.auth;
    if !auth.is_configured() {
        return Err(AuthError::NotConfigured);
    }

    let request: LoginRequest =
        serde_json::from_slice(&body).map_err(|_| AuthError::InvalidBody)?;
    auth.verify(request.password.as_deref().unwrap_or(""))?;

    tracing::info!("Admin login succeeded");
    Ok((jar.add(trust_marker()), Json(json!({ "success": true }))))
}

/// `POST /api/logout`
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (jar.add(cleared_marker()), Json(json!({ "success": true })))
}

/// `POST /api/posts`
pub async fn create_post(
    State(state): State<Arc<ServerState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !is_trusted(&jar) {
        return Err(ApiError::Unauthorized);
    }

    let new_post: NewPost = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid post: {}", e)))?;

    if new_post.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title required".into()));
    }

    let post = new_post.into_post();
    if !is_valid_slug(&post.slug) {
        return Err(ApiError::BadRequest(format!("Invalid slug: {:?}", post.slug)));
    }

    if state.blog.posts.create_post(&post).await {
        Ok(Json(json!({ "success": true, "slug": post.slug })))
    } else {
        Err(ApiError::CreateFailed)
    }
}

/// `GET /api/debug` - which settings are present, never their values
pub async fn debug(State(state): State<Arc<ServerState>>) -> Json<Value> {
    let config = &state.blog.config;
    let has = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.trim().is_empty());

    Json(json!({
        "configured": {
            "admin_password": state.blog.auth.is_configured(),
            "github_owner": has(&config.store.owner),
            "github_repo": has(&config.store.repo),
            "github_token": has(&config.store.token),
            "store": state.blog.posts.is_configured(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to create post")]
    CreateFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CreateFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::debug!("API error {}: {}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
