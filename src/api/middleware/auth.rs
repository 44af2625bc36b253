//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it against the
//! sessions table, and injects `AuthContext` into request extensions for
//! downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::context::{AppState, AuthContext};
use crate::api::error::ApiError;
use crate::auth;

/// Require a valid bearer session.
///
/// Accesses `AppState` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let state: AppState = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or(ApiError::Internal("missing app state".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let conn = state.conn()?;
    let session = auth::authenticate(&conn, &token)?.ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthContext {
        user_id: session.user_id,
        role: session.role,
        profile_id: session.profile_id,
    });

    Ok(next.run(req).await)
}
