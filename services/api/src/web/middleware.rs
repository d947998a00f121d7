//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::services::auth;
use crate::web::state::AppState;

/// The raw session token travels in this header, without a `Bearer` prefix.
pub const TOKEN_HEADER: &str = "token";

/// The user a request was authenticated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Middleware that validates the `token` header and extracts the user_id.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    // 1. Extract token header
    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::Auth("Token is missing!".to_string()))?;

    // 2. Verify signature and expiry, get user_id
    let user_id = auth::verify(&state, token).inspect_err(|e| {
        warn!("Rejected request to {}: {}", req.uri().path(), e);
    })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(AuthUser(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
