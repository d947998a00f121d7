pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::{require_auth, AuthUser, TOKEN_HEADER};
pub use rest::{
    analyze_handler, compare_handler, list_summaries_handler, summary_history_handler, ApiDoc,
};

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/is-verify", get(auth::is_verify_handler))
        .route("/analyze", post(analyze_handler))
        .route("/summaries", get(list_summaries_handler))
        .route("/summaries/history", get(summary_history_handler))
        .route("/compare", post(compare_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
