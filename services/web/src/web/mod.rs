pub mod auth;
pub mod docs;
pub mod flash;
pub mod history;
pub mod middleware;
pub mod pages;
pub mod state;
pub mod summarize;
pub mod token;

pub use docs::ApiDoc;
pub use middleware::require_auth;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the application router with every page route.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(summarize::home_handler))
        .route("/summarize", post(summarize::summarize_handler))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_handler),
        )
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/confirm_email/{token}", get(auth::confirm_email_handler))
        .route("/health", get(health_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/logout", get(auth::logout_handler))
        .route("/history", get(history::history_handler))
        .route(
            "/edit_summary/{id}",
            get(history::edit_summary_page).post(history::edit_summary_handler),
        )
        .route(
            "/delete_summary/{id}",
            post(history::delete_summary_handler),
        )
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
