//! services/web/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, and an extractor for
//! pages that render differently for logged-in users.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;
use summarizer_core::ports::PortError;
use tracing::warn;
use uuid::Uuid;

use crate::web::flash::{self, Flash};
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The logged-in user behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Resolves the `session` cookie to a user. Any failure means "anonymous".
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let auth_session_id = flash::cookie_value(headers, SESSION_COOKIE).filter(|s| !s.is_empty())?;

    let user_id = match state.db.validate_auth_session(auth_session_id).await {
        Ok(user_id) => user_id,
        Err(PortError::Unauthorized) => return None,
        Err(e) => {
            warn!("Failed to validate auth session: {:?}", e);
            return None;
        }
    };

    match state.db.get_user_by_id(user_id).await {
        Ok(user) => Some(CurrentUser {
            user_id: user.user_id,
            username: user.username,
        }),
        Err(e) => {
            warn!("Auth session points at a missing user {}: {:?}", user_id, e);
            None
        }
    }
}

/// Extractor for routes open to everyone that still want to know who is asking.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(state, &parts.headers).await))
    }
}

/// Middleware that validates the auth session cookie and extracts the user.
///
/// If valid, inserts the `CurrentUser` into request extensions for handlers to use.
/// If invalid or missing, redirects to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, req.headers()).await {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => flash::redirect_with("/login", Flash::info("Please log in to access this page.")),
    }
}
