//! services/web/src/web/auth.rs
//!
//! Account endpoints: registration, email confirmation, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Form,
};
use chrono::{Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use summarizer_core::ports::PortError;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::web::flash::{self, Flash};
use crate::web::middleware::{CurrentUser, MaybeUser, SESSION_COOKIE};
use crate::web::pages::{render, Layout, LoginTemplate, RegisterTemplate};
use crate::web::state::AppState;

const SESSION_DAYS: i64 = 30;
const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Failed to parse password hash: {:?}", e);
            false
        }
    }
}

fn session_cookie(state: &AppState, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        value,
        if state.config.cookie_secure { " Secure;" } else { "" },
        max_age_secs
    )
}

/// Checks the registration form, returning the first problem found.
fn validate_registration(form: &RegisterForm) -> Option<&'static str> {
    if form.username.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Some("All fields are required.");
    }
    if !EMAIL_RE.is_match(form.email.trim()) {
        return Some("Please enter a valid email address.");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Password must be at least 8 characters long.");
    }
    None
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /register - Render the registration form
pub async fn register_page(
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
) -> Result<Response> {
    render(&RegisterTemplate {
        layout: Layout::new(user, &headers),
        username: String::new(),
        email: String::new(),
    })
}

/// POST /register - Create a new, unconfirmed account
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, redirect to the login page"),
        (status = 200, description = "Form re-rendered with an error message")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_lowercase();

    let rejection = |message: &str| {
        warn!(username = %username, reason = message, "Registration rejected");
        render(&RegisterTemplate {
            layout: Layout::new(user.clone(), &headers).with(Flash::error(message)),
            username: username.clone(),
            email: email.clone(),
        })
    };

    if let Some(problem) = validate_registration(&form) {
        return rejection(problem);
    }
    if state.db.username_exists(&username).await? {
        return rejection("Username already exists.");
    }
    if state.db.email_exists(&email).await? {
        return rejection("Email already registered.");
    }

    // 1. Hash the password
    let password_hash = match hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {:?}", e);
            return rejection("Registration failed. Please try again.");
        }
    };

    // 2. Create user in database
    let created = match state.db.create_user(&username, &email, &password_hash).await {
        Ok(created) => created,
        // Lost a race with a concurrent registration for the same name or address.
        Err(PortError::Conflict(_)) => return rejection("Username or email already registered."),
        Err(e) => return Err(e.into()),
    };
    info!(user_id = %created.user_id, username = %created.username, "User registered");

    // 3. Send the confirmation link
    let token = state.signer.generate(&created.email);
    let confirm_url = format!("{}/confirm_email/{}", state.config.public_base_url, token);
    if let Err(e) = state.mailer.send_confirmation(&created.email, &confirm_url).await {
        error!("Failed to send confirmation email: {:?}", e);
        return Ok(flash::redirect_with(
            "/login",
            Flash::error("Account created, but the confirmation email could not be sent."),
        ));
    }

    Ok(flash::redirect_with(
        "/login",
        Flash::success("Registration successful. Please check your email to confirm your account."),
    ))
}

/// GET /confirm_email/{token} - Confirm ownership of the account's email
#[utoipa::path(
    get,
    path = "/confirm_email/{token}",
    params(("token" = String, Path, description = "Signed confirmation token from the email.")),
    responses((status = 303, description = "Redirect to the login page with the outcome"))
)]
pub async fn confirm_email_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response> {
    let invalid = || {
        flash::redirect_with(
            "/login",
            Flash::error("The confirmation link is invalid or has expired."),
        )
    };

    let email = match state.signer.verify(&token) {
        Ok(email) => email,
        Err(e) => {
            warn!(reason = %e, "Rejected confirmation token");
            return Ok(invalid());
        }
    };

    let user = match state.db.get_user_by_email(&email).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => {
            warn!(email = %email, "Confirmation token for unknown account");
            return Ok(invalid());
        }
        Err(e) => return Err(e.into()),
    };

    if user.confirmed {
        return Ok(flash::redirect_with(
            "/login",
            Flash::info("Account already confirmed. Please log in."),
        ));
    }

    state.db.confirm_user(user.user_id).await?;
    info!(user_id = %user.user_id, "Email confirmed");
    Ok(flash::redirect_with(
        "/login",
        Flash::success("Your account has been confirmed. You can now log in."),
    ))
}

/// GET /login - Render the login form
pub async fn login_page(MaybeUser(user): MaybeUser, headers: HeaderMap) -> Result<Response> {
    render(&LoginTemplate {
        layout: Layout::new(user, &headers),
        username: String::new(),
    })
}

/// POST /login - Login with existing account
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Login successful, session cookie set"),
        (status = 200, description = "Form re-rendered with an error message")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let username = form.username.trim().to_string();

    let rejection = |message: &str| {
        warn!(username = %username, reason = message, "Login refused");
        render(&LoginTemplate {
            layout: Layout::new(None, &headers).with(Flash::error(message)),
            username: username.clone(),
        })
    };

    // 1. Get user by username
    let user_creds = match state.db.get_credentials_by_username(&username).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return rejection("Invalid username or password."),
        Err(e) => return Err(e.into()),
    };

    // 2. Verify password
    if !verify_password(&form.password, &user_creds.hashed_password) {
        return rejection("Invalid username or password.");
    }

    // 3. Refuse accounts that have not confirmed their email yet
    if !user_creds.confirmed {
        return rejection("Please confirm your email address before logging in.");
    }

    // 4. Create auth session in database
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .db
        .create_auth_session(&auth_session_id, user_creds.user_id, expires_at)
        .await?;
    info!(user_id = %user_creds.user_id, "User logged in");

    // 5. Set the session cookie and go home
    let cookie = session_cookie(
        &state,
        &auth_session_id,
        Duration::days(SESSION_DAYS).num_seconds(),
    );
    let mut response = flash::redirect_with("/", Flash::success("Logged in successfully."));
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// GET /logout - Logout and invalidate session
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Session ended, redirect home"))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    if let Some(auth_session_id) = flash::cookie_value(&headers, SESSION_COOKIE) {
        state.db.delete_auth_session(auth_session_id).await?;
    }
    info!(user_id = %user.user_id, "User logged out");

    let mut response = flash::redirect_with("/", Flash::info("You have been logged out."));
    if let Ok(value) = HeaderValue::from_str(&session_cookie(&state, "", 0)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_registration_validation() {
        assert_eq!(validate_registration(&form("alice", "alice@example.com", "password1")), None);
        assert_eq!(
            validate_registration(&form(" ", "alice@example.com", "password1")),
            Some("All fields are required.")
        );
        assert_eq!(
            validate_registration(&form("alice", "not-an-email", "password1")),
            Some("Please enter a valid email address.")
        );
        assert_eq!(
            validate_registration(&form("alice", "alice@example.com", "short")),
            Some("Password must be at least 8 characters long.")
        );
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
