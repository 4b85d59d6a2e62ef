//! crates/summarizer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{GenerationBounds, NewSummary, Summary, SummaryPage, User, UserCredentials};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<User>;

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    async fn username_exists(&self, username: &str) -> PortResult<bool>;

    async fn email_exists(&self, email: &str) -> PortResult<bool>;

    async fn confirm_user(&self, user_id: Uuid) -> PortResult<()>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Summary History ---
    async fn save_summary(&self, summary: NewSummary) -> PortResult<Summary>;

    async fn get_summary_by_id(&self, summary_id: Uuid) -> PortResult<Summary>;

    /// Lists the user's own summaries, newest first. `page` is 1-based.
    async fn list_summaries_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> PortResult<SummaryPage>;

    async fn update_summary_text(&self, summary_id: Uuid, summary_text: &str) -> PortResult<()>;

    async fn delete_summary(&self, summary_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Produces a summary of `text` within the given token bounds.
    async fn summarize(&self, text: &str, bounds: GenerationBounds) -> PortResult<String>;
}

#[async_trait]
pub trait MailService: Send + Sync {
    /// Delivers an account confirmation link to `to`.
    async fn send_confirmation(&self, to: &str, confirm_url: &str) -> PortResult<()>;
}
