//! services/web/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification of the form endpoints.

use utoipa::OpenApi;

use crate::web::{auth, history, summarize};

#[derive(OpenApi)]
#[openapi(
    paths(
        summarize::summarize_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::confirm_email_handler,
        history::history_handler,
        history::edit_summary_handler,
        history::delete_summary_handler,
        crate::web::health_handler,
    ),
    components(
        schemas(auth::RegisterForm, auth::LoginForm, history::EditSummaryForm)
    ),
    tags(
        (name = "Document Summarizer", description = "Server-rendered endpoints for summarizing text and documents.")
    )
)]
pub struct ApiDoc;
