//! services/web/src/web/history.rs
//!
//! The logged-in user's saved summaries: paginated listing, edit, and delete.
//! Every handler here runs behind `require_auth`.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use serde::Deserialize;
use std::sync::Arc;
use summarizer_core::{domain::Summary, ports::PortError};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::Result;
use crate::web::flash::{self, Flash};
use crate::web::middleware::CurrentUser;
use crate::web::pages::{render, EditSummaryTemplate, HistoryTemplate, Layout};
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// 1-based page number. Values that are missing, unparsable, or below 1 mean page 1.
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
}

impl HistoryQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX)) as u32
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EditSummaryForm {
    pub summary_text: String,
}

/// Loads a summary for modification, or the redirect to send instead.
async fn load_owned(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
) -> Result<std::result::Result<Summary, Response>> {
    let not_found = || flash::redirect_with("/history", Flash::error("Summary not found."));

    let Ok(summary_id) = Uuid::parse_str(raw_id) else {
        warn!(id = raw_id, "Malformed summary id");
        return Ok(Err(not_found()));
    };
    let summary = match state.db.get_summary_by_id(summary_id).await {
        Ok(summary) => summary,
        Err(PortError::NotFound(_)) => return Ok(Err(not_found())),
        Err(e) => return Err(e.into()),
    };

    if summary.user_id != user.user_id {
        warn!(
            %summary_id,
            owner = %summary.user_id,
            requester = %user.user_id,
            "Refused access to another user's summary"
        );
        return Ok(Err(flash::redirect_with(
            "/history",
            Flash::error("You are not authorized to modify this summary."),
        )));
    }
    Ok(Ok(summary))
}

/// GET /history - List the current user's summaries
#[utoipa::path(
    get,
    path = "/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "One page of the user's own summaries"),
        (status = 303, description = "Not logged in, redirect to the login page")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Response> {
    let page = query.page();
    let summaries = state
        .db
        .list_summaries_for_user(user.user_id, page, state.config.history_page_size)
        .await?;

    let layout = Layout::new(Some(user), &headers);
    render(&HistoryTemplate::new(layout, &summaries))
}

/// GET /edit_summary/{id} - Render the edit form for an owned summary
pub async fn edit_summary_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(summary_id): Path<String>,
) -> Result<Response> {
    let summary = match load_owned(&state, &user, &summary_id).await? {
        Ok(summary) => summary,
        Err(redirect) => return Ok(redirect),
    };

    render(&EditSummaryTemplate {
        layout: Layout::new(Some(user), &headers),
        id: summary.id,
        original_text: summary.original_text,
        summary_text: summary.summary_text,
    })
}

/// POST /edit_summary/{id} - Save an edited summary
#[utoipa::path(
    post,
    path = "/edit_summary/{id}",
    params(("id" = Uuid, Path, description = "The summary to edit.")),
    request_body(content = EditSummaryForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 303, description = "Redirect to the history page with the outcome"))
)]
pub async fn edit_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Path(summary_id): Path<String>,
    Form(form): Form<EditSummaryForm>,
) -> Result<Response> {
    let summary = match load_owned(&state, &user, &summary_id).await? {
        Ok(summary) => summary,
        Err(redirect) => return Ok(redirect),
    };

    let summary_text = form.summary_text.trim();
    if summary_text.is_empty() {
        return render(&EditSummaryTemplate {
            layout: Layout::new(Some(user), &headers).with(Flash::error("Summary cannot be empty.")),
            id: summary.id,
            original_text: summary.original_text,
            summary_text: String::new(),
        });
    }

    state.db.update_summary_text(summary.id, summary_text).await?;
    info!(summary_id = %summary.id, user_id = %user.user_id, "Summary edited");
    Ok(flash::redirect_with("/history", Flash::success("Summary updated.")))
}

/// POST /delete_summary/{id} - Delete an owned summary
#[utoipa::path(
    post,
    path = "/delete_summary/{id}",
    params(("id" = Uuid, Path, description = "The summary to delete.")),
    responses((status = 303, description = "Redirect to the history page with the outcome"))
)]
pub async fn delete_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(summary_id): Path<String>,
) -> Result<Response> {
    let summary = match load_owned(&state, &user, &summary_id).await? {
        Ok(summary) => summary,
        Err(redirect) => return Ok(redirect),
    };

    state.db.delete_summary(summary.id).await?;
    info!(summary_id = %summary.id, user_id = %user.user_id, "Summary deleted");
    Ok(flash::redirect_with("/history", Flash::success("Summary deleted.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(raw: Option<&str>) -> u32 {
        HistoryQuery {
            page: raw.map(str::to_string),
        }
        .page()
    }

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(page_of(None), 1);
        assert_eq!(page_of(Some("3")), 3);
        assert_eq!(page_of(Some("0")), 1);
        assert_eq!(page_of(Some("-7")), 1);
        assert_eq!(page_of(Some("abc")), 1);
        assert_eq!(page_of(Some("")), 1);
        assert_eq!(page_of(Some("99999999999")), u32::MAX);
    }
}
