//! services/web/src/web/summarize.rs
//!
//! The summarization form and the endpoint that runs a submission through
//! extraction, validation, language dispatch, and the model.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Form,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use summarizer_core::{
    bounds_for, detect_language, parse_length, validate_input,
    domain::{LengthChoice, NewSummary},
    ports::PortError,
};
use tracing::{error, info, warn};

use crate::adapters::extract;
use crate::error::Result;
use crate::web::flash::Flash;
use crate::web::middleware::{CurrentUser, MaybeUser};
use crate::web::pages::{render, IndexTemplate, Layout, SummaryView};
use crate::web::state::AppState;

//=========================================================================================
// Form Input
//=========================================================================================

pub struct UploadedFile {
    pub name: String,
    pub data: Bytes,
}

/// A summarization request, accepted as multipart (with an optional file) or url-encoded.
#[derive(Default)]
pub struct SummarizeInput {
    pub content: String,
    pub file: Option<UploadedFile>,
    pub length: Option<String>,
}

#[derive(Deserialize)]
struct SummarizeFields {
    #[serde(default)]
    content: String,
    length: Option<String>,
}

impl FromRequest<Arc<AppState>> for SummarizeInput {
    type Rejection = Response;

    async fn from_request(req: Request, state: &Arc<AppState>) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<SummarizeFields>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self {
                content: fields.content,
                file: None,
                length: fields.length,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut input = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "content" => {
                    input.content = field.text().await.map_err(IntoResponse::into_response)?;
                }
                "length" => {
                    input.length = Some(field.text().await.map_err(IntoResponse::into_response)?);
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(IntoResponse::into_response)?;
                    // Browsers send an empty part when no file was chosen.
                    if !file_name.is_empty() && !data.is_empty() {
                        input.file = Some(UploadedFile {
                            name: file_name,
                            data,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(input)
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

fn form_page(layout: Layout, content: String, length: LengthChoice) -> IndexTemplate {
    IndexTemplate {
        layout,
        content,
        length: length.as_str(),
        result: None,
    }
}

/// GET / - Render the summarization form
pub async fn home_handler(MaybeUser(user): MaybeUser, headers: HeaderMap) -> Result<Response> {
    render(&form_page(
        Layout::new(user, &headers),
        String::new(),
        LengthChoice::default(),
    ))
}

/// POST /summarize - Summarize pasted text or an uploaded document
#[utoipa::path(
    post,
    path = "/summarize",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields: `content` (text), `file` (.pdf or .docx, optional), `length` (short | medium | long)."
    ),
    responses(
        (status = 200, description = "The form page, with either the summary or an error message")
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
    input: SummarizeInput,
) -> Result<Response> {
    let length = parse_length(input.length.as_deref());
    let layout = Layout::new(user.clone(), &headers);

    // 1. Obtain the text, from the upload when there is one
    let text = match input.file {
        Some(file) => match extract::extract_text(&file.name, file.data).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file_name = %file.name, "Upload rejected: {}", e);
                return render(&form_page(layout.with(Flash::error(e.to_string())), input.content, length));
            }
        },
        None => input.content.clone(),
    };

    // 2. Validate before anything reaches the model
    let text = match validate_input(&text) {
        Ok(text) => text,
        Err(e) => {
            warn!("Input rejected: {}", e);
            return render(&form_page(layout.with(Flash::error(e.to_string())), input.content, length));
        }
    };

    // 3. Dispatch on language and length
    let language = detect_language(text);
    let bounds = bounds_for(length);
    let model = state.models.for_language(language);

    // 4. Summarize
    let summary_text = match model.summarize(text, bounds).await {
        Ok(summary) => summary,
        Err(e) => {
            let cause = match e {
                PortError::Unexpected(msg) => msg,
                other => other.to_string(),
            };
            error!(%language, %length, "Summarization failed: {}", cause);
            let message = format!("Error during summarization: {}", cause);
            return render(&form_page(layout.with(Flash::error(message)), input.content, length));
        }
    };
    info!(%language, %length, words = text.split_whitespace().count(), "Summary generated");

    // 5. Persist for logged-in users
    let (layout, saved) = match user {
        Some(CurrentUser { user_id, .. }) => {
            let record = NewSummary {
                user_id,
                original_text: text.to_string(),
                summary_text: summary_text.clone(),
                language,
                length,
            };
            match state.db.save_summary(record).await {
                Ok(saved) => {
                    info!(summary_id = %saved.id, %user_id, "Summary saved");
                    (layout, true)
                }
                Err(e) => {
                    error!("Failed to save summary: {:?}", e);
                    let notice = Flash::error("The summary could not be saved to your history.");
                    (layout.with(notice), false)
                }
            }
        }
        None => (layout, false),
    };

    render(&IndexTemplate {
        layout,
        content: input.content,
        length: length.as_str(),
        result: Some(SummaryView {
            summary_text,
            original_text: text.to_string(),
            language: language.code(),
            length: length.as_str(),
            saved,
        }),
    })
}
