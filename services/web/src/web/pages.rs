//! services/web/src/web/pages.rs
//!
//! Askama page templates and the helper that turns them into responses.

use askama::Template;
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Response};
use summarizer_core::domain::{Summary, SummaryPage};
use uuid::Uuid;

use crate::error::Result;
use crate::web::flash::{self, Flash};
use crate::web::middleware::CurrentUser;

/// The parts of every page that come from the base layout.
pub struct Layout {
    pub current_user: Option<CurrentUser>,
    pub messages: Vec<Flash>,
    flash_consumed: bool,
}

impl Layout {
    /// Starts a layout, consuming any flash message left by a redirect.
    pub fn new(current_user: Option<CurrentUser>, headers: &HeaderMap) -> Self {
        let pending = flash::take(headers);
        Self {
            current_user,
            flash_consumed: pending.is_some(),
            messages: pending.into_iter().collect(),
        }
    }

    pub fn with(mut self, message: Flash) -> Self {
        self.messages.push(message);
        self
    }
}

pub trait Page: Template {
    fn layout(&self) -> &Layout;
}

/// Renders a page, clearing the flash cookie if the page displayed it.
pub fn render<P: Page>(page: &P) -> Result<Response> {
    let body = Html(page.render()?);
    if page.layout().flash_consumed {
        Ok(([(header::SET_COOKIE, flash::clear_cookie())], body).into_response())
    } else {
        Ok(body.into_response())
    }
}

macro_rules! impl_page {
    ($($ty:ty),* $(,)?) => {
        $(impl Page for $ty {
            fn layout(&self) -> &Layout {
                &self.layout
            }
        })*
    };
}

impl_page!(
    IndexTemplate,
    RegisterTemplate,
    LoginTemplate,
    HistoryTemplate,
    EditSummaryTemplate,
);

//=========================================================================================
// Templates
//=========================================================================================

/// The result block shown under the form after a successful summarization.
pub struct SummaryView {
    pub summary_text: String,
    pub original_text: String,
    pub language: &'static str,
    pub length: &'static str,
    pub saved: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub content: String,
    pub length: &'static str,
    pub result: Option<SummaryView>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
}

pub struct HistoryRow {
    pub id: Uuid,
    pub summary_text: String,
    pub original_preview: String,
    pub language: &'static str,
    pub length: &'static str,
    pub created_at: String,
}

impl HistoryRow {
    const PREVIEW_CHARS: usize = 200;

    pub fn from_summary(summary: &Summary) -> Self {
        let mut original_preview: String = summary
            .original_text
            .chars()
            .take(Self::PREVIEW_CHARS)
            .collect();
        if summary.original_text.chars().count() > Self::PREVIEW_CHARS {
            original_preview.push('…');
        }
        Self {
            id: summary.id,
            summary_text: summary.summary_text.clone(),
            original_preview,
            language: summary.language.code(),
            length: summary.length.as_str(),
            created_at: summary.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub layout: Layout,
    pub rows: Vec<HistoryRow>,
    pub page: u32,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl HistoryTemplate {
    pub fn new(layout: Layout, page: &SummaryPage) -> Self {
        Self {
            layout,
            rows: page.items.iter().map(HistoryRow::from_summary).collect(),
            page: page.page,
            total_pages: page.total_pages(),
            prev_page: page.has_prev().then(|| page.page - 1),
            next_page: page.has_next().then(|| page.page + 1),
        }
    }
}

#[derive(Template)]
#[template(path = "edit_summary.html")]
pub struct EditSummaryTemplate {
    pub layout: Layout,
    pub id: Uuid,
    pub original_text: String,
    pub summary_text: String,
}
