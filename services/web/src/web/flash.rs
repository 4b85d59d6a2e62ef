//! services/web/src/web/flash.rs
//!
//! One-shot user messages carried across a redirect in a `flash` cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Level::Info),
            "success" => Some(Level::Success),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    /// The level name, used as a CSS class by the templates.
    pub fn category(&self) -> &'static str {
        self.level.as_str()
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}|{}", self.level.as_str(), self.message))
    }

    pub fn decode(value: &str) -> Option<Self> {
        let raw = URL_SAFE_NO_PAD.decode(value).ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (level, message) = raw.split_once('|')?;
        Some(Self {
            level: Level::parse(level)?,
            message: message.to_string(),
        })
    }
}

/// Reads a named cookie from the request headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

/// Pulls the pending flash message, if any, out of the request.
pub fn take(headers: &HeaderMap) -> Option<Flash> {
    cookie_value(headers, FLASH_COOKIE)
        .filter(|v| !v.is_empty())
        .and_then(Flash::decode)
}

pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Redirects (303) to `to` with `flash` stored for the next page.
pub fn redirect_with(to: &str, flash: Flash) -> Response {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age=60",
        FLASH_COOKIE,
        flash.encode()
    );
    let mut response = Redirect::to(to).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_survives_cookie_encoding() {
        let flash = Flash::error("You are not authorized | really; not=allowed");
        let decoded = Flash::decode(&flash.encode()).unwrap();
        assert_eq!(decoded, flash);
        assert_eq!(decoded.category(), "error");
    }

    #[test]
    fn test_cookie_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; flash=xyz"),
        );
        assert_eq!(cookie_value(&headers, "session"), Some("abc"));
        assert_eq!(cookie_value(&headers, "flash"), Some("xyz"));
        assert_eq!(cookie_value(&headers, "other"), None);
    }

    #[test]
    fn test_redirect_sets_cookie() {
        let response = redirect_with("/history", Flash::success("Summary deleted."));
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        let value = cookie
            .strip_prefix("flash=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert_eq!(Flash::decode(value).unwrap().message, "Summary deleted.");
    }

    #[test]
    fn test_garbage_flash_ignored() {
        assert!(Flash::decode("%%%").is_none());
        assert!(Flash::decode(&URL_SAFE_NO_PAD.encode("warning|hi")).is_none());
    }
}
