//! crates/summarizer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub hashed_password: String,
    pub confirmed: bool,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A saved summarization, owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Summary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_text: String,
    pub summary_text: String,
    pub language: Language,
    pub length: LengthChoice,
    pub created_at: DateTime<Utc>,
}

/// The fields needed to persist a new summary.
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub user_id: Uuid,
    pub original_text: String,
    pub summary_text: String,
    pub language: Language,
    pub length: LengthChoice,
}

/// One page of a user's saved summaries.
#[derive(Debug, Clone)]
pub struct SummaryPage {
    pub items: Vec<Summary>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Total number of summaries owned by the user, across all pages.
    pub total: u64,
}

impl SummaryPage {
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

//=========================================================================================
// Dispatch Keys
//=========================================================================================

/// The languages with a dedicated summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// The two-letter code stored alongside saved summaries.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "fr" => Ok(Language::French),
            other => Err(UnknownKey(other.to_string())),
        }
    }
}

/// The user's preferred summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthChoice {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            LengthChoice::Short => "short",
            LengthChoice::Medium => "medium",
            LengthChoice::Long => "long",
        }
    }
}

impl fmt::Display for LengthChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthChoice {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(LengthChoice::Short),
            "medium" => Ok(LengthChoice::Medium),
            "long" => Ok(LengthChoice::Long),
            other => Err(UnknownKey(other.to_string())),
        }
    }
}

/// Token bounds handed to the summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationBounds {
    pub max_tokens: u32,
    pub min_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: {0}")]
pub struct UnknownKey(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, per_page: u32, total: u64) -> SummaryPage {
        SummaryPage {
            items: Vec::new(),
            page,
            per_page,
            total,
        }
    }

    #[test]
    fn test_page_navigation() {
        let first = page(1, 5, 12);
        assert_eq!(first.total_pages(), 3);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = page(3, 5, 12);
        assert!(last.has_prev());
        assert!(!last.has_next());

        let empty = page(1, 5, 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_stored_codes_parse_back() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::French);
        assert_eq!("long".parse::<LengthChoice>().unwrap(), LengthChoice::Long);
        assert!("de".parse::<Language>().is_err());
    }
}
