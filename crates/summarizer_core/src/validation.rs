//! crates/summarizer_core/src/validation.rs
//!
//! Input checks applied before any text reaches a summarization model.

/// Inputs longer than this many whitespace-delimited words are rejected.
pub const MAX_INPUT_WORDS: usize = 1000;

/// Rejections of submitted text. The `Display` output is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Input text cannot be empty.")]
    Empty,
    #[error("Input text is too long. Please limit to {limit} words.")]
    TooLong { words: usize, limit: usize },
}

/// Returns the trimmed text when it is non-empty and within the word limit.
pub fn validate_input(text: &str) -> Result<&str, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let words = trimmed.split_whitespace().count();
    if words > MAX_INPUT_WORDS {
        return Err(InputError::TooLong {
            words,
            limit: MAX_INPUT_WORDS,
        });
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert_eq!(validate_input(""), Err(InputError::Empty));
        assert_eq!(validate_input("  \n\t "), Err(InputError::Empty));
        assert_eq!(
            InputError::Empty.to_string(),
            "Input text cannot be empty."
        );
    }

    #[test]
    fn test_word_limit_boundary() {
        let at_limit = "word ".repeat(MAX_INPUT_WORDS);
        assert!(validate_input(&at_limit).is_ok());

        let over = "word ".repeat(MAX_INPUT_WORDS + 1);
        let err = validate_input(&over).unwrap_err();
        assert_eq!(
            err,
            InputError::TooLong {
                words: 1001,
                limit: 1000
            }
        );
        assert!(err.to_string().starts_with("Input text is too long"));
    }

    #[test]
    fn test_returns_trimmed_text() {
        assert_eq!(
            validate_input("  Artificial Intelligence.  ").unwrap(),
            "Artificial Intelligence."
        );
    }
}
