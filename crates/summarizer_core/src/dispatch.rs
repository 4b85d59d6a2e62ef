//! crates/summarizer_core/src/dispatch.rs
//!
//! Static lookup tables that route a request to a model and pick its generation bounds.

use crate::domain::{GenerationBounds, Language, LengthChoice};
use crate::ports::SummarizationService;
use std::sync::Arc;
use whatlang::Lang;

/// Classifies `text`. Anything that is not confidently French falls back to English.
pub fn detect_language(text: &str) -> Language {
    match whatlang::detect_lang(text) {
        Some(Lang::Fra) => Language::French,
        _ => Language::English,
    }
}

/// Maps a length choice to the `(max, min)` token bounds passed to the model.
pub fn bounds_for(length: LengthChoice) -> GenerationBounds {
    let (max_tokens, min_tokens) = match length {
        LengthChoice::Short => (60, 15),
        LengthChoice::Medium => (130, 30),
        LengthChoice::Long => (250, 80),
    };
    GenerationBounds {
        max_tokens,
        min_tokens,
    }
}

/// Parses the form's length keyword. Missing or unknown keywords mean medium.
pub fn parse_length(keyword: Option<&str>) -> LengthChoice {
    keyword
        .map(|k| k.trim().to_lowercase())
        .and_then(|k| k.parse().ok())
        .unwrap_or_default()
}

/// The two summarization models, one per supported language.
#[derive(Clone)]
pub struct ModelRegistry {
    english: Arc<dyn SummarizationService>,
    french: Arc<dyn SummarizationService>,
}

impl ModelRegistry {
    pub fn new(
        english: Arc<dyn SummarizationService>,
        french: Arc<dyn SummarizationService>,
    ) -> Self {
        Self { english, french }
    }

    pub fn for_language(&self, language: Language) -> Arc<dyn SummarizationService> {
        match language {
            Language::French => self.french.clone(),
            Language::English => self.english.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl SummarizationService for Named {
        async fn summarize(&self, _text: &str, _bounds: GenerationBounds) -> PortResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_detects_french() {
        let text = "Le gouvernement a annoncé hier une nouvelle série de mesures pour soutenir \
                    les petites entreprises touchées par la crise économique dans toute la France.";
        assert_eq!(detect_language(text), Language::French);
    }

    #[test]
    fn test_english_is_default() {
        let text = "Artificial Intelligence is a branch of computer science that studies \
                    how machines can learn from data and make decisions.";
        assert_eq!(detect_language(text), Language::English);
        assert_eq!(detect_language("12345 !!!"), Language::English);
        assert_eq!(detect_language(""), Language::English);
    }

    #[test]
    fn test_length_table() {
        assert_eq!(
            bounds_for(LengthChoice::Short),
            GenerationBounds {
                max_tokens: 60,
                min_tokens: 15
            }
        );
        assert_eq!(bounds_for(LengthChoice::Medium).max_tokens, 130);
        assert_eq!(bounds_for(LengthChoice::Long).min_tokens, 80);
    }

    #[test]
    fn test_unknown_length_is_medium() {
        assert_eq!(parse_length(None), LengthChoice::Medium);
        assert_eq!(parse_length(Some("gigantic")), LengthChoice::Medium);
        assert_eq!(parse_length(Some(" SHORT ")), LengthChoice::Short);
        assert_eq!(parse_length(Some("long")), LengthChoice::Long);
    }

    #[tokio::test]
    async fn test_registry_routes_by_language() {
        let registry = ModelRegistry::new(Arc::new(Named("english")), Arc::new(Named("french")));
        let bounds = bounds_for(LengthChoice::Medium);

        let fr = registry.for_language(Language::French);
        assert_eq!(fr.summarize("x", bounds).await.unwrap(), "french");

        let en = registry.for_language(Language::English);
        assert_eq!(en.summarize("x", bounds).await.unwrap(), "english");
    }
}
