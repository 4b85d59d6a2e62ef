//! services/web/src/adapters/summarizer_llm.rs
//!
//! This module contains the adapter for the summarization model.
//! It implements the `SummarizationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use summarizer_core::{
    domain::{GenerationBounds, Language},
    ports::{PortError, PortResult, SummarizationService},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` using an OpenAI-compatible model.
///
/// One instance is created per supported language, each pinned to its own model.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    language: Language,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, language: Language) -> Self {
        Self {
            client,
            model,
            language,
        }
    }
}

fn instruction(language: Language, bounds: GenerationBounds) -> String {
    let reply_in = match language {
        Language::English => "English",
        Language::French => "French",
    };
    format!(
        "You are a summarization model. Summarize the user's text in {}. \
         The summary must be at least {} tokens and at most {} tokens long. \
         Respond with the summary only.",
        reply_in, bounds.min_tokens, bounds.max_tokens
    )
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    async fn summarize(&self, text: &str, bounds: GenerationBounds) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instruction(self.language, bounds))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        // Sampling is off: the same input always yields the same summary.
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(bounds.max_tokens)
            .temperature(0.0)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let summary = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Summarization model returned no text content.".to_string())
            })?;

        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_carries_bounds_and_language() {
        let bounds = GenerationBounds {
            max_tokens: 60,
            min_tokens: 15,
        };
        let text = instruction(Language::French, bounds);
        assert!(text.contains("in French"));
        assert!(text.contains("at least 15 tokens"));
        assert!(text.contains("at most 60 tokens"));
    }
}
