mod client;
mod config;
mod prompt;

use std::sync::Arc;

use tutor_core::model::{Difficulty, QuizHistory, Topic};

use crate::error::GenerationError;

pub use client::{
    ChatMessage, CompletionBackend, OpenAiCompletionClient, Role, api_error_message,
    completion_text,
};
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeneratorConfig, REQUEST_TIMEOUT, TEMPERATURE};
pub use prompt::{
    FORMAT_TEMPLATE, HISTORY_LIMIT, MAX_SOURCE_CHARS, QUESTION_COUNT, QuizPrompt, SYSTEM_PROMPT,
    TRUNCATION_MARKER, truncate_source,
};

/// Builds quiz prompts and sends them to a completion backend.
#[derive(Clone)]
pub struct QuizGenerator {
    backend: Arc<dyn CompletionBackend>,
}

impl QuizGenerator {
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Generate raw quiz text for `source`.
    ///
    /// Makes exactly one request; failures are returned, never retried.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the backend fails or returns blank text.
    pub async fn generate(
        &self,
        source: &str,
        history: &QuizHistory,
        difficulty: Difficulty,
        topic: &Topic,
    ) -> Result<String, GenerationError> {
        let prompt = QuizPrompt::build(source, history, difficulty, topic);
        tracing::info!(
            %difficulty,
            %topic,
            truncated = prompt.truncated,
            history_items = prompt.history_items,
            "generating quiz"
        );

        let text = self
            .backend
            .complete(&prompt.messages(), TEMPERATURE)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "quiz generation failed"))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}
