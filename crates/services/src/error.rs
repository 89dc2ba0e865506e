//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tutor_core::parser::BlockDiagnostic;

/// Errors emitted while asking the completion service for a quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("quiz generation is not configured (missing API key)")]
    Disabled,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("generation returned an empty response")]
    EmptyResponse,
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("uploaded document seems empty or unreadable")]
    EmptyDocument,
    #[error("quiz generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// Generation succeeded but no block parsed; the raw text is kept for diagnosis.
    #[error("failed to parse the generated quiz; the format might be unexpected")]
    NoQuestions {
        raw_output: String,
        diagnostics: Vec<BlockDiagnostic>,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
