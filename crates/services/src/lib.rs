#![forbid(unsafe_code)]

pub mod error;
pub mod extraction;
pub mod generator;
pub mod quiz_service;

pub use tutor_core::Clock;

pub use error::{GenerationError, QuizServiceError};
pub use extraction::{DocumentExtractor, PdfTextExtractor, PlainTextExtractor, TextExtractor};
pub use generator::{
    ChatMessage, CompletionBackend, GeneratorConfig, OpenAiCompletionClient, QuizGenerator,
};
pub use quiz_service::{GeneratedQuiz, QuizService};
