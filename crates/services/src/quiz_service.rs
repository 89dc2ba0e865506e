use std::sync::Arc;

use storage::HistoryRepository;
use tutor_core::Clock;
use tutor_core::model::{Difficulty, OptionLabel, QuizHistory, Topic};
use tutor_core::parser::{BlockDiagnostic, ParseReport, parse_quiz_with_report};
use tutor_core::quiz::{AdvanceOutcome, QuizState, SubmitOutcome};

use crate::error::QuizServiceError;
use crate::extraction::{DocumentExtractor, TextExtractor};
use crate::generator::QuizGenerator;

/// What a successful `generate_quiz` call started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub topic: Topic,
    pub difficulty: Difficulty,
    pub question_count: usize,
    /// Per-block parse results, including rejected blocks.
    pub diagnostics: Vec<BlockDiagnostic>,
}

/// Orchestrates extract → generate → parse → start, and history on completion.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    generator: QuizGenerator,
    history: Arc<dyn HistoryRepository>,
    extractor: Arc<dyn TextExtractor>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, generator: QuizGenerator, history: Arc<dyn HistoryRepository>) -> Self {
        Self {
            clock,
            generator,
            history,
            extractor: Arc::new(DocumentExtractor),
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extract text from `document` and start a new quiz on it.
    ///
    /// # Errors
    ///
    /// See [`QuizService::generate_from_text`].
    pub async fn generate_quiz(
        &self,
        state: &mut QuizState,
        document: &[u8],
        difficulty: Difficulty,
    ) -> Result<GeneratedQuiz, QuizServiceError> {
        let text = self.extractor.extract(document);
        self.generate_from_text(state, &text, difficulty).await
    }

    /// Generate and parse a quiz for `source`, replacing `state` on success.
    ///
    /// On any error `state` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::EmptyDocument` for blank text,
    /// `QuizServiceError::Generation` if the completion request fails, and
    /// `QuizServiceError::NoQuestions` (carrying the raw output) if nothing parsed.
    pub async fn generate_from_text(
        &self,
        state: &mut QuizState,
        source: &str,
        difficulty: Difficulty,
    ) -> Result<GeneratedQuiz, QuizServiceError> {
        if source.trim().is_empty() {
            return Err(QuizServiceError::EmptyDocument);
        }
        let topic = Topic::from_source_text(source);
        let history = self.load_history_or_empty().await;

        let raw_output = self
            .generator
            .generate(source, &history, difficulty, &topic)
            .await?;

        let ParseReport {
            questions,
            diagnostics,
        } = parse_quiz_with_report(&raw_output);
        let question_count = questions.len();

        if let Err(err) = state.start(questions, raw_output.clone(), topic.clone(), difficulty) {
            tracing::warn!(error = %err, blocks = diagnostics.len(), "generated quiz had no valid questions");
            return Err(QuizServiceError::NoQuestions {
                raw_output,
                diagnostics,
            });
        }
        tracing::info!(%topic, %difficulty, questions = question_count, "quiz started");

        Ok(GeneratedQuiz {
            topic,
            difficulty,
            question_count,
            diagnostics,
        })
    }

    pub fn submit(&self, state: &mut QuizState, label: OptionLabel) -> SubmitOutcome {
        let outcome = state.submit(label);
        tracing::debug!(%label, ?outcome, "answer submitted");
        outcome
    }

    /// Advance past the current question and persist history once the quiz completes.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the history entry cannot be written;
    /// the quiz is still completed and [`QuizService::finalize_history`] can retry.
    pub async fn advance(&self, state: &mut QuizState) -> Result<AdvanceOutcome, QuizServiceError> {
        let outcome = state.advance();
        if outcome == AdvanceOutcome::Completed {
            self.finalize_history(state).await?;
        }
        Ok(outcome)
    }

    /// Write the completed quiz to history if it has not been written yet.
    ///
    /// Returns `true` when an entry was appended.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if persistence fails.
    pub async fn finalize_history(&self, state: &mut QuizState) -> Result<bool, QuizServiceError> {
        let Some(entry) = state.pending_history(self.clock.now()) else {
            return Ok(false);
        };
        self.history.append_entry(&entry).await?;
        state.mark_persisted();
        tracing::info!(topic = %entry.topic, "quiz saved to history");
        Ok(true)
    }

    /// Stored history.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the repository fails.
    pub async fn history(&self) -> Result<QuizHistory, QuizServiceError> {
        Ok(self.history.load_history().await?)
    }

    async fn load_history_or_empty(&self) -> QuizHistory {
        self.history.load_history().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "history unavailable, generating without it");
            QuizHistory::default()
        })
    }
}
