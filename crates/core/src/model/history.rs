use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Topic};

/// A completed quiz as stored in the history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizHistoryEntry {
    /// ISO-8601 timestamp; legacy values are kept verbatim.
    pub timestamp: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    /// Raw generated quiz text.
    pub quiz: String,
}

impl QuizHistoryEntry {
    #[must_use]
    pub fn new(
        completed_at: DateTime<Utc>,
        topic: Topic,
        difficulty: Difficulty,
        quiz: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: completed_at.to_rfc3339(),
            topic,
            difficulty,
            quiz: quiz.into(),
        }
    }

    /// One-line "question / answer" digest used as prompt context.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let first_line = self.quiz.lines().next().unwrap_or_default();
        let answer_tail = self
            .quiz
            .rsplit("Answer:")
            .next()
            .unwrap_or_default()
            .trim();
        format!("Q: {first_line} A: {answer_tail}")
    }
}

/// The persisted history document: `{ "history": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizHistory {
    #[serde(default)]
    pub history: Vec<QuizHistoryEntry>,
}

impl QuizHistory {
    #[must_use]
    pub fn new(history: Vec<QuizHistoryEntry>) -> Self {
        Self { history }
    }

    pub fn push(&mut self, entry: QuizHistoryEntry) {
        self.history.push(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &QuizHistoryEntry> {
        self.history.iter()
    }

    /// The last `limit` entries for `topic`, oldest first.
    #[must_use]
    pub fn relevant_to(&self, topic: &Topic, limit: usize) -> Vec<&QuizHistoryEntry> {
        let matching: Vec<&QuizHistoryEntry> =
            self.history.iter().filter(|e| &e.topic == topic).collect();
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).collect()
    }
}
