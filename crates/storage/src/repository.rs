use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{QuizHistory, QuizHistoryEntry};

use crate::json::JsonHistoryStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Append-only store of completed quizzes.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Load the whole history document.
    ///
    /// Adapters return an empty history when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend is unreachable.
    async fn load_history(&self) -> Result<QuizHistory, StorageError>;

    /// Append one entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_entry(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryHistoryRepository {
    history: Arc<Mutex<QuizHistory>>,
}

impl InMemoryHistoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_history(history: QuizHistory) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
        }
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn load_history(&self) -> Result<QuizHistory, StorageError> {
        let guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn append_entry(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(entry.clone());
        Ok(())
    }
}

/// History backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            history: Arc::new(InMemoryHistoryRepository::new()),
        }
    }

    #[must_use]
    pub fn json(path: impl AsRef<Path>) -> Self {
        Self {
            history: Arc::new(JsonHistoryStore::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{Difficulty, Topic};
    use tutor_core::time::fixed_now;

    #[tokio::test]
    async fn in_memory_appends_in_order() {
        let storage = Storage::in_memory();
        for topic in ["one", "two"] {
            let entry =
                QuizHistoryEntry::new(fixed_now(), Topic::new(topic), Difficulty::Beginner, "q");
            storage.history.append_entry(&entry).await.unwrap();
        }
        let history = storage.history.load_history().await.unwrap();
        let topics: Vec<&str> = history.entries().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec!["one", "two"]);
    }
}
