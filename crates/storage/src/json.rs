use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tutor_core::model::{QuizHistory, QuizHistoryEntry};

use crate::repository::{HistoryRepository, StorageError};

/// History kept as a single pretty-printed JSON document.
///
/// A missing or unreadable document reads as empty history; every append
/// rewrites the whole file.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub const DEFAULT_PATH: &'static str = "quiz_history.json";

    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> QuizHistory {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return QuizHistory::default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "history unreadable, starting empty");
                return QuizHistory::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "history corrupt, starting empty");
            QuizHistory::default()
        })
    }

    async fn write(&self, history: &QuizHistory) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, encode_pretty(history)?).await?;
        Ok(())
    }
}

impl Default for JsonHistoryStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

fn encode_pretty(history: &QuizHistory) -> Result<Vec<u8>, StorageError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    history
        .serialize(&mut ser)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(out)
}

#[async_trait]
impl HistoryRepository for JsonHistoryStore {
    async fn load_history(&self) -> Result<QuizHistory, StorageError> {
        Ok(self.read().await)
    }

    async fn append_entry(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError> {
        let mut history = self.read().await;
        history.push(entry.clone());
        self.write(&history).await?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{Difficulty, Topic};
    use tutor_core::time::fixed_now;

    #[test]
    fn encodes_with_four_space_indent() {
        let history = QuizHistory::new(vec![QuizHistoryEntry::new(
            fixed_now(),
            Topic::new("Bio"),
            Difficulty::Beginner,
            "quiz",
        )]);
        let text = String::from_utf8(encode_pretty(&history).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"history\": [\n        {"));
    }
}
