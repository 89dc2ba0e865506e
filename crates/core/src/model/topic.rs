use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept from the source's first line.
pub const TOPIC_MAX_CHARS: usize = 50;

/// Short label used to scope quiz history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub const GENERAL: &'static str = "General";

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derive a topic from the first line of the source text.
    #[must_use]
    pub fn from_source_text(text: &str) -> Self {
        let first_line = text.split('\n').next().unwrap_or_default();
        let head: String = first_line.chars().take(TOPIC_MAX_CHARS).collect();
        let head = head.trim();
        if head.is_empty() {
            Self::general()
        } else {
            Self(head.to_string())
        }
    }

    #[must_use]
    pub fn general() -> Self {
        Self(Self::GENERAL.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::general()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
