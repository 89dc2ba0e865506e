use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("unknown difficulty: {0} (expected Beginner, Intermediate or Advanced)")]
    Unknown(String),
}

/// Target level for a generated quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Short caption shown next to the level picker.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Beginner => "Basic concepts and definitions",
            Self::Intermediate => "Application and connections",
            Self::Advanced => "Deep analysis and synthesis",
        }
    }

    /// Authoring guidelines embedded in the generation prompt.
    #[must_use]
    pub fn guidelines(self) -> &'static str {
        match self {
            Self::Beginner => {
                "- Focus on basic concept recognition and definitions
- Questions should test understanding of fundamental terms and ideas
- Use straightforward language and avoid complex terminology
- Options should be clearly distinct from each other
- Explanations should be simple and educational"
            }
            Self::Intermediate => {
                "- Test application of concepts and relationships between ideas
- Include some technical terminology appropriate to the subject
- Questions may require connecting multiple concepts
- Options can be more nuanced but still distinct
- Explanations should provide deeper insight into the topic"
            }
            Self::Advanced => {
                "- Test deep understanding and analysis of complex concepts
- Include detailed technical terminology and advanced concepts
- Questions should require critical thinking and synthesis of information
- Options may include subtle differences that test thorough understanding
- Explanations should explore underlying principles and connections"
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DifficultyError::Unknown(trimmed.to_string()))
    }
}
