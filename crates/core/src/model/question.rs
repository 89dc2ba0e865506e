use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::label::OptionLabel;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("expected exactly 4 options, found {found}")]
    OptionCount { found: usize },

    #[error("answer {0} is not one of the options")]
    AnswerNotAnOption(OptionLabel),

    #[error("explanation cannot be empty")]
    EmptyExplanation,
}

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

/// The four option texts of a question, one per label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOptions {
    texts: [String; 4],
}

impl QuestionOptions {
    #[must_use]
    pub fn new(
        a: impl Into<String>,
        b: impl Into<String>,
        c: impl Into<String>,
        d: impl Into<String>,
    ) -> Self {
        Self {
            texts: [a.into(), b.into(), c.into(), d.into()],
        }
    }

    /// Build options from a label map.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionCount` unless every label is present.
    pub fn from_map(mut map: BTreeMap<OptionLabel, String>) -> Result<Self, QuestionError> {
        let found = map.len();
        let mut take = |label: OptionLabel| {
            map.remove(&label)
                .ok_or(QuestionError::OptionCount { found })
        };
        let texts = [
            take(OptionLabel::A)?,
            take(OptionLabel::B)?,
            take(OptionLabel::C)?,
            take(OptionLabel::D)?,
        ];
        Ok(Self { texts })
    }

    #[must_use]
    pub fn get(&self, label: OptionLabel) -> &str {
        &self.texts[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        OptionLabel::ALL
            .into_iter()
            .map(|label| (label, self.texts[label.index()].as_str()))
    }
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// A validated single-answer multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    question: String,
    options: QuestionOptions,
    answer: OptionLabel,
    explanation: String,
}

impl QuestionRecord {
    /// Create a question record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question or explanation is blank.
    pub fn new(
        question: impl Into<String>,
        options: QuestionOptions,
        answer: OptionLabel,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }
        let explanation = explanation.into().trim().to_string();
        if explanation.is_empty() {
            return Err(QuestionError::EmptyExplanation);
        }
        Ok(Self {
            question,
            options,
            answer,
            explanation,
        })
    }

    /// Create a record from a label map, checking that the answer is among the options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any field is missing or malformed.
    pub fn from_parts(
        question: impl Into<String>,
        options: BTreeMap<OptionLabel, String>,
        answer: OptionLabel,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if options.len() != OptionLabel::ALL.len() {
            return Err(QuestionError::OptionCount {
                found: options.len(),
            });
        }
        if !options.contains_key(&answer) {
            return Err(QuestionError::AnswerNotAnOption(answer));
        }
        Self::new(question, QuestionOptions::from_map(options)?, answer, explanation)
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &QuestionOptions {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> OptionLabel {
        self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, label: OptionLabel) -> bool {
        self.answer == label
    }
}
