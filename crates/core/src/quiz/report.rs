use std::fmt;

use crate::model::{OptionLabel, QuestionRecord};
use crate::quiz::session::{QuizSession, RecordedAnswer};

/// Correct answers out of total questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        let pct = self.percentage();
        if self.total > 0 && self.correct == self.total {
            ScoreBand::Perfect
        } else if pct >= 80.0 {
            ScoreBand::Great
        } else if pct >= 60.0 {
            ScoreBand::Good
        } else {
            ScoreBand::KeepStudying
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} out of {} ({:.1}%)",
            self.correct,
            self.total,
            self.percentage()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Perfect,
    Great,
    Good,
    KeepStudying,
}

impl ScoreBand {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect score! Outstanding work!",
            Self::Great => "Great job! You've shown excellent understanding!",
            Self::Good => "Good effort! Keep practicing to improve further.",
            Self::KeepStudying => {
                "Keep studying! Review the explanations to better understand the topics."
            }
        }
    }
}

/// How an option is highlighted in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    /// Correct option the user picked.
    ChosenCorrect,
    Correct,
    /// Wrong option the user picked.
    ChosenWrong,
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportItem {
    /// 1-based question number.
    pub number: usize,
    pub question: QuestionRecord,
    /// `None` when no answer was recorded.
    pub answer: Option<RecordedAnswer>,
}

impl ReportItem {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.answer.is_some_and(|a| a.correct)
    }

    #[must_use]
    pub fn mark(&self, label: OptionLabel) -> OptionMark {
        let is_answer = self.question.answer() == label;
        let is_selected = self.answer.is_some_and(|a| a.selected == label);
        match (is_answer, is_selected) {
            (true, true) => OptionMark::ChosenCorrect,
            (true, false) => OptionMark::Correct,
            (false, true) => OptionMark::ChosenWrong,
            (false, false) => OptionMark::Plain,
        }
    }
}

/// End-of-quiz report: every question with its recorded answer, plus the score.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    pub items: Vec<ReportItem>,
    pub score: Score,
}

impl QuizReport {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        let items = session
            .questions()
            .iter()
            .enumerate()
            .map(|(idx, question)| ReportItem {
                number: idx + 1,
                question: question.clone(),
                answer: session.answer_for(idx),
            })
            .collect();
        Self {
            items,
            score: session.score(),
        }
    }
}
