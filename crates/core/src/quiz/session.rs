use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Difficulty, OptionLabel, QuestionRecord, QuizHistoryEntry, Topic};
use crate::quiz::report::{QuizReport, Score};

/// Incorrect submissions allowed per question before it is closed.
pub const ATTEMPT_BUDGET: u8 = 3;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for quiz")]
    NoQuestions,
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Outcome of the latest submission for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub selected: OptionLabel,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Unanswered,
    AnsweredCorrect,
    AnsweredIncorrectExhausted,
}

/// Result of `QuizState::submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct { answer: OptionLabel },
    Incorrect { attempts_remaining: u8 },
    Exhausted { correct: OptionLabel },
    /// Nothing is awaiting an answer; state unchanged.
    Ignored,
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct { answer } => write!(f, "Correct! The answer is {answer}."),
            Self::Incorrect { attempts_remaining } => {
                let plural = if *attempts_remaining > 1 { "s" } else { "" };
                write!(
                    f,
                    "Incorrect. You have {attempts_remaining} attempt{plural} remaining. Try again!"
                )
            }
            Self::Exhausted { correct } => write!(
                f,
                "Incorrect. No attempts left. The correct answer was {correct}."
            ),
            Self::Ignored => f.write_str("No question is waiting for an answer."),
        }
    }
}

/// Result of `QuizState::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next { index: usize },
    Completed,
    /// Current question still open, or no quiz in progress.
    Ignored,
}

/// Position within the quiz, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: usize,
    pub total: usize,
}

impl QuizProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.position as f64 / self.total as f64
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt: fixed question list, pointer, attempts and answers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    current: usize,
    answers: BTreeMap<usize, RecordedAnswer>,
    attempts_remaining: u8,
    answered: bool,
    topic: Topic,
    difficulty: Difficulty,
    raw_output: Option<String>,
}

impl QuizSession {
    fn new(
        questions: Vec<QuestionRecord>,
        raw_output: String,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self {
            questions,
            current: 0,
            answers: BTreeMap::new(),
            attempts_remaining: ATTEMPT_BUDGET,
            answered: false,
            topic,
            difficulty,
            raw_output: Some(raw_output),
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &QuestionRecord {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn attempts_remaining(&self) -> u8 {
        self.attempts_remaining
    }

    /// True once the current question no longer accepts submissions.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn answer_for(&self, index: usize) -> Option<RecordedAnswer> {
        self.answers.get(&index).copied()
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, RecordedAnswer> {
        &self.answers
    }

    #[must_use]
    pub fn status(&self) -> QuestionStatus {
        match (self.answered, self.answer_for(self.current)) {
            (true, Some(RecordedAnswer { correct: true, .. })) => QuestionStatus::AnsweredCorrect,
            (true, _) => QuestionStatus::AnsweredIncorrectExhausted,
            (false, _) => QuestionStatus::Unanswered,
        }
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: self.current + 1,
            total: self.questions.len(),
        }
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Generator text not yet written to history.
    #[must_use]
    pub fn raw_output(&self) -> Option<&str> {
        self.raw_output.as_deref()
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score {
            correct: self.answers.values().filter(|a| a.correct).count(),
            total: self.questions.len(),
        }
    }

    fn submit(&mut self, label: OptionLabel) -> SubmitOutcome {
        if self.answered {
            return SubmitOutcome::Ignored;
        }
        let answer = self.current_question().answer();
        let correct = label == answer;
        self.answers.insert(
            self.current,
            RecordedAnswer {
                selected: label,
                correct,
            },
        );

        if correct {
            self.answered = true;
            return SubmitOutcome::Correct { answer };
        }

        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        if self.attempts_remaining > 0 {
            SubmitOutcome::Incorrect {
                attempts_remaining: self.attempts_remaining,
            }
        } else {
            self.answered = true;
            SubmitOutcome::Exhausted { correct: answer }
        }
    }

    fn step(&mut self) {
        self.current += 1;
        self.attempts_remaining = ATTEMPT_BUDGET;
        self.answered = false;
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// Lifecycle of the single active quiz.
///
/// Invalid transitions are no-ops reported through the outcome types.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuizState {
    #[default]
    NotStarted,
    InProgress(QuizSession),
    Completed(QuizSession),
}

impl QuizState {
    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match self {
            Self::NotStarted => QuizPhase::NotStarted,
            Self::InProgress(_) => QuizPhase::InProgress,
            Self::Completed(_) => QuizPhase::Completed,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match self {
            Self::NotStarted => None,
            Self::InProgress(session) | Self::Completed(session) => Some(session),
        }
    }

    /// Replace the state with a fresh quiz over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty; the state is left as is.
    pub fn start(
        &mut self,
        questions: Vec<QuestionRecord>,
        raw_output: impl Into<String>,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<(), QuizError> {
        let session = QuizSession::new(questions, raw_output.into(), topic, difficulty)?;
        *self = Self::InProgress(session);
        Ok(())
    }

    /// Submit an answer for the current question.
    pub fn submit(&mut self, label: OptionLabel) -> SubmitOutcome {
        match self {
            Self::InProgress(session) => session.submit(label),
            _ => SubmitOutcome::Ignored,
        }
    }

    /// Move past an answered question, completing the quiz after the last one.
    pub fn advance(&mut self) -> AdvanceOutcome {
        let Self::InProgress(session) = self else {
            return AdvanceOutcome::Ignored;
        };
        if !session.answered {
            return AdvanceOutcome::Ignored;
        }
        if !session.is_last() {
            session.step();
            return AdvanceOutcome::Next {
                index: session.current,
            };
        }

        if let Self::InProgress(session) = std::mem::take(self) {
            *self = Self::Completed(session);
        }
        AdvanceOutcome::Completed
    }

    /// History entry for a completed quiz whose output has not been persisted yet.
    #[must_use]
    pub fn pending_history(&self, completed_at: DateTime<Utc>) -> Option<QuizHistoryEntry> {
        let Self::Completed(session) = self else {
            return None;
        };
        let raw = session.raw_output.as_deref().filter(|raw| !raw.is_empty())?;
        Some(QuizHistoryEntry::new(
            completed_at,
            session.topic.clone(),
            session.difficulty,
            raw,
        ))
    }

    /// Consume the raw output once it has been written to history.
    pub fn mark_persisted(&mut self) {
        if let Self::Completed(session) = self {
            session.raw_output = None;
        }
    }

    /// Discard the quiz and return to `NotStarted`.
    pub fn restart(&mut self) {
        *self = Self::NotStarted;
    }

    /// Final score, once completed.
    #[must_use]
    pub fn score(&self) -> Option<Score> {
        match self {
            Self::Completed(session) => Some(session.score()),
            _ => None,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<QuizReport> {
        match self {
            Self::Completed(session) => Some(QuizReport::from_session(session)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionOptions;
    use crate::time::fixed_now;

    fn question(n: usize, answer: OptionLabel) -> QuestionRecord {
        QuestionRecord::new(
            format!("Question {n}?"),
            QuestionOptions::new("a", "b", "c", "d"),
            answer,
            format!("Explanation {n}."),
        )
        .unwrap()
    }

    fn started(answers: &[OptionLabel]) -> QuizState {
        let questions = answers
            .iter()
            .enumerate()
            .map(|(i, a)| question(i + 1, *a))
            .collect();
        let mut state = QuizState::default();
        state
            .start(questions, "raw quiz", Topic::new("Math"), Difficulty::Beginner)
            .unwrap();
        state
    }

    fn session(state: &QuizState) -> &QuizSession {
        state.session().unwrap()
    }

    #[test]
    fn start_with_no_questions_keeps_state() {
        let mut state = QuizState::default();
        let err = state
            .start(Vec::new(), "raw", Topic::general(), Difficulty::Beginner)
            .unwrap_err();
        assert_eq!(err, QuizError::NoQuestions);
        assert_eq!(state.phase(), QuizPhase::NotStarted);

        let mut running = started(&[OptionLabel::A]);
        let before = running.clone();
        assert!(running.start(Vec::new(), "raw", Topic::general(), Difficulty::Advanced).is_err());
        assert_eq!(running, before);
    }

    #[test]
    fn start_initialises_session() {
        let state = started(&[OptionLabel::A, OptionLabel::B]);
        let s = session(&state);
        assert_eq!(state.phase(), QuizPhase::InProgress);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.attempts_remaining(), ATTEMPT_BUDGET);
        assert!(!s.is_answered());
        assert!(s.answers().is_empty());
        assert_eq!(s.raw_output(), Some("raw quiz"));
    }

    #[test]
    fn correct_answer_closes_question_regardless_of_attempts() {
        let mut state = started(&[OptionLabel::C]);
        assert_eq!(
            state.submit(OptionLabel::A),
            SubmitOutcome::Incorrect {
                attempts_remaining: 2
            }
        );
        assert_eq!(
            state.submit(OptionLabel::C),
            SubmitOutcome::Correct {
                answer: OptionLabel::C
            }
        );
        let s = session(&state);
        assert!(s.is_answered());
        assert_eq!(s.status(), QuestionStatus::AnsweredCorrect);
        assert_eq!(
            s.answer_for(0),
            Some(RecordedAnswer {
                selected: OptionLabel::C,
                correct: true
            })
        );
    }

    #[test]
    fn three_wrong_answers_exhaust_attempts() {
        let mut state = started(&[OptionLabel::B]);
        state.submit(OptionLabel::A);
        assert_eq!(session(&state).answer_for(0).map(|a| a.selected), Some(OptionLabel::A));
        state.submit(OptionLabel::C);
        assert_eq!(
            state.submit(OptionLabel::D),
            SubmitOutcome::Exhausted {
                correct: OptionLabel::B
            }
        );
        let s = session(&state);
        assert!(s.is_answered());
        assert_eq!(s.attempts_remaining(), 0);
        assert_eq!(s.status(), QuestionStatus::AnsweredIncorrectExhausted);
        assert_eq!(
            s.answer_for(0),
            Some(RecordedAnswer {
                selected: OptionLabel::D,
                correct: false
            })
        );
    }

    #[test]
    fn submissions_after_answer_are_ignored() {
        let mut state = started(&[OptionLabel::A, OptionLabel::A]);
        state.submit(OptionLabel::A);
        let before = state.clone();
        assert_eq!(state.submit(OptionLabel::B), SubmitOutcome::Ignored);
        assert_eq!(state, before);
    }

    #[test]
    fn advance_requires_answered_question() {
        let mut state = started(&[OptionLabel::A, OptionLabel::B]);
        assert_eq!(state.advance(), AdvanceOutcome::Ignored);
        assert_eq!(session(&state).current_index(), 0);

        state.submit(OptionLabel::D);
        assert_eq!(state.advance(), AdvanceOutcome::Ignored);

        state.submit(OptionLabel::A);
        assert_eq!(state.advance(), AdvanceOutcome::Next { index: 1 });
        let s = session(&state);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.attempts_remaining(), ATTEMPT_BUDGET);
        assert!(!s.is_answered());
        assert_eq!(s.progress(), QuizProgress { position: 2, total: 2 });
    }

    #[test]
    fn two_question_quiz_scores_half() {
        let mut state = started(&[OptionLabel::A, OptionLabel::B]);
        state.submit(OptionLabel::A);
        state.advance();
        for _ in 0..3 {
            state.submit(OptionLabel::C);
        }
        assert_eq!(state.advance(), AdvanceOutcome::Completed);
        assert_eq!(state.phase(), QuizPhase::Completed);

        let score = state.score().unwrap();
        assert_eq!(score, Score { correct: 1, total: 2 });
        assert_eq!(score.to_string(), "1 out of 2 (50.0%)");
    }

    #[test]
    fn completed_state_rejects_further_actions() {
        let mut state = started(&[OptionLabel::A]);
        state.submit(OptionLabel::A);
        state.advance();
        assert_eq!(state.submit(OptionLabel::A), SubmitOutcome::Ignored);
        assert_eq!(state.advance(), AdvanceOutcome::Ignored);
        assert_eq!(state.phase(), QuizPhase::Completed);
    }

    #[test]
    fn pending_history_is_consumed_once() {
        let mut state = started(&[OptionLabel::A]);
        assert!(state.pending_history(fixed_now()).is_none());

        state.submit(OptionLabel::A);
        state.advance();
        let entry = state.pending_history(fixed_now()).unwrap();
        assert_eq!(entry.quiz, "raw quiz");
        assert_eq!(entry.topic, Topic::new("Math"));
        assert_eq!(entry.difficulty, Difficulty::Beginner);
        assert_eq!(entry.timestamp, fixed_now().to_rfc3339());

        state.mark_persisted();
        assert!(state.pending_history(fixed_now()).is_none());
        assert_eq!(session(&state).raw_output(), None);
    }

    #[test]
    fn restart_discards_quiz() {
        let mut state = started(&[OptionLabel::A]);
        state.submit(OptionLabel::A);
        state.advance();
        state.restart();
        assert_eq!(state, QuizState::NotStarted);
        assert!(state.report().is_none());
        assert_eq!(state.submit(OptionLabel::A), SubmitOutcome::Ignored);
    }

    #[test]
    fn new_quiz_replaces_running_one() {
        let mut state = started(&[OptionLabel::A, OptionLabel::B]);
        state.submit(OptionLabel::A);
        state.advance();
        state
            .start(vec![question(9, OptionLabel::D)], "other", Topic::new("Bio"), Difficulty::Advanced)
            .unwrap();
        let s = session(&state);
        assert_eq!(s.current_index(), 0);
        assert!(s.answers().is_empty());
        assert_eq!(s.total_questions(), 1);
        assert_eq!(s.raw_output(), Some("other"));
    }

    #[test]
    fn invariants_hold_through_a_full_run() {
        let answers = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];
        let mut state = started(&answers);
        let guesses = [OptionLabel::D, OptionLabel::C, OptionLabel::B, OptionLabel::A];
        while state.phase() == QuizPhase::InProgress {
            for guess in guesses {
                state.submit(guess);
                let s = session(&state);
                assert!(s.current_index() < s.total_questions());
                assert!(s.attempts_remaining() <= ATTEMPT_BUDGET);
            }
            state.advance();
        }
        assert_eq!(state.score().unwrap().total, 4);
    }

    #[test]
    fn feedback_lines_match_outcomes() {
        assert_eq!(
            SubmitOutcome::Incorrect { attempts_remaining: 1 }.to_string(),
            "Incorrect. You have 1 attempt remaining. Try again!"
        );
        assert_eq!(
            SubmitOutcome::Incorrect { attempts_remaining: 2 }.to_string(),
            "Incorrect. You have 2 attempts remaining. Try again!"
        );
        assert_eq!(
            SubmitOutcome::Exhausted { correct: OptionLabel::B }.to_string(),
            "Incorrect. No attempts left. The correct answer was B."
        );
    }
}
