mod report;
mod session;

pub use report::{OptionMark, QuizReport, ReportItem, Score, ScoreBand};
pub use session::{
    ATTEMPT_BUDGET, AdvanceOutcome, QuestionStatus, QuizError, QuizPhase, QuizProgress,
    QuizSession, QuizState, RecordedAnswer, SubmitOutcome,
};
