mod difficulty;
mod history;
mod label;
mod question;
mod topic;

pub use difficulty::{Difficulty, DifficultyError};
pub use history::{QuizHistory, QuizHistoryEntry};
pub use label::{LabelError, OptionLabel};
pub use question::{QuestionError, QuestionOptions, QuestionRecord};
pub use topic::{TOPIC_MAX_CHARS, Topic};
