#![forbid(unsafe_code)]

//! Domain types for textbook quizzes: question records, the text parser that
//! produces them, and the question-by-question quiz state machine.

pub mod model;
pub mod parser;
pub mod quiz;
pub mod time;

pub use parser::{parse_quiz, parse_quiz_with_report};
pub use time::Clock;
