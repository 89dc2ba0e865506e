use std::fmt;
use std::path::PathBuf;

use storage::JsonHistoryStore;
use tutor_core::model::{Difficulty, Topic};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDifficulty { raw: String },
    MissingFile,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDifficulty { raw } => write!(
                f,
                "invalid --difficulty value: {raw} (expected beginner, intermediate or advanced)"
            ),
            ArgsError::MissingFile => write!(f, "quiz requires --file <path>"),
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tutor [quiz] --file <path> [--difficulty <level>] [--history <path>]");
    eprintln!("  tutor history [--topic <topic>] [--history <path>]");
    eprintln!();
    eprintln!("  --file accepts plain text (UTF-8) or PDF documents.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --difficulty beginner");
    eprintln!("  --history {}", JsonHistoryStore::DEFAULT_PATH);
    eprintln!();
    eprintln!("Environment (a .env file is read if present):");
    eprintln!("  TUTOR_AI_API_KEY (or OPENAI_API_KEY), TUTOR_AI_MODEL, TUTOR_AI_BASE_URL,");
    eprintln!("  TUTOR_AI_PROJECT, TUTOR_HISTORY_PATH, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quiz(QuizArgs),
    History(HistoryArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizArgs {
    pub file: PathBuf,
    pub difficulty: Difficulty,
    pub history_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryArgs {
    pub topic: Option<Topic>,
    pub history_path: PathBuf,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn default_history_path(env_path: Option<String>) -> PathBuf {
    env_path
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(JsonHistoryStore::DEFAULT_PATH), PathBuf::from)
}

impl Command {
    /// Parse arguments (without the program name).
    ///
    /// `history_env` is the value of `TUTOR_HISTORY_PATH`, if set.
    pub fn parse(argv: Vec<String>, history_env: Option<String>) -> Result<Self, ArgsError> {
        let mut iter = argv.into_iter().peekable();
        let history_path = default_history_path(history_env);

        // `quiz` is the default when the first argument is a flag.
        match iter.peek().map(String::as_str) {
            None | Some("--help" | "-h") => Ok(Self::Help),
            Some("history") => {
                iter.next();
                Self::parse_history(&mut iter, history_path)
            }
            Some("quiz") => {
                iter.next();
                Self::parse_quiz(&mut iter, history_path)
            }
            Some(first) if first.starts_with("--") => Self::parse_quiz(&mut iter, history_path),
            Some(first) => Err(ArgsError::UnknownCommand(first.to_string())),
        }
    }

    fn parse_quiz(
        args: &mut impl Iterator<Item = String>,
        mut history_path: PathBuf,
    ) -> Result<Self, ArgsError> {
        let mut file = None;
        let mut difficulty = Difficulty::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--file" | "-f" => file = Some(PathBuf::from(require_value(args, "--file")?)),
                "--difficulty" | "-d" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--history" => history_path = PathBuf::from(require_value(args, "--history")?),
                "--help" | "-h" => return Ok(Self::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self::Quiz(QuizArgs {
            file: file.ok_or(ArgsError::MissingFile)?,
            difficulty,
            history_path,
        }))
    }

    fn parse_history(
        args: &mut impl Iterator<Item = String>,
        mut history_path: PathBuf,
    ) -> Result<Self, ArgsError> {
        let mut topic = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => topic = Some(Topic::new(require_value(args, "--topic")?)),
                "--history" => history_path = PathBuf::from(require_value(args, "--history")?),
                "--help" | "-h" => return Ok(Self::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self::History(HistoryArgs {
            topic,
            history_path,
        }))
    }
}
