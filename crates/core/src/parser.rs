//! Turns free-text quiz output into validated question records.
//!
//! The expected block layout is:
//!
//! ```text
//! Question: 1. <question text>
//! Options:
//! A. <text>
//! B. <text>
//! C. <text>
//! D. <text>
//! Answer:
//! B. <optional text>
//! Explanation:
//! <one or more lines>
//! ```
//!
//! Blocks that do not yield a complete record are dropped; one bad block never
//! affects its neighbours.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{OptionLabel, QuestionError, QuestionRecord};

static BLOCK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\n)Question:\s*(?:\d+\.\s*)?").expect("block marker pattern is valid")
});
static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])\.\s*(.*)").expect("option pattern is valid"));
static ANSWER_WITH_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])\.").expect("answer pattern is valid"));
static ANSWER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-D])$").expect("answer pattern is valid"));

const OPTIONS_MARKER: &str = "Options:";
const ANSWER_MARKER: &str = "Answer:";
const EXPLANATION_MARKER: &str = "Explanation:";

//
// ─── DIAGNOSTICS ───────────────────────────────────────────────────────────────
//

/// Why a block was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlockDefect {
    MissingQuestion,
    /// Options/Answer markers absent or out of order.
    MisplacedMarkers,
    OptionCount(usize),
    MissingAnswer,
    AnswerNotAnOption(OptionLabel),
    MissingExplanation,
}

impl fmt::Display for BlockDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuestion => f.write_str("missing question text"),
            Self::MisplacedMarkers => f.write_str("options/answer markers missing or out of order"),
            Self::OptionCount(n) => write!(f, "incorrect option count ({n})"),
            Self::MissingAnswer => f.write_str("missing answer"),
            Self::AnswerNotAnOption(label) => write!(f, "answer {label} is not an option"),
            Self::MissingExplanation => f.write_str("missing explanation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Accepted,
    Rejected(Vec<BlockDefect>),
}

/// Per-block parse result, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDiagnostic {
    /// 1-based position among non-empty blocks.
    pub block: usize,
    pub question: Option<String>,
    pub outcome: BlockOutcome,
}

impl BlockDiagnostic {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, BlockOutcome::Accepted)
    }
}

/// Parsed records plus the diagnostics that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub questions: Vec<QuestionRecord>,
    pub diagnostics: Vec<BlockDiagnostic>,
}

impl ParseReport {
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_accepted()).count()
    }
}

//
// ─── PARSING ───────────────────────────────────────────────────────────────────
//

/// Parse raw quiz text into question records, dropping malformed blocks.
#[must_use]
pub fn parse_quiz(raw: &str) -> Vec<QuestionRecord> {
    parse_quiz_with_report(raw).questions
}

/// Like [`parse_quiz`], also returning one diagnostic per block.
#[must_use]
pub fn parse_quiz_with_report(raw: &str) -> ParseReport {
    let mut report = ParseReport::default();
    let blocks = BLOCK_MARKER
        .split(raw.trim())
        .filter(|block| !block.trim().is_empty());

    for (i, block) in blocks.enumerate() {
        let number = i + 1;
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let question = lines.first().map(|line| (*line).to_string());

        match parse_block(&lines) {
            Ok(record) => {
                tracing::debug!(block = number, question = record.question(), "quiz block accepted");
                report.questions.push(record);
                report.diagnostics.push(BlockDiagnostic {
                    block: number,
                    question,
                    outcome: BlockOutcome::Accepted,
                });
            }
            Err(defects) => {
                let reasons = defects
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(block = number, %reasons, "quiz block rejected");
                report.diagnostics.push(BlockDiagnostic {
                    block: number,
                    question,
                    outcome: BlockOutcome::Rejected(defects),
                });
            }
        }
    }

    tracing::debug!(
        accepted = report.questions.len(),
        rejected = report.rejected(),
        "quiz parse finished"
    );
    report
}

#[derive(Debug, Default)]
struct Markers {
    options_start: Option<usize>,
    answer: Option<usize>,
    explanation: Option<usize>,
}

impl Markers {
    fn scan(lines: &[&str]) -> Self {
        let mut markers = Self::default();
        for (idx, line) in lines.iter().enumerate() {
            if line.starts_with(OPTIONS_MARKER) {
                markers.options_start = Some(idx + 1);
            } else if line.starts_with(ANSWER_MARKER) {
                markers.answer = Some(idx);
            } else if line.starts_with(EXPLANATION_MARKER) {
                markers.explanation = Some(idx);
            }
        }
        markers
    }
}

fn parse_block(lines: &[&str]) -> Result<QuestionRecord, Vec<BlockDefect>> {
    let mut defects = Vec::new();
    let question = lines.first().copied().unwrap_or_default();
    if question.is_empty() {
        defects.push(BlockDefect::MissingQuestion);
    }

    let markers = Markers::scan(lines);

    let mut options = BTreeMap::new();
    match (markers.options_start, markers.answer) {
        (Some(start), Some(end)) if start <= end => {
            for line in &lines[start..end] {
                if let Some((label, text)) = parse_option_line(line) {
                    options.insert(label, text.to_string());
                }
            }
        }
        _ => defects.push(BlockDefect::MisplacedMarkers),
    }
    if options.len() != OptionLabel::ALL.len() {
        defects.push(BlockDefect::OptionCount(options.len()));
    }

    let answer = markers
        .answer
        .and_then(|idx| lines.get(idx + 1))
        .and_then(|line| parse_answer_line(line));
    if answer.is_none() {
        defects.push(BlockDefect::MissingAnswer);
    }

    let explanation = markers
        .explanation
        .map(|idx| lines[idx + 1..].join("\n").trim().to_string())
        .unwrap_or_default();
    if explanation.is_empty() {
        defects.push(BlockDefect::MissingExplanation);
    }

    let Some(answer) = answer else {
        return Err(defects);
    };
    if !defects.is_empty() {
        return Err(defects);
    }

    QuestionRecord::from_parts(question, options, answer, explanation).map_err(|err| {
        vec![match err {
            QuestionError::AnswerNotAnOption(label) => BlockDefect::AnswerNotAnOption(label),
            QuestionError::OptionCount { found } => BlockDefect::OptionCount(found),
            QuestionError::EmptyExplanation => BlockDefect::MissingExplanation,
            QuestionError::EmptyQuestion => BlockDefect::MissingQuestion,
        }]
    })
}

fn parse_option_line(line: &str) -> Option<(OptionLabel, &str)> {
    let caps = OPTION_LINE.captures(line)?;
    let label = label_from_capture(caps.get(1)?.as_str())?;
    Some((label, caps.get(2).map_or("", |m| m.as_str()).trim()))
}

fn parse_answer_line(line: &str) -> Option<OptionLabel> {
    let caps = ANSWER_WITH_TEXT
        .captures(line)
        .or_else(|| ANSWER_ONLY.captures(line))?;
    label_from_capture(caps.get(1)?.as_str())
}

fn label_from_capture(text: &str) -> Option<OptionLabel> {
    text.chars().next().and_then(OptionLabel::from_char)
}
