use tutor_core::model::{Difficulty, QuizHistory, Topic};

use crate::generator::client::ChatMessage;

/// Character budget for source text sent to the model.
pub const MAX_SOURCE_CHARS: usize = 15_000;
pub const TRUNCATION_MARKER: &str = "\n... [Text truncated due to length]";
/// Same-topic history entries summarised in the prompt.
pub const HISTORY_LIMIT: usize = 10;
pub const QUESTION_COUNT: usize = 5;
pub const NO_HISTORY: &str = "No relevant history found.";

pub const SYSTEM_PROMPT: &str = "You are a helpful AI tutor specializing in creating educational assessments that match the student's skill level.";

/// The block layout the quiz parser reads.
pub const FORMAT_TEMPLATE: &str = "Question: 1. <question text>
Options:
A. <option A>
B. <option B>
C. <option C>
D. <option D>
Answer:
<letter of the correct option>
Explanation:
<explanation>";

/// System and user messages for one quiz request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPrompt {
    pub system: String,
    pub user: String,
    /// True when the source text was cut to `MAX_SOURCE_CHARS`.
    pub truncated: bool,
    pub history_items: usize,
}

impl QuizPrompt {
    #[must_use]
    pub fn build(
        source: &str,
        history: &QuizHistory,
        difficulty: Difficulty,
        topic: &Topic,
    ) -> Self {
        let (content, truncated) = truncate_source(source);
        let relevant = history.relevant_to(topic, HISTORY_LIMIT);
        let history_items = relevant.len();
        let history_text = if relevant.is_empty() {
            NO_HISTORY.to_string()
        } else {
            relevant
                .iter()
                .map(|entry| entry.summary_line())
                .collect::<Vec<_>>()
                .join("\n")
        };
        let guidelines = difficulty.guidelines();

        let user = format!(
            "You are an AI tutor helping students prepare for exams. You're creating a {difficulty} level quiz.

For this {difficulty} level:
{guidelines}

The student provided the following textbook content (potentially truncated):
{content}

The student's past quiz history for the topic '{topic}' includes (most recent):
{history_text}
Avoid repeating questions similar to those above.

Please generate exactly {QUESTION_COUNT} questions that match the {difficulty} level guidelines above. For each question:
- Ensure the difficulty matches the specified guidelines
- Make questions clear and unambiguous
- Include four distinct options (A, B, C, D)
- Provide a correct answer
- Give a thorough explanation that helps the student learn

Format each question exactly as follows, one question per block, in this order:
{FORMAT_TEMPLATE}
"
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
            truncated,
            history_items,
        }
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Cut `text` to `MAX_SOURCE_CHARS` characters, appending the truncation marker.
#[must_use]
pub fn truncate_source(text: &str) -> (String, bool) {
    match text.char_indices().nth(MAX_SOURCE_CHARS) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::QuizHistoryEntry;
    use tutor_core::time::fixed_now;

    fn entry(topic: &str, n: usize) -> QuizHistoryEntry {
        QuizHistoryEntry::new(
            fixed_now(),
            Topic::new(topic),
            Difficulty::Beginner,
            format!("Question: {n}. Old question {n}?\nAnswer:\nA. answer {n}"),
        )
    }

    #[test]
    fn short_source_is_kept_whole() {
        let (text, truncated) = truncate_source("short text");
        assert_eq!(text, "short text");
        assert!(!truncated);

        let exact = "a".repeat(MAX_SOURCE_CHARS);
        assert!(!truncate_source(&exact).1);
    }

    #[test]
    fn long_source_is_cut_on_characters() {
        let source = "é".repeat(MAX_SOURCE_CHARS + 10);
        let (text, truncated) = truncate_source(&source);
        assert!(truncated);
        assert!(text.ends_with(TRUNCATION_MARKER));
        let body = text.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), MAX_SOURCE_CHARS);
    }

    #[test]
    fn prompt_lists_recent_same_topic_history() {
        let mut history = QuizHistory::default();
        for n in 0..12 {
            history.push(entry("Cells", n));
            history.push(entry("Stars", 100 + n));
        }
        let prompt = QuizPrompt::build("Cells\nbody", &history, Difficulty::Advanced, &Topic::new("Cells"));
        assert_eq!(prompt.history_items, 10);
        assert!(!prompt.user.contains("Old question 1?"));
        assert!(prompt.user.contains("Q: Question: 2. Old question 2? A: A. answer 2"));
        assert!(prompt.user.contains("Old question 11?"));
        assert!(!prompt.user.contains("Old question 100?"));
        assert!(!prompt.user.contains(NO_HISTORY));
    }

    #[test]
    fn prompt_without_history_says_so() {
        let prompt = QuizPrompt::build(
            "text",
            &QuizHistory::default(),
            Difficulty::Beginner,
            &Topic::general(),
        );
        assert!(prompt.user.contains(NO_HISTORY));
        assert_eq!(prompt.history_items, 0);
    }

    #[test]
    fn prompt_embeds_level_guidelines_and_schema() {
        for difficulty in Difficulty::ALL {
            let prompt =
                QuizPrompt::build("text", &QuizHistory::default(), difficulty, &Topic::general());
            assert!(prompt.user.contains(difficulty.guidelines()));
            assert!(prompt.user.contains(&format!("{difficulty} level quiz")));
            assert!(prompt.user.contains("exactly 5 questions"));
            assert!(prompt.user.contains(FORMAT_TEMPLATE));
        }
    }

    #[test]
    fn messages_are_system_then_user() {
        let prompt =
            QuizPrompt::build("text", &QuizHistory::default(), Difficulty::Beginner, &Topic::general());
        let messages = prompt.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(messages[1].content, prompt.user);
    }
}
