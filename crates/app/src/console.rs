use std::error::Error;
use std::io::{self, BufRead, Write};

use services::{QuizService, QuizServiceError};
use storage::HistoryRepository;
use tutor_core::model::{Difficulty, OptionLabel, Topic};
use tutor_core::quiz::{OptionMark, QuizReport, QuizState};

/// Line-oriented front end over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Yes/no prompt; anything but `y` (including end of input) is no.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Ok(self
            .ask(prompt)?
            .is_some_and(|reply| reply.eq_ignore_ascii_case("y")))
    }

    /// Generate quizzes from `document` until the user declines a new one.
    ///
    /// # Errors
    ///
    /// Returns generation, storage and terminal I/O failures. Unparsable
    /// generator output is shown to the user instead.
    pub async fn run_quiz(
        &mut self,
        service: &QuizService,
        document: &[u8],
        difficulty: Difficulty,
    ) -> Result<(), Box<dyn Error>> {
        let mut state = QuizState::default();
        loop {
            writeln!(
                self.output,
                "Generating a {difficulty} quiz ({})...",
                difficulty.description()
            )?;
            match service.generate_quiz(&mut state, document, difficulty).await {
                Ok(generated) => {
                    writeln!(
                        self.output,
                        "Generated {} question(s) on {}.",
                        generated.question_count, generated.topic
                    )?;
                    let skipped = generated
                        .diagnostics
                        .iter()
                        .filter(|d| !d.is_accepted())
                        .count();
                    if skipped > 0 {
                        writeln!(self.output, "Skipped {skipped} malformed question block(s).")?;
                    }
                }
                Err(QuizServiceError::NoQuestions { raw_output, .. }) => {
                    writeln!(
                        self.output,
                        "Failed to parse the generated quiz. The format might be unexpected."
                    )?;
                    writeln!(self.output, "Raw output:\n{raw_output}")?;
                    if self.confirm("Try again? [y/N] ")? {
                        continue;
                    }
                    return Ok(());
                }
                Err(err @ QuizServiceError::Generation(_)) => {
                    writeln!(self.output, "Error generating quiz: {err}")?;
                    if self.confirm("Try again? [y/N] ")? {
                        continue;
                    }
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }

            if !self.play(service, &mut state).await? {
                return Ok(());
            }

            if let Err(err) = service.finalize_history(&mut state).await {
                writeln!(self.output, "Warning: quiz history was not saved: {err}")?;
            }
            if let Some(report) = state.report() {
                self.print_report(&report)?;
            }

            if !self.confirm("\nStart a new quiz with the same document? [y/N] ")? {
                return Ok(());
            }
            state.restart();
        }
    }

    /// Drive the in-progress quiz to completion. `false` if input ran out first.
    async fn play(
        &mut self,
        service: &QuizService,
        state: &mut QuizState,
    ) -> Result<bool, Box<dyn Error>> {
        let mut shown = None;
        while let QuizState::InProgress(session) = &*state {
            if session.is_answered() {
                let prompt = if session.is_last() {
                    "Press Enter to see your results..."
                } else {
                    "Press Enter for the next question..."
                };
                if self.ask(prompt)?.is_none() {
                    return Ok(false);
                }
                // Completion still happened; the caller retries the history write.
                if let Err(err) = service.advance(state).await {
                    tracing::warn!(error = %err, "history write after completion failed");
                }
                continue;
            }

            let index = session.current_index();
            if shown != Some(index) {
                shown = Some(index);
                let progress = session.progress();
                let question = session.current_question();
                writeln!(
                    self.output,
                    "\nQuestion {} of {} {}  [Topic: {}]",
                    progress.position,
                    progress.total,
                    progress_bar(progress.fraction()),
                    session.topic()
                )?;
                writeln!(self.output, "{}", question.question())?;
                for (label, text) in question.options().iter() {
                    writeln!(self.output, "  {label}. {text}")?;
                }
            }

            let Some(reply) = self.ask("Your answer (A-D): ")? else {
                return Ok(false);
            };
            match reply.to_ascii_uppercase().parse::<OptionLabel>() {
                Ok(label) => {
                    let outcome = service.submit(state, label);
                    writeln!(self.output, "{outcome}")?;
                }
                Err(_) => writeln!(self.output, "Please answer with A, B, C or D.")?,
            }
        }
        Ok(true)
    }

    fn print_report(&mut self, report: &QuizReport) -> io::Result<()> {
        writeln!(self.output, "\n=== Quiz Report ===")?;
        for item in &report.items {
            writeln!(
                self.output,
                "\nQuestion {}: {}",
                item.number,
                item.question.question()
            )?;
            for (label, text) in item.question.options().iter() {
                let (marker, note) = match item.mark(label) {
                    OptionMark::ChosenCorrect => ("[ok]", " (your answer, correct)"),
                    OptionMark::Correct => ("[ok]", " (correct answer)"),
                    OptionMark::ChosenWrong => ("[x] ", " (your answer)"),
                    OptionMark::Plain => ("    ", ""),
                };
                writeln!(self.output, "  {marker} {label}. {text}{note}")?;
            }
            if item.answer.is_none() {
                writeln!(self.output, "  Answer not recorded for this question.")?;
            }
            writeln!(self.output, "  Explanation: {}", item.question.explanation())?;
        }
        writeln!(self.output, "\nFinal Score: {}", report.score)?;
        writeln!(self.output, "{}", report.score.band().message())
    }
}

const PROGRESS_WIDTH: usize = 10;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize)
        .min(PROGRESS_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

/// List stored quizzes, optionally only those for `topic`.
///
/// # Errors
///
/// Returns storage and I/O failures.
pub async fn print_history(
    output: &mut impl Write,
    history: &dyn HistoryRepository,
    topic: Option<&Topic>,
) -> Result<(), Box<dyn Error>> {
    let history = history.load_history().await?;
    let entries: Vec<_> = history
        .entries()
        .filter(|entry| topic.is_none_or(|t| &entry.topic == t))
        .collect();

    if entries.is_empty() {
        writeln!(output, "No quiz history found.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            output,
            "[{}] {} ({}): {}",
            entry.timestamp,
            entry.topic,
            entry.difficulty,
            entry.summary_line()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use services::{ChatMessage, CompletionBackend, GenerationError, QuizGenerator};
    use storage::InMemoryHistoryRepository;
    use tutor_core::model::QuizHistoryEntry;
    use tutor_core::time::{fixed_clock, fixed_now};

    const TWO_QUESTIONS: &str = "Question: 1. What is 2+2?
Options:
A. 3
B. 4
C. 5
D. 6
Answer:
B
Explanation:
Basic arithmetic.

Question: 2. What colour is the sky?
Options:
A. Green
B. Red
C. Blue
D. Black
Answer:
C
Explanation:
Rayleigh scattering.";

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionBackend for Canned {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    /// Plays back one reply per request; `None` stands for a failed request.
    struct Sequence(std::sync::Mutex<Vec<Option<&'static str>>>);

    impl Sequence {
        fn new(mut replies: Vec<Option<&'static str>>) -> Self {
            replies.reverse();
            Self(std::sync::Mutex::new(replies))
        }
    }

    #[async_trait]
    impl CompletionBackend for Sequence {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, GenerationError> {
            match self.0.lock().unwrap().pop().flatten() {
                Some(reply) => Ok(reply.to_string()),
                None => Err(GenerationError::EmptyResponse),
            }
        }
    }

    fn sequenced(
        replies: Vec<Option<&'static str>>,
        history: Arc<InMemoryHistoryRepository>,
    ) -> QuizService {
        QuizService::new(
            fixed_clock(),
            QuizGenerator::new(Arc::new(Sequence::new(replies))),
            history,
        )
    }

    fn service(reply: &'static str, history: Arc<InMemoryHistoryRepository>) -> QuizService {
        QuizService::new(
            fixed_clock(),
            QuizGenerator::new(Arc::new(Canned(reply))),
            history,
        )
    }

    async fn run_scripted(svc: &QuizService, script: &str) -> String {
        let mut output = Vec::new();
        let mut console = Console::new(script.as_bytes(), &mut output);
        console
            .run_quiz(svc, b"Arithmetic\nNumbers add up.", Difficulty::Beginner)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn scripted_quiz_reports_score_and_saves_history() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = service(TWO_QUESTIONS, history.clone());

        // Wrong, then right; invalid input; exhaust all attempts on question 2.
        let out = run_scripted(&svc, "a\nB\n\nz\nA\nB\nD\n\nn\n").await;

        assert!(out.contains("Generated 2 question(s) on Arithmetic."));
        assert!(out.contains("Question 1 of 2 [#####-----]  [Topic: Arithmetic]"));
        assert!(out.contains("Question 2 of 2 [##########]  [Topic: Arithmetic]"));
        assert!(out.contains("Incorrect. You have 2 attempts remaining. Try again!"));
        assert!(out.contains("Correct! The answer is B."));
        assert!(out.contains("Please answer with A, B, C or D."));
        assert!(out.contains("Incorrect. No attempts left. The correct answer was C."));
        assert!(out.contains("[ok] B. 4 (your answer, correct)"));
        assert!(out.contains("[x]  D. Black (your answer)"));
        assert!(out.contains("[ok] C. Blue (correct answer)"));
        assert!(out.contains("Final Score: 1 out of 2 (50.0%)"));
        assert!(out.contains("Keep studying!"));

        assert_eq!(history.load_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn restart_generates_a_fresh_quiz() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = service(TWO_QUESTIONS, history.clone());

        let out = run_scripted(&svc, "B\n\nC\n\ny\nB\n\nC\n\n").await;

        assert_eq!(out.matches("Final Score: 2 out of 2 (100.0%)").count(), 2);
        assert_eq!(out.matches("Perfect score!").count(), 2);
        assert_eq!(history.load_history().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn generation_failure_offers_a_retry() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = sequenced(vec![None, Some(TWO_QUESTIONS)], history.clone());

        let out = run_scripted(&svc, "y\nB\n\nC\n\nn\n").await;

        assert!(out.contains("Error generating quiz:"));
        assert!(out.contains("Final Score: 2 out of 2 (100.0%)"));
        assert_eq!(history.load_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unparsable_output_is_printed_raw() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = service("I cannot do that.", history.clone());

        let out = run_scripted(&svc, "n\n").await;

        assert!(out.contains("Failed to parse the generated quiz."));
        assert!(out.contains("Raw output:\nI cannot do that."));
        assert!(out.contains("Try again? [y/N]"));
        assert!(!out.contains("Final Score"));
        assert!(history.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparsable_output_can_be_regenerated() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = sequenced(
            vec![Some("I cannot do that."), Some(TWO_QUESTIONS)],
            history.clone(),
        );

        let out = run_scripted(&svc, "y\nB\n\nC\n\nn\n").await;

        assert!(out.contains("Raw output:\nI cannot do that."));
        assert_eq!(out.matches("Generating a Beginner quiz").count(), 2);
        assert!(out.contains("Final Score: 2 out of 2 (100.0%)"));
        assert_eq!(history.load_history().await.unwrap().len(), 1);
    }

    #[test]
    fn progress_bar_fills_with_position() {
        assert_eq!(progress_bar(0.0), "[----------]");
        assert_eq!(progress_bar(0.2), "[##--------]");
        assert_eq!(progress_bar(1.0), "[##########]");
    }

    #[tokio::test]
    async fn input_ending_mid_quiz_stops_quietly() {
        let history = Arc::new(InMemoryHistoryRepository::new());
        let svc = service(TWO_QUESTIONS, history.clone());

        let out = run_scripted(&svc, "B\n").await;

        assert!(out.contains("Correct! The answer is B."));
        assert!(!out.contains("Final Score"));
        assert!(history.load_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_listing_filters_by_topic() {
        let repo = InMemoryHistoryRepository::new();
        for topic in ["Cells", "Stars"] {
            repo.append_entry(&QuizHistoryEntry::new(
                fixed_now(),
                Topic::new(topic),
                Difficulty::Advanced,
                format!("Question: 1. About {topic}?\nAnswer:\nA. yes"),
            ))
            .await
            .unwrap();
        }

        let mut out = Vec::new();
        print_history(&mut out, &repo, Some(&Topic::new("Stars")))
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Stars (Advanced): Q: Question: 1. About Stars? A: A. yes"));
        assert!(!out.contains("Cells"));

        let mut empty = Vec::new();
        print_history(&mut empty, &InMemoryHistoryRepository::new(), None)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(empty).unwrap(), "No quiz history found.\n");
    }
}
