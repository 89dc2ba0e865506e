use tutor_core::model::{Difficulty, OptionLabel, Topic};
use tutor_core::parse_quiz;
use tutor_core::quiz::{AdvanceOutcome, QuizPhase, QuizState, SubmitOutcome};

fn well_formed(n: usize, answer: char) -> String {
    format!(
        "Question: {n}. Which option is {answer}?
Options:
A. alpha
B. beta
C. gamma
D. delta
Answer:
{answer}. the right one
Explanation:
Option {answer} was requested."
    )
}

fn malformed(n: usize, missing: &str) -> String {
    let block = well_formed(n, 'A');
    let mut lines: Vec<&str> = block.lines().collect();
    let pos = lines
        .iter()
        .position(|line| line.starts_with(missing))
        .expect("marker present");
    lines.remove(pos);
    lines.join("\n")
}

#[test]
fn scenario_exact_single_block() {
    let raw = "Question: What is 2+2?\nOptions:\nA. 3\nB. 4\nC. 5\nD. 6\nAnswer:\nB\nExplanation:\nBasic arithmetic.";
    let questions = parse_quiz(raw);
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].answer(), OptionLabel::B);
    assert_eq!(questions[0].question(), "What is 2+2?");
}

#[test]
fn scenario_missing_explanation_yields_nothing() {
    let raw = "Question: What is 2+2?\nOptions:\nA. 3\nB. 4\nC. 5\nD. 6\nAnswer:\nB";
    assert!(parse_quiz(raw).is_empty());
}

#[test]
fn n_valid_and_m_malformed_blocks_yield_n_records() {
    let mut blocks = Vec::new();
    let markers = ["Options:", "Answer:", "Explanation:"];
    for n in 1..=9 {
        if n % 3 == 0 {
            blocks.push(malformed(n, markers[(n / 3) - 1]));
        } else {
            let answer = ['A', 'B', 'C', 'D'][n % 4];
            blocks.push(well_formed(n, answer));
        }
    }
    let raw = blocks.join("\n\n");
    let questions = parse_quiz(&raw);
    assert_eq!(questions.len(), 6);
    for q in &questions {
        assert_eq!(q.options().iter().count(), 4);
        assert!(!q.question().is_empty());
        assert!(!q.explanation().is_empty());
    }
    assert_eq!(parse_quiz(&raw), questions);
}

#[test]
fn scenario_two_questions_one_right_one_exhausted() {
    let raw = format!("{}\n{}", well_formed(1, 'A'), well_formed(2, 'C'));
    let questions = parse_quiz(&raw);
    assert_eq!(questions.len(), 2);

    let mut state = QuizState::default();
    state
        .start(questions, raw.clone(), Topic::new("Letters"), Difficulty::Beginner)
        .unwrap();

    assert!(matches!(state.submit(OptionLabel::A), SubmitOutcome::Correct { .. }));
    assert_eq!(state.advance(), AdvanceOutcome::Next { index: 1 });

    state.submit(OptionLabel::A);
    state.submit(OptionLabel::B);
    assert_eq!(
        state.submit(OptionLabel::D),
        SubmitOutcome::Exhausted {
            correct: OptionLabel::C
        }
    );
    assert_eq!(state.advance(), AdvanceOutcome::Completed);
    assert_eq!(state.phase(), QuizPhase::Completed);
    assert_eq!(state.score().unwrap().to_string(), "1 out of 2 (50.0%)");
}
