//! Result computation for a finished question set.

use itertools::Itertools;
use serde::Serialize;

use crate::question::{Difficulty, Question, QuestionStatus};

/// Immutable summary produced once, when the session finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Results {
    pub score: f64,
    pub correct: usize,
    pub incorrect: usize,
    pub unattempted: usize,
    pub time_taken_secs: u64,
}

impl Results {
    pub fn attempted(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn total(&self) -> usize {
        self.correct + self.incorrect + self.unattempted
    }

    /// Share of attempted questions answered correctly, in percent.
    pub fn accuracy_percent(&self) -> f64 {
        match self.attempted() {
            0 => 0.0,
            attempted => self.correct as f64 / attempted as f64 * 100.0,
        }
    }

    pub fn avg_time_per_question_secs(&self, question_count: usize) -> u64 {
        match question_count {
            0 => 0,
            n => (self.time_taken_secs as f64 / n as f64).round() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    Skipped,
}

impl Outcome {
    pub fn of(question: &Question) -> Self {
        match question.answer() {
            None => Outcome::Skipped,
            Some(answer) if answer == question.correct_answer => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
        }
    }
}

/// Marks contributed by one question. `marks_negative` is added as
/// configured, whatever its sign.
pub fn marks_awarded(question: &Question) -> f64 {
    match Outcome::of(question) {
        Outcome::Correct => question.marks_correct,
        Outcome::Incorrect => question.marks_negative,
        Outcome::Skipped => 0.0,
    }
}

/// Scores the question set. `time_left_secs` is the countdown value at the
/// instant of scoring.
pub fn score(questions: &[Question], total_duration_secs: u64, time_left_secs: u64) -> Results {
    let mut results = Results {
        score: 0.0,
        correct: 0,
        incorrect: 0,
        unattempted: 0,
        time_taken_secs: total_duration_secs.saturating_sub(time_left_secs),
    };

    for q in questions {
        match Outcome::of(q) {
            Outcome::Skipped => results.unattempted += 1,
            Outcome::Correct => {
                results.score += q.marks_correct;
                results.correct += 1;
            }
            Outcome::Incorrect => {
                results.score += q.marks_negative;
                results.incorrect += 1;
            }
        }
    }

    results
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: String,
    pub questions: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unattempted: usize,
    pub score: f64,
    pub time_spent_secs: u64,
}

/// Per-section totals, sections in order of first appearance.
pub fn section_breakdown(questions: &[Question]) -> Vec<SectionSummary> {
    questions
        .iter()
        .map(|q| q.section.as_str())
        .unique()
        .map(|section| {
            let in_section = questions
                .iter()
                .filter(|q| q.section == section)
                .collect::<Vec<_>>();
            let outcomes = in_section.iter().map(|q| Outcome::of(q)).counts();
            SectionSummary {
                section: section.to_string(),
                questions: in_section.len(),
                correct: outcomes.get(&Outcome::Correct).copied().unwrap_or(0),
                incorrect: outcomes.get(&Outcome::Incorrect).copied().unwrap_or(0),
                unattempted: outcomes.get(&Outcome::Skipped).copied().unwrap_or(0),
                score: in_section.iter().map(|q| marks_awarded(q)).sum(),
                time_spent_secs: in_section.iter().map(|q| q.time_spent()).sum(),
            }
        })
        .collect()
}

/// Read-only review detail for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub position: usize,
    pub id: i64,
    pub section: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_text: String,
    pub context: Option<String>,
    pub options: Vec<String>,
    pub status: QuestionStatus,
    pub chosen_index: Option<usize>,
    pub chosen_answer: Option<String>,
    pub correct_index: Option<usize>,
    pub correct_answer: String,
    pub outcome: Outcome,
    pub marks_awarded: f64,
    pub time_spent_secs: u64,
}

impl QuestionReview {
    pub fn new(position: usize, q: &Question) -> Self {
        Self {
            position,
            id: q.id,
            section: q.section.clone(),
            topic: q.topic.clone(),
            difficulty: q.difficulty,
            question_text: q.question_text.clone(),
            context: q.context.clone(),
            options: q.options.clone(),
            status: q.status(),
            chosen_index: q.answer_index(),
            chosen_answer: q.answer().map(str::to_string),
            correct_index: q.correct_index(),
            correct_answer: q.correct_answer.clone(),
            outcome: Outcome::of(q),
            marks_awarded: marks_awarded(q),
            time_spent_secs: q.time_spent(),
        }
    }
}
