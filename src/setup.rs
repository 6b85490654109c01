use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExamError, Result};
use crate::question::{Difficulty, Question, QuestionRecord};

/// Which questions to keep from the input. `Mixed` keeps everything.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum DifficultyFilter {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl DifficultyFilter {
    pub fn matches(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::Easy => difficulty == Difficulty::Easy,
            DifficultyFilter::Medium => difficulty == Difficulty::Medium,
            DifficultyFilter::Hard => difficulty == Difficulty::Hard,
            DifficultyFilter::Mixed => true,
        }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSetup {
    pub records: Vec<QuestionRecord>,
    pub difficulty: DifficultyFilter,
    pub duration_secs: u64,
}

impl ExamSetup {
    pub fn new(records: Vec<QuestionRecord>, difficulty: DifficultyFilter, duration_secs: u64) -> Self {
        Self {
            records,
            difficulty,
            duration_secs,
        }
    }

    pub fn from_minutes(records: Vec<QuestionRecord>, difficulty: DifficultyFilter, minutes: u64) -> Self {
        Self::new(records, difficulty, minutes.saturating_mul(60))
    }

    /// Validates the configuration and produces the normalized question set.
    /// Nothing is consumed on failure.
    pub fn question_set(&self) -> Result<Vec<Question>> {
        if self.duration_secs == 0 {
            return Err(ExamError::InvalidDuration(self.duration_secs));
        }
        if self.records.is_empty() {
            return Err(ExamError::EmptyQuestionSet);
        }
        for (idx, record) in self.records.iter().enumerate() {
            record.validate().map_err(|reason| ExamError::InvalidRecord {
                position: idx + 1,
                reason,
            })?;
        }
        let questions: Vec<Question> = self
            .records
            .iter()
            .filter(|r| self.difficulty.matches(r.difficulty))
            .cloned()
            .map(Question::from)
            .collect();
        if questions.is_empty() {
            return Err(ExamError::NoQuestionsForDifficulty(self.difficulty));
        }
        Ok(questions)
    }
}

/// Parses a JSON question list. The top level must be an array and every
/// record must pass [`QuestionRecord::validate`].
pub fn parse_question_set(json: &str) -> Result<Vec<QuestionRecord>> {
    if json.trim().is_empty() {
        return Err(ExamError::EmptyQuestionSet);
    }
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ExamError::MalformedInput(format!(
                "expected an array of questions, found {}",
                json_kind(&other)
            )))
        }
    };
    if items.is_empty() {
        return Err(ExamError::EmptyQuestionSet);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let position = idx + 1;
            let record: QuestionRecord =
                serde_json::from_value(item).map_err(|e| ExamError::InvalidRecord {
                    position,
                    reason: e.to_string(),
                })?;
            record
                .validate()
                .map_err(|reason| ExamError::InvalidRecord { position, reason })?;
            Ok(record)
        })
        .collect()
}

pub fn load_question_file<P: AsRef<Path>>(path: P) -> Result<Vec<QuestionRecord>> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_question_set(&contents)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
