//! Error types for setting up and running an exam session.
//!
//! Everything here is a configuration-time failure: the engine refuses to
//! start and stays untouched. Runtime misuse (out-of-range navigation,
//! double submission) is not an error and never reaches this type.

use thiserror::Error;

use crate::setup::DifficultyFilter;

/// Errors raised while loading input or starting a session.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The question list had no entries.
    #[error("no questions supplied; paste or load at least one question")]
    EmptyQuestionSet,

    /// The configured duration was not positive.
    #[error("invalid duration: {0}s (the exam needs at least one second)")]
    InvalidDuration(u64),

    /// Difficulty filtering removed every question.
    #[error("no questions found for difficulty: {0}")]
    NoQuestionsForDifficulty(DifficultyFilter),

    /// The input was not shaped like a question list.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A single record failed validation. `position` is 1-based.
    #[error("question #{position} is invalid: {reason}")]
    InvalidRecord { position: usize, reason: String },

    /// `start` was called on a session that already left `NotStarted`.
    #[error("session already started")]
    AlreadyStarted,

    /// Requested a built-in bank that does not exist.
    #[error("unknown question bank: {0}")]
    UnknownBank(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExamError {
    /// Returns `true` for errors caused by the supplied question data rather
    /// than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExamError::EmptyQuestionSet
                | ExamError::NoQuestionsForDifficulty(_)
                | ExamError::MalformedInput(_)
                | ExamError::InvalidRecord { .. }
                | ExamError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExamError>;
