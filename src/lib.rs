// Library surface: the exam engine plus the pieces the terminal front end
// and the integration tests share. Rendering lives in the binary.
pub mod app_dirs;
pub mod bank;
pub mod config;
pub mod error;
pub mod navigation;
pub mod question;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod setup;
pub mod telemetry;
pub mod timer;
pub mod util;

pub use error::{ExamError, Result};
pub use navigation::Advance;
pub use question::{Difficulty, Question, QuestionRecord, QuestionStatus};
pub use scoring::{Outcome, QuestionReview, Results};
pub use session::{ExamSession, Lifecycle, StatusCounts, SubmitReason, TickOutcome};
pub use setup::{DifficultyFilter, ExamSetup};
pub use timer::{IntervalScheduler, ManualScheduler, Scheduler, TickSource, TimerKind};
