use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::error::{ExamError, Result};
use crate::question::{Question, QuestionStatus};
use crate::scoring::{self, QuestionReview, Results};
use crate::setup::ExamSetup;
use crate::timer::{Scheduler, TickSource, TimerHandle, TimerKind, TimerSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    TimeExpired,
}

/// What a delivered tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale or foreign handle, or the session is not active.
    Ignored,
    Counted,
    /// The global countdown reached zero and the session was submitted.
    Expired,
}

/// Palette legend tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub unanswered: usize,
    pub answered: usize,
    pub marked: usize,
    pub answered_and_marked: usize,
}

/// One timed attempt at a question set.
///
/// Owns the questions, the current-question pointer and both exam timers.
/// All mutation goes through `&mut self`, so a tick can never interleave
/// with a navigation or a status change.
#[derive(Debug)]
pub struct ExamSession<S: Scheduler> {
    pub(crate) questions: Vec<Question>,
    pub(crate) current: usize,
    total_duration_secs: u64,
    time_left_secs: u64,
    pub(crate) question_elapsed_secs: u64,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) timers: TimerSet,
    pub(crate) scheduler: S,
    results: Option<Results>,
    submit_reason: Option<SubmitReason>,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
}

impl<S: Scheduler> ExamSession<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            questions: Vec::new(),
            current: 0,
            total_duration_secs: 0,
            time_left_secs: 0,
            question_elapsed_secs: 0,
            lifecycle: Lifecycle::NotStarted,
            timers: TimerSet::new(),
            scheduler,
            results: None,
            submit_reason: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Moves `NotStarted -> Active`. On error the session is left exactly as
    /// it was.
    pub fn start(&mut self, setup: ExamSetup) -> Result<()> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Err(ExamError::AlreadyStarted);
        }
        let questions = match setup.question_set() {
            Ok(questions) => questions,
            Err(e) => {
                warn!(error = %e, "refusing to start exam");
                return Err(e);
            }
        };

        self.questions = questions;
        self.current = 0;
        self.total_duration_secs = setup.duration_secs;
        self.time_left_secs = setup.duration_secs;
        self.question_elapsed_secs = 0;
        self.lifecycle = Lifecycle::Active;
        self.started_at = Some(Local::now());

        self.timers.start(&mut self.scheduler, TimerKind::Global);
        self.timers.start(&mut self.scheduler, TimerKind::Question);

        info!(
            questions = self.questions.len(),
            duration_secs = self.total_duration_secs,
            difficulty = %setup.difficulty,
            "exam started"
        );
        Ok(())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle == Lifecycle::Finished
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.total_duration_secs
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    /// Seconds on the current visit to the current question (not yet
    /// committed to its `time_spent`).
    pub fn question_elapsed_secs(&self) -> u64 {
        self.question_elapsed_secs
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submit_reason
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn review(&self, index: usize) -> Option<QuestionReview> {
        self.questions
            .get(index)
            .map(|q| QuestionReview::new(index, q))
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.questions
            .iter()
            .fold(StatusCounts::default(), |mut counts, q| {
                match q.status() {
                    QuestionStatus::Unanswered => counts.unanswered += 1,
                    QuestionStatus::Answered => counts.answered += 1,
                    QuestionStatus::Marked => counts.marked += 1,
                    QuestionStatus::AnsweredAndMarked => counts.answered_and_marked += 1,
                }
                counts
            })
    }

    /// Selects (or changes) the answer for the current question. A review
    /// mark survives the selection.
    pub fn select_answer(&mut self, option_index: usize) -> bool {
        let Some(q) = self.current_question_mut() else {
            return false;
        };
        let changed = q.select(option_index);
        if changed {
            debug!(question = q.id, option_index, status = ?q.status(), "answer selected");
        }
        changed
    }

    pub fn clear_response(&mut self) -> bool {
        let Some(q) = self.current_question_mut() else {
            return false;
        };
        q.clear();
        debug!(question = q.id, "response cleared");
        true
    }

    pub fn mark_for_review(&mut self) -> bool {
        let Some(q) = self.current_question_mut() else {
            return false;
        };
        q.mark();
        debug!(question = q.id, status = ?q.status(), "marked for review");
        true
    }

    /// Applies the "save" transition to the current question without moving.
    pub fn save_current(&mut self) -> bool {
        let Some(q) = self.current_question_mut() else {
            return false;
        };
        q.save();
        true
    }

    /// Handles one tick from the scheduler.
    pub fn on_tick(&mut self, handle: TimerHandle) -> TickOutcome {
        if !self.is_active() || !self.timers.is_live(handle) {
            return TickOutcome::Ignored;
        }
        match handle.kind() {
            TimerKind::Global => {
                self.time_left_secs = self.time_left_secs.saturating_sub(1);
                if self.time_left_secs == 0 {
                    info!("time expired, submitting");
                    self.finish(SubmitReason::TimeExpired);
                    return TickOutcome::Expired;
                }
            }
            TimerKind::Question => {
                self.question_elapsed_secs += 1;
            }
        }
        TickOutcome::Counted
    }

    /// Ends the session and computes Results. Calling it again returns the
    /// results computed the first time.
    pub fn submit(&mut self) -> Option<&Results> {
        if self.is_active() {
            self.finish(SubmitReason::Manual);
        }
        self.results.as_ref()
    }

    fn finish(&mut self, reason: SubmitReason) {
        self.timers.stop_all(&mut self.scheduler);
        self.commit_elapsed();
        let results = scoring::score(
            &self.questions,
            self.total_duration_secs,
            self.time_left_secs,
        );
        info!(
            score = results.score,
            correct = results.correct,
            incorrect = results.incorrect,
            unattempted = results.unattempted,
            time_taken_secs = results.time_taken_secs,
            ?reason,
            "exam submitted"
        );
        self.results = Some(results);
        self.submit_reason = Some(reason);
        self.finished_at = Some(Local::now());
        self.lifecycle = Lifecycle::Finished;
    }

    /// Moves the running per-question counter into the current question.
    pub(crate) fn commit_elapsed(&mut self) {
        let elapsed = std::mem::take(&mut self.question_elapsed_secs);
        if let Some(q) = self.questions.get_mut(self.current) {
            q.add_time(elapsed);
        }
    }

    fn current_question_mut(&mut self) -> Option<&mut Question> {
        if !self.is_active() {
            return None;
        }
        self.questions.get_mut(self.current)
    }
}

impl<S: Scheduler + TickSource> ExamSession<S> {
    /// Delivers every tick the scheduler reports as due at `now`. Returns
    /// true if this call finished the session.
    pub fn pump(&mut self, now: Instant) -> bool {
        let due = self.scheduler.due(now);
        due.into_iter()
            .any(|handle| self.on_tick(handle) == TickOutcome::Expired)
    }
}
