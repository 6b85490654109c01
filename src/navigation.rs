//! Moving between questions.
//!
//! Every move goes through [`ExamSession::switch_to`], which commits the
//! outgoing question's elapsed time, moves the pointer and restarts the
//! per-question timer in one `&mut self` call.

use tracing::debug;

use crate::session::ExamSession;
use crate::timer::{Scheduler, TimerKind};

/// Result of a "do something and go to the next question" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// Already on the last question; nothing moved. After a save this is
    /// the cue to offer submission.
    AtLastQuestion,
    /// The session is not active.
    Inactive,
}

impl<S: Scheduler> ExamSession<S> {
    /// Makes `target` the current question. Out-of-range targets and calls
    /// outside an active session are ignored.
    pub fn switch_to(&mut self, target: usize) -> bool {
        if !self.is_active() || target >= self.questions.len() {
            return false;
        }
        let from = self.current;
        self.timers.stop(&mut self.scheduler, TimerKind::Question);
        self.commit_elapsed();
        self.current = target;
        self.timers.start(&mut self.scheduler, TimerKind::Question);
        debug!(from, to = target, "switched question");
        true
    }

    pub fn next_question(&mut self) -> bool {
        self.switch_to(self.current + 1)
    }

    pub fn previous_question(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(target) => self.switch_to(target),
            None => false,
        }
    }

    /// Saves the current question and moves on.
    pub fn save_and_next(&mut self) -> Advance {
        if !self.save_current() {
            return Advance::Inactive;
        }
        self.advance()
    }

    /// Marks the current question for review and moves on. On the last
    /// question only the mark is applied.
    pub fn mark_and_next(&mut self) -> Advance {
        if !self.mark_for_review() {
            return Advance::Inactive;
        }
        self.advance()
    }

    fn advance(&mut self) -> Advance {
        if self.is_last_question() {
            Advance::AtLastQuestion
        } else {
            self.next_question();
            Advance::Moved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{sample_record, Difficulty, QuestionStatus};
    use crate::setup::{DifficultyFilter, ExamSetup};
    use crate::timer::ManualScheduler;
    use std::time::Instant;

    fn started(n: i64) -> ExamSession<ManualScheduler> {
        let mut s = ExamSession::new(ManualScheduler::new());
        s.start(ExamSetup::new(
            (1..=n).map(|id| sample_record(id, Difficulty::Easy)).collect(),
            DifficultyFilter::Mixed,
            600,
        ))
        .unwrap();
        s
    }

    fn tick(s: &mut ExamSession<ManualScheduler>, times: usize) {
        for _ in 0..times {
            s.pump(Instant::now());
        }
    }

    #[test]
    fn test_switch_commits_elapsed_and_resets_counter() {
        let mut s = started(3);
        tick(&mut s, 4);
        assert!(s.switch_to(2));
        assert_eq!(s.current_index(), 2);
        assert_eq!(s.question_elapsed_secs(), 0);
        assert_eq!(s.questions()[0].time_spent(), 4);
    }

    #[test]
    fn test_switch_keeps_single_question_timer() {
        let mut s = started(3);
        s.switch_to(1);
        s.switch_to(2);
        s.switch_to(0);
        assert_eq!(s.scheduler().live_count(TimerKind::Question), 1);
        assert_eq!(s.scheduler().live_count(TimerKind::Global), 1);
        // One question timer per visit plus the global one.
        assert_eq!(s.scheduler().scheduled_total(), 5);
    }

    #[test]
    fn test_revisit_adds_time() {
        let mut s = started(2);
        tick(&mut s, 3);
        s.switch_to(1);
        tick(&mut s, 2);
        s.switch_to(0);
        tick(&mut s, 5);
        s.switch_to(1);
        assert_eq!(s.questions()[0].time_spent(), 8);
        assert_eq!(s.questions()[1].time_spent(), 2);
    }

    #[test]
    fn test_out_of_range_targets_are_noops() {
        let mut s = started(3);
        s.switch_to(1);
        tick(&mut s, 2);
        assert!(!s.switch_to(3));
        assert!(!s.switch_to(usize::MAX));
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.question_elapsed_secs(), 2);
    }

    #[test]
    fn test_previous_at_first_question_is_noop() {
        let mut s = started(2);
        assert!(!s.previous_question());
        assert_eq!(s.current_index(), 0);
        assert!(s.next_question());
        assert!(!s.next_question());
        assert!(s.previous_question());
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn test_save_and_next_moves_and_sets_status() {
        let mut s = started(2);
        s.select_answer(0);
        assert_eq!(s.save_and_next(), Advance::Moved);
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.questions()[0].status(), QuestionStatus::Answered);
    }

    #[test]
    fn test_save_and_next_without_answer_clears_mark() {
        let mut s = started(2);
        s.mark_for_review();
        s.save_and_next();
        assert_eq!(s.questions()[0].status(), QuestionStatus::Unanswered);
    }

    #[test]
    fn test_save_and_next_preserves_answered_and_marked() {
        let mut s = started(2);
        s.select_answer(2);
        s.mark_for_review();
        s.save_and_next();
        assert_eq!(
            s.questions()[0].status(),
            QuestionStatus::AnsweredAndMarked
        );
    }

    #[test]
    fn test_save_and_next_on_last_question_offers_submission() {
        let mut s = started(2);
        s.switch_to(1);
        s.select_answer(0);
        assert_eq!(s.save_and_next(), Advance::AtLastQuestion);
        assert_eq!(s.current_index(), 1);
        assert!(s.is_active());
    }

    #[test]
    fn test_mark_and_next() {
        let mut s = started(2);
        assert_eq!(s.mark_and_next(), Advance::Moved);
        assert_eq!(s.questions()[0].status(), QuestionStatus::Marked);
        s.select_answer(1);
        assert_eq!(s.mark_and_next(), Advance::AtLastQuestion);
        assert_eq!(s.current_index(), 1);
        assert_eq!(
            s.questions()[1].status(),
            QuestionStatus::AnsweredAndMarked
        );
    }

    #[test]
    fn test_navigation_inactive_after_submit() {
        let mut s = started(3);
        s.submit();
        assert!(!s.switch_to(1));
        assert_eq!(s.save_and_next(), Advance::Inactive);
        assert_eq!(s.mark_and_next(), Advance::Inactive);
        assert!(s.scheduler().live().is_empty());
    }
}
