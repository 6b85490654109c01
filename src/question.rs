use serde::{Deserialize, Serialize};

/// Author-assigned difficulty of a single question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Display status of a question, as shown in the palette.
///
/// Derived from two independent bits (has an answer, marked for review).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    Unanswered,
    Answered,
    Marked,
    AnsweredAndMarked,
}

impl QuestionStatus {
    pub fn from_flags(has_answer: bool, marked: bool) -> Self {
        match (has_answer, marked) {
            (false, false) => QuestionStatus::Unanswered,
            (true, false) => QuestionStatus::Answered,
            (false, true) => QuestionStatus::Marked,
            (true, true) => QuestionStatus::AnsweredAndMarked,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionStatus::Unanswered => "Not answered",
            QuestionStatus::Answered => "Answered",
            QuestionStatus::Marked => "Marked for review",
            QuestionStatus::AnsweredAndMarked => "Answered & marked",
        }
    }
}

/// A question as supplied by the setup input, before normalization.
///
/// Text, context and options are opaque markup/math strings and are never
/// interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub section: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub marks_correct: f64,
    pub marks_negative: f64,
}

impl QuestionRecord {
    /// Checks the shape constraints a record must satisfy before it may be
    /// turned into a session question.
    pub fn validate(&self) -> Result<(), String> {
        if self.question_text.trim().is_empty() {
            return Err("missing question_text".to_string());
        }
        if self.options.len() < 2 {
            return Err(format!(
                "needs at least 2 options, found {}",
                self.options.len()
            ));
        }
        if !self.options.iter().any(|o| *o == self.correct_answer) {
            return Err(format!(
                "correct_answer {:?} is not one of the options",
                self.correct_answer
            ));
        }
        Ok(())
    }
}

/// An exam item together with its per-session state.
///
/// The session fields are private: only the session engine mutates them.
/// The chosen answer is stored as an option index so the answer text and
/// its position can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: i64,
    pub section: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_text: String,
    pub context: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub marks_correct: f64,
    pub marks_negative: f64,
    selection: Option<usize>,
    marked: bool,
    time_spent: u64,
}

impl From<QuestionRecord> for Question {
    fn from(r: QuestionRecord) -> Self {
        Self {
            id: r.id,
            section: r.section,
            topic: r.topic,
            difficulty: r.difficulty,
            question_text: r.question_text,
            context: r.context,
            options: r.options,
            correct_answer: r.correct_answer,
            marks_correct: r.marks_correct,
            marks_negative: r.marks_negative,
            selection: None,
            marked: false,
            time_spent: 0,
        }
    }
}

impl Question {
    pub fn answer(&self) -> Option<&str> {
        self.selection
            .and_then(|idx| self.options.get(idx))
            .map(String::as_str)
    }

    pub fn answer_index(&self) -> Option<usize> {
        self.selection
    }

    pub fn has_answer(&self) -> bool {
        self.selection.is_some()
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn status(&self) -> QuestionStatus {
        QuestionStatus::from_flags(self.has_answer(), self.marked)
    }

    /// Accumulated seconds spent on this question, across all visits.
    pub fn time_spent(&self) -> u64 {
        self.time_spent
    }

    /// Position of the correct option, if it is among the options.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }

    pub fn is_correct(&self) -> bool {
        self.answer() == Some(self.correct_answer.as_str())
    }

    pub(crate) fn select(&mut self, option_index: usize) -> bool {
        if option_index >= self.options.len() {
            return false;
        }
        self.selection = Some(option_index);
        true
    }

    /// "Save" keeps an answered question as it is and drops a stray review
    /// mark from one without an answer.
    pub(crate) fn save(&mut self) {
        if !self.has_answer() {
            self.marked = false;
        }
    }

    pub(crate) fn mark(&mut self) {
        self.marked = true;
    }

    pub(crate) fn clear(&mut self) {
        self.selection = None;
        self.marked = false;
    }

    pub(crate) fn add_time(&mut self, secs: u64) {
        self.time_spent = self.time_spent.saturating_add(secs);
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: i64, difficulty: Difficulty) -> QuestionRecord {
    QuestionRecord {
        id,
        section: "Quantitative Aptitude".to_string(),
        topic: "Fractions".to_string(),
        difficulty,
        question_text: format!("Question {id}: find $\\sqrt{{4}} + \\frac{{1}}{{2}}$."),
        context: None,
        options: vec![
            "2.5".to_string(),
            "3".to_string(),
            "4".to_string(),
            "4.5".to_string(),
        ],
        correct_answer: "2.5".to_string(),
        marks_correct: 4.0,
        marks_negative: -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::from(sample_record(1, Difficulty::Easy))
    }

    #[test]
    fn test_from_record_normalizes_session_fields() {
        let q = question();
        assert_eq!(q.answer(), None);
        assert_eq!(q.answer_index(), None);
        assert_eq!(q.status(), QuestionStatus::Unanswered);
        assert_eq!(q.time_spent(), 0);
        assert!(!q.is_marked());
    }

    #[test]
    fn test_status_from_flags() {
        assert_eq!(
            QuestionStatus::from_flags(false, false),
            QuestionStatus::Unanswered
        );
        assert_eq!(QuestionStatus::from_flags(true, false), QuestionStatus::Answered);
        assert_eq!(QuestionStatus::from_flags(false, true), QuestionStatus::Marked);
        assert_eq!(
            QuestionStatus::from_flags(true, true),
            QuestionStatus::AnsweredAndMarked
        );
    }

    #[test]
    fn test_select_keeps_answer_and_index_consistent() {
        let mut q = question();
        assert!(q.select(2));
        assert_eq!(q.answer_index(), Some(2));
        assert_eq!(q.answer(), Some("4"));
        assert_eq!(q.options[q.answer_index().unwrap()], q.answer().unwrap());
    }

    #[test]
    fn test_select_out_of_range_is_rejected() {
        let mut q = question();
        assert!(!q.select(4));
        assert_eq!(q.answer(), None);
    }

    #[test]
    fn test_select_while_marked_keeps_mark() {
        let mut q = question();
        q.mark();
        assert_eq!(q.status(), QuestionStatus::Marked);
        q.select(0);
        assert_eq!(q.status(), QuestionStatus::AnsweredAndMarked);
    }

    #[test]
    fn test_save_without_answer_drops_mark() {
        let mut q = question();
        q.mark();
        q.save();
        assert_eq!(q.status(), QuestionStatus::Unanswered);
    }

    #[test]
    fn test_save_with_answer_preserves_mark() {
        let mut q = question();
        q.select(1);
        q.mark();
        q.save();
        assert_eq!(q.status(), QuestionStatus::AnsweredAndMarked);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut q = question();
        q.clear();
        assert_eq!(q.status(), QuestionStatus::Unanswered);
        q.select(0);
        q.mark();
        q.clear();
        q.clear();
        assert_eq!(q.status(), QuestionStatus::Unanswered);
        assert_eq!(q.answer(), None);
        assert_eq!(q.answer_index(), None);
    }

    #[test]
    fn test_correctness_and_correct_index() {
        let mut q = question();
        assert_eq!(q.correct_index(), Some(0));
        assert!(!q.is_correct());
        q.select(0);
        assert!(q.is_correct());
        q.select(3);
        assert!(!q.is_correct());
    }

    #[test]
    fn test_add_time_accumulates() {
        let mut q = question();
        q.add_time(5);
        q.add_time(7);
        assert_eq!(q.time_spent(), 12);
    }

    #[test]
    fn test_record_validation() {
        assert!(sample_record(1, Difficulty::Easy).validate().is_ok());

        let mut r = sample_record(1, Difficulty::Easy);
        r.question_text = "   ".into();
        assert_eq!(r.validate().unwrap_err(), "missing question_text");

        let mut r = sample_record(1, Difficulty::Easy);
        r.options.truncate(1);
        assert!(r.validate().unwrap_err().contains("at least 2 options"));

        let mut r = sample_record(1, Difficulty::Easy);
        r.correct_answer = "7".into();
        assert!(r.validate().unwrap_err().contains("not one of the options"));
    }

    #[test]
    fn test_status_serializes_with_wire_names() {
        let json = serde_json::to_string(&QuestionStatus::AnsweredAndMarked).unwrap();
        assert_eq!(json, "\"answeredAndMarked\"");
        let json = serde_json::to_string(&QuestionStatus::Unanswered).unwrap();
        assert_eq!(json, "\"unanswered\"");
    }

    #[test]
    fn test_record_deserializes_without_context() {
        let json = r#"{
            "id": 7,
            "section": "Verbal",
            "topic": "Synonyms",
            "difficulty": "Medium",
            "question_text": "Pick the synonym of <b>rapid</b>.",
            "options": ["slow", "quick"],
            "correct_answer": "quick",
            "marks_correct": 3,
            "marks_negative": -0.5
        }"#;
        let r: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, 7);
        assert_eq!(r.difficulty, Difficulty::Medium);
        assert_eq!(r.context, None);
        assert_eq!(r.marks_negative, -0.5);
    }
}
