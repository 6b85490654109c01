use ratatui::Frame;

use crate::{
    ui::{exam, results},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Question pane, palette and clocks
pub struct ExamScreen;

impl Screen for ExamScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        exam::render_exam(app, f);
    }
}

/// The exam screen with a submit confirmation on top
pub struct ConfirmScreen;

impl Screen for ConfirmScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        exam::render_exam(app, f);
        if let AppState::ConfirmSubmit(prompt) = app.state {
            exam::render_confirm(app, prompt, f);
        }
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        results::render_results(app, f);
    }
}

pub struct ReviewScreen(pub usize);

impl Screen for ReviewScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        results::render_review(app, self.0, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Exam => Box::new(ExamScreen),
        AppState::ConfirmSubmit(_) => Box::new(ConfirmScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Review(index) => Box::new(ReviewScreen(*index)),
    }
}
