mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    process,
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use examr::{
    app_dirs::AppDirs,
    bank,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, ExamEvent, FixedTicker, Runner},
    scoring, setup, telemetry, Advance, DifficultyFilter, ExamSession, ExamSetup,
    IntervalScheduler, QuestionRecord,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::info;

/// timed multiple-choice mock exams in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a timed multiple-choice exam from a JSON question list: per-question timing, review marking, negative marking, and a full answer review at the end."
)]
pub struct Cli {
    /// JSON file containing the question list
    #[clap(value_name = "FILE")]
    questions: Option<PathBuf>,

    /// use a built-in question bank instead of a file
    #[clap(long, value_name = "NAME", conflicts_with = "questions")]
    demo: Option<String>,

    /// only include questions of this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyFilter>,

    /// exam duration in minutes
    #[clap(short = 'm', long)]
    minutes: Option<u64>,

    /// submit immediately instead of asking for confirmation
    #[clap(long)]
    no_confirm: bool,

    /// validate the question list and print a summary without starting the exam
    #[clap(long)]
    check: bool,

    /// remember the difficulty, duration and confirmation settings for next time
    #[clap(long)]
    save_defaults: bool,

    /// list the built-in question banks and exit
    #[clap(long)]
    list_banks: bool,
}

impl Cli {
    /// CLI flags win over stored defaults.
    fn settings(&self, defaults: &Config) -> Config {
        Config {
            minutes: self.minutes.unwrap_or(defaults.minutes),
            difficulty: self.difficulty.unwrap_or(defaults.difficulty),
            confirm_submit: defaults.confirm_submit && !self.no_confirm,
        }
    }

    fn load_records(&self) -> examr::Result<Vec<QuestionRecord>> {
        match (&self.questions, &self.demo) {
            (Some(path), _) => setup::load_question_file(path),
            (None, Some(name)) => bank::load(name),
            (None, None) => Err(examr::ExamError::MalformedInput(
                "a question file is mandatory (or pass --demo sample)".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPrompt {
    /// The candidate asked to submit.
    Requested,
    /// Save & Next on the last question.
    LastQuestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Exam,
    ConfirmSubmit(SubmitPrompt),
    Results,
    Review(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Restart,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub setup: ExamSetup,
    pub session: ExamSession<IntervalScheduler>,
    pub state: AppState,
    pub option_cursor: usize,
    pub results_cursor: usize,
    pub confirm_submit: bool,
}

impl App {
    pub fn new(setup: ExamSetup, confirm_submit: bool) -> examr::Result<Self> {
        let mut session = ExamSession::new(IntervalScheduler::new());
        session.start(setup.clone())?;
        Ok(Self {
            setup,
            session,
            state: AppState::Exam,
            option_cursor: 0,
            results_cursor: 0,
            confirm_submit,
        })
    }

    /// Starts a fresh attempt at the same question set.
    pub fn restart(&mut self) -> examr::Result<()> {
        *self = Self::new(self.setup.clone(), self.confirm_submit)?;
        Ok(())
    }

    /// Delivers clock ticks that are due at `now`.
    pub fn on_tick(&mut self, now: Instant) {
        if self.session.pump(now) {
            self.enter_results();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match self.state {
            AppState::Exam => self.handle_exam_key(key),
            AppState::ConfirmSubmit(_) => self.handle_confirm_key(key),
            AppState::Results => return self.handle_results_key(key),
            AppState::Review(_) => self.handle_review_key(key),
        }
        Control::Continue
    }

    fn handle_exam_key(&mut self, key: KeyEvent) {
        let option_count = self
            .session
            .current_question()
            .map_or(0, |q| q.options.len());

        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if self.session.select_answer(idx) {
                    self.option_cursor = idx;
                }
            }
            KeyCode::Up => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.option_cursor + 1 < option_count {
                    self.option_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.session.select_answer(self.option_cursor);
            }
            KeyCode::Left => {
                if self.session.previous_question() {
                    self.sync_option_cursor();
                }
            }
            KeyCode::Right => {
                if self.session.next_question() {
                    self.sync_option_cursor();
                }
            }
            KeyCode::Home => {
                if self.session.switch_to(0) {
                    self.sync_option_cursor();
                }
            }
            KeyCode::End => {
                let last = self.session.question_count().saturating_sub(1);
                if self.session.switch_to(last) {
                    self.sync_option_cursor();
                }
            }
            KeyCode::Char('s') => match self.session.save_and_next() {
                Advance::Moved => self.sync_option_cursor(),
                Advance::AtLastQuestion => self.request_submit(SubmitPrompt::LastQuestion),
                Advance::Inactive => {}
            },
            KeyCode::Char('m') => {
                if self.session.mark_and_next() == Advance::Moved {
                    self.sync_option_cursor();
                }
            }
            KeyCode::Char('c') => {
                self.session.clear_response();
            }
            KeyCode::Char('x') => self.request_submit(SubmitPrompt::Requested),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.submit(),
            KeyCode::Char('n') | KeyCode::Backspace => self.state = AppState::Exam,
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Control {
        let count = self.session.question_count();
        match key.code {
            KeyCode::Up => self.results_cursor = self.results_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.results_cursor + 1 < count {
                    self.results_cursor += 1;
                }
            }
            KeyCode::Home => self.results_cursor = 0,
            KeyCode::End => self.results_cursor = count.saturating_sub(1),
            KeyCode::Enter => self.state = AppState::Review(self.results_cursor),
            KeyCode::Char('r') => return Control::Restart,
            KeyCode::Char('q') => return Control::Quit,
            _ => {}
        }
        Control::Continue
    }

    fn handle_review_key(&mut self, key: KeyEvent) {
        let count = self.session.question_count();
        match (key.code, self.state) {
            (KeyCode::Left, AppState::Review(idx)) if idx > 0 => {
                self.state = AppState::Review(idx - 1);
                self.results_cursor = idx - 1;
            }
            (KeyCode::Right, AppState::Review(idx)) if idx + 1 < count => {
                self.state = AppState::Review(idx + 1);
                self.results_cursor = idx + 1;
            }
            (KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Enter, _) => {
                self.state = AppState::Results;
            }
            _ => {}
        }
    }

    fn request_submit(&mut self, prompt: SubmitPrompt) {
        if self.confirm_submit {
            self.state = AppState::ConfirmSubmit(prompt);
        } else {
            self.submit();
        }
    }

    fn submit(&mut self) {
        self.session.submit();
        self.enter_results();
    }

    fn enter_results(&mut self) {
        self.results_cursor = self.session.current_index();
        self.state = AppState::Results;
    }

    fn sync_option_cursor(&mut self) {
        self.option_cursor = self
            .session
            .current_question()
            .and_then(|q| q.answer_index())
            .unwrap_or(0);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        telemetry::init_tracing(&log_path);
    }

    if cli.list_banks {
        for name in bank::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let store = FileConfigStore::new();
    let settings = cli.settings(&store.load());

    let records = cli.load_records().unwrap_or_else(|e| exit_with(&e));
    let exam_setup = ExamSetup::from_minutes(records, settings.difficulty, settings.minutes);
    // Refuse bad configuration before touching the terminal.
    let questions = exam_setup.question_set().unwrap_or_else(|e| exit_with(&e));

    if cli.save_defaults {
        store.save(&settings)?;
        info!(path = %store.path().display(), "saved defaults");
    }

    if cli.check {
        print_summary(&exam_setup, &questions);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(exam_setup, settings.confirm_submit)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn exit_with(err: &examr::ExamError) -> ! {
    eprintln!("Error: {err}");
    if err.is_input_error() {
        eprintln!("The question list must be a JSON array; `examr --demo sample --check` shows a working one.");
    }
    process::exit(1);
}

fn print_summary(exam_setup: &ExamSetup, questions: &[examr::Question]) {
    println!(
        "{} question(s), difficulty {}, {}",
        questions.len(),
        exam_setup.difficulty,
        examr::util::format_clock(exam_setup.duration_secs)
    );
    let max_score: f64 = questions.iter().map(|q| q.marks_correct).sum();
    println!("maximum score: {}", examr::util::format_marks(max_score));
    let by_difficulty = questions
        .iter()
        .map(|q| q.difficulty.to_string())
        .counts()
        .into_iter()
        .sorted()
        .map(|(difficulty, count)| format!("{difficulty} {count}"))
        .join(", ");
    println!("by difficulty: {by_difficulty}");
    for summary in scoring::section_breakdown(questions) {
        println!("  {}: {}", summary.section, summary.questions);
    }
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui::ui(app, f))?;

        let event = runner.step();
        // Clocks are pumped on every event so key bursts cannot starve them.
        app.on_tick(Instant::now());

        let control = match event {
            ExamEvent::Key(key) => app.handle_key(key),
            ExamEvent::Resize | ExamEvent::Tick => Control::Continue,
        };

        match control {
            Control::Continue => {}
            Control::Restart => app.restart()?,
            Control::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use examr::{Difficulty, Lifecycle, QuestionStatus};
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(confirm: bool) -> App {
        let records = bank::load("sample").unwrap();
        App::new(
            ExamSetup::new(records, DifficultyFilter::Mixed, 600),
            confirm,
        )
        .unwrap()
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui::ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["examr", "questions.json"]);
        assert_eq!(cli.questions, Some(PathBuf::from("questions.json")));
        assert_eq!(cli.demo, None);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.minutes, None);
        assert!(!cli.no_confirm);
        assert!(!cli.check);
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = Cli::parse_from(["examr", "--demo", "sample", "-d", "hard", "-m", "30", "--no-confirm"]);
        let settings = cli.settings(&Config::default());
        assert_eq!(settings.minutes, 30);
        assert_eq!(settings.difficulty, DifficultyFilter::Hard);
        assert!(!settings.confirm_submit);

        let cli = Cli::parse_from(["examr", "--demo", "sample"]);
        let stored = Config {
            minutes: 15,
            difficulty: DifficultyFilter::Easy,
            confirm_submit: true,
        };
        assert_eq!(cli.settings(&stored), stored);
    }

    #[test]
    fn test_cli_file_and_demo_conflict() {
        assert!(Cli::try_parse_from(["examr", "q.json", "--demo", "sample"]).is_err());
    }

    #[test]
    fn test_load_records_requires_source() {
        let cli = Cli::parse_from(["examr"]);
        assert!(cli.load_records().is_err());
        let cli = Cli::parse_from(["examr", "--demo", "sample"]);
        assert!(!cli.load_records().unwrap().is_empty());
    }

    #[test]
    fn test_number_keys_select_options() {
        let mut app = app(true);
        app.handle_key(key(KeyCode::Char('2')));
        let q = app.session.current_question().unwrap();
        assert_eq!(q.answer_index(), Some(1));
        assert_eq!(app.option_cursor, 1);
    }

    #[test]
    fn test_cursor_and_enter_select() {
        let mut app = app(true);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.current_question().unwrap().answer_index(), Some(2));
    }

    #[test]
    fn test_save_and_mark_keys() {
        let mut app = app(true);
        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.session.current_index(), 1);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.session.current_index(), 2);
        let statuses: Vec<_> = app.session.questions().iter().map(|q| q.status()).collect();
        assert_eq!(statuses[0], QuestionStatus::Answered);
        assert_eq!(statuses[1], QuestionStatus::Marked);
    }

    #[test]
    fn test_save_on_last_question_asks_for_confirmation() {
        let mut app = app(true);
        app.handle_key(key(KeyCode::End));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.state, AppState::ConfirmSubmit(SubmitPrompt::LastQuestion));

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Exam);
        assert!(app.session.is_active());

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.lifecycle(), Lifecycle::Finished);
    }

    #[test]
    fn test_no_confirm_submits_immediately() {
        let mut app = app(false);
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Results);
        assert!(app.session.results().is_some());
    }

    #[test]
    fn test_results_review_navigation() {
        let mut app = app(false);
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Home));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Review(1));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.state, AppState::Review(2));
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.results_cursor, 2);
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Control::Restart);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut app = app(false);
        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Char('x')));
        app.restart().unwrap();
        assert_eq!(app.state, AppState::Exam);
        assert!(app.session.is_active());
        assert!(app.session.questions().iter().all(|q| q.answer().is_none()));
    }

    #[test]
    fn test_escape_quits() {
        let mut app = app(true);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Control::Quit);
    }

    #[test]
    fn test_render_exam_screen() {
        let app = app(true);
        let content = rendered(&app);
        assert!(content.contains("Question 1 of"));
        assert!(content.contains("00:10:00"));
    }

    #[test]
    fn test_render_shows_penalty_as_configured() {
        let record = |marks_negative: f64| QuestionRecord {
            id: 1,
            section: "Quant".to_string(),
            topic: "Ratios".to_string(),
            difficulty: Difficulty::Easy,
            question_text: "Pick one".to_string(),
            context: None,
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: "a".to_string(),
            marks_correct: 4.0,
            marks_negative,
        };

        let app = App::new(
            ExamSetup::new(vec![record(0.5)], DifficultyFilter::Mixed, 60),
            true,
        )
        .unwrap();
        assert!(rendered(&app).contains("Marks: +4 / +0.5"));

        let app = App::new(
            ExamSetup::new(vec![record(-1.0)], DifficultyFilter::Mixed, 60),
            true,
        )
        .unwrap();
        assert!(rendered(&app).contains("Marks: +4 / -1"));
    }

    #[test]
    fn test_render_confirm_and_results() {
        let mut app = app(true);
        app.handle_key(key(KeyCode::Char('x')));
        assert!(rendered(&app).contains("Submit the exam?"));
        app.handle_key(key(KeyCode::Char('y')));
        let content = rendered(&app);
        assert!(content.contains("Performance Analysis"));
        app.handle_key(key(KeyCode::Enter));
        assert!(rendered(&app).contains("Review Question"));
    }

    #[test]
    fn test_difficulty_filter_applies() {
        let records = bank::load("sample").unwrap();
        let app = App::new(ExamSetup::new(records, DifficultyFilter::Hard, 60), true).unwrap();
        assert!(app
            .session
            .questions()
            .iter()
            .all(|q| q.difficulty == Difficulty::Hard));
    }
}
