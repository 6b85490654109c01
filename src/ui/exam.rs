use examr::{
    util::{format_clock, format_marks, format_minutes, option_label},
    QuestionStatus,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    ui::{centered_rect, status_color, status_style, text_lines},
    App, SubmitPrompt,
};

const PALETTE_COLUMNS: usize = 5;
/// Below this the countdown turns red.
const LOW_TIME_SECS: u64 = 300;

pub fn render_exam(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(app, f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(chunks[1]);

    render_question(app, f, body[0]);
    render_palette(app, f, body[1]);

    let hints = Paragraph::new(
        "(1-9) select  (↑/↓) move  (enter) choose  (←/→) prev/next  (s) save & next  (m) mark & next  (c) clear  (x) submit  (esc) quit",
    )
    .style(Style::default().add_modifier(Modifier::ITALIC))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(hints, chunks[2]);
}

fn render_header(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let block = Block::default().borders(Borders::ALL).title(" examr ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let on_question = Paragraph::new(Line::from(vec![
        Span::raw("Time on question: "),
        Span::styled(
            format_minutes(session.question_elapsed_secs()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(on_question, halves[0]);

    let left = session.time_left_secs();
    let clock_style = if left < LOW_TIME_SECS {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let clock = Paragraph::new(Line::from(vec![
        Span::raw("Time left: "),
        Span::styled(format_clock(left), clock_style),
    ]))
    .alignment(Alignment::Right);
    f.render_widget(clock, halves[1]);
}

fn render_question(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Question {} of {} ",
        session.current_index() + 1,
        session.question_count()
    ));

    let Some(question) = session.current_question() else {
        f.render_widget(Paragraph::new("No question loaded").block(block), area);
        return;
    };

    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::styled(
            format!(
                "{} · {} · {}",
                question.section, question.topic, question.difficulty
            ),
            dim,
        ),
        Line::styled(
            format!(
                "Marks: {} / {}",
                format_marks(question.marks_correct),
                format_marks(question.marks_negative)
            ),
            dim,
        ),
        Line::default(),
    ];

    if let Some(context) = &question.context {
        lines.extend(text_lines(context, Style::default().fg(Color::Cyan)));
        lines.push(Line::default());
    }

    lines.extend(text_lines(&question.question_text, bold));
    lines.push(Line::default());

    let selected = question.answer_index();
    for (idx, option) in question.options.iter().enumerate() {
        let cursor = if idx == app.option_cursor { "▶ " } else { "  " };
        let radio = if selected == Some(idx) { "(•)" } else { "( )" };
        let style = match (selected == Some(idx), idx == app.option_cursor) {
            (true, _) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().add_modifier(Modifier::UNDERLINED),
            (false, false) => Style::default(),
        };
        let text = crate::ui::plain_text(option).replace('\n', " ");
        lines.push(Line::styled(
            format!("{cursor}{radio} {}. {text}", option_label(idx)),
            style,
        ));
    }

    lines.push(Line::default());
    let status = question.status();
    lines.push(Line::from(vec![
        Span::raw("Status: "),
        Span::styled(status.label(), Style::default().fg(status_color(status))),
    ]));

    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_palette(app: &App, f: &mut Frame, area: Rect) {
    let session = &app.session;
    let current = session.current_index();

    let mut lines: Vec<Line> = session
        .questions()
        .chunks(PALETTE_COLUMNS)
        .enumerate()
        .map(|(row, chunk)| {
            let spans = chunk
                .iter()
                .enumerate()
                .flat_map(|(col, q)| {
                    let idx = row * PALETTE_COLUMNS + col;
                    let label = if idx == current {
                        format!("[{:>2}]", idx + 1)
                    } else {
                        format!(" {:>2} ", idx + 1)
                    };
                    let mut style = status_style(q.status());
                    if idx == current {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    [Span::styled(label, style), Span::raw(" ")]
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect();

    let counts = session.status_counts();
    lines.push(Line::default());
    for (status, count) in [
        (QuestionStatus::Answered, counts.answered),
        (QuestionStatus::Unanswered, counts.unanswered),
        (QuestionStatus::Marked, counts.marked),
        (QuestionStatus::AnsweredAndMarked, counts.answered_and_marked),
    ] {
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(status_color(status))),
            Span::raw(format!("{}: {count}", status.label())),
        ]));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Questions "))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

pub fn render_confirm(app: &App, prompt: SubmitPrompt, f: &mut Frame) {
    let area = centered_rect(50, 40, f.area());
    let counts = app.session.status_counts();

    let mut lines = vec![Line::styled(
        "Submit the exam?",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if prompt == SubmitPrompt::LastQuestion {
        lines.push(Line::raw("This is the last question."));
    }
    lines.push(Line::default());
    lines.push(Line::raw(format!(
        "Answered: {}  Marked: {}  Not answered: {}",
        counts.answered + counts.answered_and_marked,
        counts.marked + counts.answered_and_marked,
        counts.unanswered + counts.marked
    )));
    lines.push(Line::raw(format!(
        "Time left: {}",
        format_clock(app.session.time_left_secs())
    )));
    lines.push(Line::default());
    lines.push(Line::styled(
        "(y) submit   (n) keep going",
        Style::default().add_modifier(Modifier::ITALIC),
    ));

    let dialog = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}
