use examr::{
    scoring::section_breakdown,
    util::{format_marks, format_minutes, format_time_detail, option_label},
    Outcome, QuestionReview, SubmitReason,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::{
    ui::{plain_text, text_lines},
    App,
};

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Correct => "Correct",
        Outcome::Incorrect => "Wrong",
        Outcome::Skipped => "Skipped",
    }
}

fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::Correct => Color::Green,
        Outcome::Incorrect => Color::Red,
        Outcome::Skipped => Color::Gray,
    }
}

fn answer_cell(index: Option<usize>, fallback: &str) -> String {
    index.map_or_else(|| fallback.to_string(), option_label)
}

pub fn render_results(app: &App, f: &mut Frame) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(6), // summary
            Constraint::Min(5),    // per-question table
            Constraint::Length(1), // instructions
        ])
        .split(f.area());

    let reason = match session.submit_reason() {
        Some(SubmitReason::TimeExpired) => "Time expired, exam submitted automatically",
        Some(SubmitReason::Manual) => "Exam submitted",
        None => "",
    };
    let window = match (session.started_at(), session.finished_at()) {
        (Some(start), Some(end)) => format!(
            "   (started {}, finished {})",
            start.format("%H:%M:%S"),
            end.format("%H:%M:%S")
        ),
        _ => String::new(),
    };
    let title = Paragraph::new(Line::styled(
        format!("{reason}{window}"),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Performance Analysis "),
    );
    f.render_widget(title, chunks[0]);

    let Some(results) = session.results() else {
        let empty = Paragraph::new("No results available.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, chunks[1]);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut summary = vec![
        Line::from(vec![
            Span::raw("Score: "),
            Span::styled(format_marks(results.score), bold),
            Span::raw("   Accuracy: "),
            Span::styled(format!("{:.1}%", results.accuracy_percent()), bold),
            Span::raw("   Avg time / question: "),
            Span::styled(
                format_time_detail(results.avg_time_per_question_secs(session.question_count())),
                bold,
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("Correct: {}", results.correct),
                Style::default().fg(Color::Green),
            ),
            Span::raw("   "),
            Span::styled(
                format!("Wrong: {}", results.incorrect),
                Style::default().fg(Color::Red),
            ),
            Span::raw(format!(
                "   Skipped: {}   Time taken: {}",
                results.unattempted,
                format_minutes(results.time_taken_secs)
            )),
        ]),
    ];
    for section in section_breakdown(session.questions()) {
        summary.push(Line::styled(
            format!(
                "{}: {} ({} of {} correct, {})",
                section.section,
                format_marks(section.score),
                section.correct,
                section.questions,
                format_minutes(section.time_spent_secs)
            ),
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(
        Paragraph::new(summary).wrap(Wrap { trim: true }),
        chunks[1],
    );

    let header = Row::new(vec![
        Cell::from("Q.No"),
        Cell::from("Section"),
        Cell::from("Your answer"),
        Cell::from("Correct"),
        Cell::from("Time"),
        Cell::from("Result"),
        Cell::from("Marks"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    // Keep the cursor row on screen.
    let table_height = chunks[2].height.saturating_sub(3) as usize; // borders + header
    let offset = (app.results_cursor + 1).saturating_sub(table_height);

    let rows: Vec<Row> = (0..session.question_count())
        .filter_map(|idx| session.review(idx))
        .skip(offset)
        .take(table_height)
        .map(|review| {
            let row = Row::new(vec![
                Cell::from((review.position + 1).to_string()),
                Cell::from(review.section.clone()),
                Cell::from(answer_cell(review.chosen_index, "-")),
                Cell::from(answer_cell(review.correct_index, "?")),
                Cell::from(format_time_detail(review.time_spent_secs)),
                Cell::from(outcome_label(review.outcome))
                    .style(Style::default().fg(outcome_color(review.outcome))),
                Cell::from(format_marks(review.marks_awarded)),
            ]);
            if review.position == app.results_cursor {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(6),  // Q.No
        Constraint::Min(12),    // Section
        Constraint::Length(12), // Your answer
        Constraint::Length(8),  // Correct
        Constraint::Length(8),  // Time
        Constraint::Length(8),  // Result
        Constraint::Length(6),  // Marks
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Questions "))
        .column_spacing(2);
    f.render_widget(table, chunks[2]);

    let instructions =
        Paragraph::new("(↑/↓) move  (enter) review  (r) retake  (q/esc) quit")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::ITALIC));
    f.render_widget(instructions, chunks[3]);
}

pub fn render_review(app: &App, index: usize, f: &mut Frame) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    let block = Block::default().borders(Borders::ALL).title(format!(
        " Review Question {} of {} ",
        index + 1,
        session.question_count()
    ));

    match session.review(index) {
        Some(review) => {
            let widget = Paragraph::new(review_lines(&review))
                .block(block)
                .wrap(Wrap { trim: false });
            f.render_widget(widget, chunks[0]);
        }
        None => f.render_widget(Paragraph::new("No such question").block(block), chunks[0]),
    }

    let instructions = Paragraph::new("(←/→) previous/next  (b) back to results  (esc) quit")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::ITALIC));
    f.render_widget(instructions, chunks[1]);
}

fn review_lines(review: &QuestionReview) -> Vec<Line<'static>> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut lines = vec![
        Line::styled(
            format!(
                "{} · {} · {}",
                review.section, review.topic, review.difficulty
            ),
            dim,
        ),
        Line::default(),
    ];

    if let Some(context) = &review.context {
        lines.extend(text_lines(context, Style::default().fg(Color::Cyan)));
        lines.push(Line::default());
    }
    lines.extend(text_lines(
        &review.question_text,
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::default());

    for (idx, option) in review.options.iter().enumerate() {
        let is_correct = review.correct_index == Some(idx);
        let is_chosen = review.chosen_index == Some(idx);
        let (mark, style) = match (is_correct, is_chosen) {
            (true, _) => ("✓", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            (false, true) => ("✗", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            (false, false) => (" ", Style::default()),
        };
        lines.push(Line::styled(
            format!(
                "{mark} {}. {}",
                option_label(idx),
                plain_text(option).replace('\n', " ")
            ),
            style,
        ));
    }

    lines.push(Line::default());
    lines.push(Line::raw(format!(
        "Your answer: {}",
        review
            .chosen_answer
            .as_deref()
            .map_or_else(|| "not answered".to_string(), plain_text)
    )));
    lines.push(Line::raw(format!(
        "Correct answer: {}",
        plain_text(&review.correct_answer)
    )));
    lines.push(Line::from(vec![
        Span::raw("Result: "),
        Span::styled(
            format!(
                "{} ({})",
                outcome_label(review.outcome),
                format_marks(review.marks_awarded)
            ),
            Style::default().fg(outcome_color(review.outcome)),
        ),
    ]));
    lines.push(Line::raw(format!(
        "Time spent: {}",
        format_time_detail(review.time_spent_secs)
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_cell() {
        assert_eq!(answer_cell(Some(2), "-"), "C");
        assert_eq!(answer_cell(None, "-"), "-");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(Outcome::Incorrect), "Wrong");
        assert_eq!(outcome_color(Outcome::Correct), Color::Green);
    }
}
