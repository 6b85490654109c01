pub mod exam;
pub mod results;
pub mod screen;

use examr::QuestionStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    Frame,
};

use crate::App;

/// Draws whichever screen the app is on.
pub fn ui(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

pub fn status_color(status: QuestionStatus) -> Color {
    match status {
        QuestionStatus::Unanswered => Color::Gray,
        QuestionStatus::Answered => Color::Green,
        QuestionStatus::Marked => Color::Magenta,
        QuestionStatus::AnsweredAndMarked => Color::Blue,
    }
}

pub fn status_style(status: QuestionStatus) -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(status_color(status))
        .add_modifier(Modifier::BOLD)
}

const MATH_OPEN: char = '\u{E000}';
const MATH_CLOSE: char = '\u{E001}';

/// Reduces question markup to something readable in a terminal. HTML goes
/// through `html2md`; `$...$` and `$$...$$` math is swapped out first and put
/// back verbatim, so `<` and `>` inside it are never read as tags.
pub fn plain_text(markup: &str) -> String {
    let (shielded, math) = shield_math(markup);
    let mut text = unescape_markdown(&html2md::parse_html(&shielded));
    for (idx, segment) in math.iter().enumerate() {
        text = text.replace(&format!("{MATH_OPEN}{idx}{MATH_CLOSE}"), segment);
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces each math segment with a private-use placeholder. An unmatched
/// `$` is left as text.
fn shield_math(markup: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(markup.len());
    let mut math = Vec::new();
    let mut rest = markup;

    while let Some(start) = rest.find('$') {
        let delim = if rest[start..].starts_with("$$") { "$$" } else { "$" };
        let body = start + delim.len();
        let Some(len) = rest[body..].find(delim) else {
            break;
        };
        let end = body + len + delim.len();
        out.push_str(&rest[..start]);
        out.push_str(&format!("{MATH_OPEN}{}{MATH_CLOSE}", math.len()));
        math.push(rest[start..end].to_string());
        rest = &rest[end..];
    }
    out.push_str(rest);
    (out, math)
}

/// `html2md` escapes markdown punctuation in text (`\*`, `\<`, `1\.`); the
/// terminal shows the plain character.
fn unescape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '\\' && next.is_ascii_punctuation() => {
                out.push(*next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn text_lines(markup: &str, style: Style) -> Vec<Line<'static>> {
    plain_text(markup)
        .lines()
        .map(|line| Line::styled(line.to_string(), style))
        .collect()
}

/// A rectangle of the given percentages, centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_plain_strings() {
        assert_eq!(plain_text("What is 2 + 2?"), "What is 2 + 2?");
    }

    #[test]
    fn test_plain_text_keeps_math_inequalities() {
        assert_eq!(
            plain_text("If $x<3$ and $y>2$, find x"),
            "If $x<3$ and $y>2$, find x"
        );
        assert_eq!(
            plain_text("<p>Evaluate $$\\frac{a}{b} < 1$$ for a_1</p>"),
            "Evaluate $$\\frac{a}{b} < 1$$ for a_1"
        );
    }

    #[test]
    fn test_plain_text_flattens_tables() {
        let markup = "<table><tr><th>Year</th><th>Sales</th></tr><tr><td>2019</td><td>40</td></tr></table>";
        let text = plain_text(markup);
        let year = text.lines().position(|l| l.contains("Year")).unwrap();
        let row = text.lines().position(|l| l.contains("2019")).unwrap();
        assert!(text.lines().nth(year).unwrap().contains("Sales"));
        assert!(text.lines().nth(row).unwrap().contains("40"));
        assert!(row > year);
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_plain_text_decodes_entities_and_breaks() {
        assert_eq!(
            plain_text("Profit &amp; loss<br/>for &lt;= 5 units"),
            "Profit & loss\nfor <= 5 units"
        );
    }

    #[test]
    fn test_plain_text_bare_angle_bracket() {
        assert_eq!(plain_text("a < b"), "a < b");
    }

    #[test]
    fn test_plain_text_unmatched_dollar() {
        assert_eq!(plain_text("costs $5 each"), "costs $5 each");
    }

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, area);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
        assert_eq!(inner.y, 10);
    }
}
