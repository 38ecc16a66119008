// Submission panel: essay prompt, rubric, and the two answer image
// references for the row under the cursor.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.session.current() {
        Some(row) => format!(" Submission {} of {} ", row.position(), row.total),
        None => " Submission ".to_string(),
    };

    let paragraph = Paragraph::new(submission_lines(app))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Build the panel body. Sections are separated by a blank line; the prompt
/// section is left out while the prompt is empty.
pub fn submission_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    let prompt = app.session.essay_prompt();
    if !prompt.is_empty() {
        lines.push(heading("Essay prompt"));
        lines.extend(prompt.lines().map(Line::raw));
        lines.push(Line::raw(""));
    }

    let Some(row) = app.session.current() else {
        let hint = if app.session.table().is_some() {
            "The loaded file has no submissions."
        } else {
            "Press o to open a submission file, e to enter the essay prompt."
        };
        lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
        return lines;
    };

    lines.push(heading("Rubric"));
    lines.extend(row.submission.rubric.lines().map(Line::raw));
    lines.push(Line::raw(""));

    lines.push(heading("Answer image 1"));
    lines.push(image_ref(row.submission.image_ref_1));
    lines.push(Line::raw(""));

    lines.push(heading("Answer image 2"));
    lines.push(image_ref(row.submission.image_ref_2));

    lines
}

fn heading(text: &str) -> Line<'static> {
    Line::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn image_ref(reference: &str) -> Line<'_> {
    if reference.trim().is_empty() {
        Line::styled("(none)", Style::default().fg(Color::DarkGray))
    } else {
        Line::from(Span::styled(
            reference,
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
