// Status bar widget: row counter, loaded file, grading progress gauge.

use grademark_core::Progress;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use crate::app::App;

/// Width of the progress gauge on the right of the bar.
const GAUGE_WIDTH: u16 = 28;

/// Render the status bar into the given area.
///
/// Layout: [row counter | file] ............ [progress gauge]
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let [left, right] =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(GAUGE_WIDTH)]).areas(area);

    let mut spans = vec![Span::styled(
        format!(" {}", row_label(app)),
        Style::default().fg(Color::White),
    )];
    if let Some(path) = &app.last_path {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            path.display().to_string(),
            Style::default().fg(Color::Gray),
        ));
    }
    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, left);

    let progress = app.session.progress();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(progress.ratio())
        .label(progress_label(progress))
        .use_unicode(true);
    frame.render_widget(gauge, right);
}

/// "Row 3/40", or a hint when nothing is loaded.
pub fn row_label(app: &App) -> String {
    match app.session.current() {
        Some(row) => format!("Row {}/{}", row.position(), row.total),
        None if app.session.table().is_some() => "Empty table".to_string(),
        None => "No file loaded (o to open)".to_string(),
    }
}

/// "Graded 5/40"
pub fn progress_label(progress: Progress) -> String {
    format!("Graded {}/{}", progress.graded, progress.total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
