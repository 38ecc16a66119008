// Modal overlays: prompt editor, open-file and jump inputs, quit
// confirmation. Each is drawn centered on top of the main layout.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, Mode};
use crate::layout::centered_rect;

const CURSOR: &str = "▏";

/// Draw the overlay for the current mode, if it has one.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match &app.mode {
        Mode::Normal => {}
        Mode::EditPrompt => {
            let width = area.width.saturating_sub(10).max(20);
            let height = area.height.saturating_sub(6).max(5);
            let mut text = app.session.essay_prompt().to_string();
            text.push_str(CURSOR);
            render_input(frame, area, " Essay prompt (Esc when done) ", &text, width, height);
        }
        Mode::OpenFile { buffer } => {
            let width = area.width.saturating_sub(10).clamp(20, 90);
            render_input(
                frame,
                area,
                " Open submission file ",
                &format!("{buffer}{CURSOR}"),
                width,
                3,
            );
        }
        Mode::Jump { buffer } => {
            let title = format!(" Jump to row (1-{}) ", app.session.len());
            render_input(frame, area, &title, &format!("{buffer}{CURSOR}"), 30, 3);
        }
        Mode::ConfirmQuit => render_confirm_quit(frame, area),
    }
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, text: &str, width: u16, height: u16) {
    let dialog_area = centered_rect(width, height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(text.to_string())
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

fn render_confirm_quit(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(36, 5, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Quit? ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let lines = vec![
        Line::raw("  Unexported scores will be lost."),
        Line::from(vec![
            Span::raw("  Really quit? ("),
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("/"),
            Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(")"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use grademark_core::Config;

    fn draw(app: &App) -> ratatui::Terminal<ratatui::backend::TestBackend> {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), app))
            .unwrap();
        terminal
    }

    fn screen_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn every_mode_renders() {
        let mut app = App::new(Config::default());
        for mode in [
            Mode::Normal,
            Mode::EditPrompt,
            Mode::OpenFile {
                buffer: "in.csv".into(),
            },
            Mode::Jump {
                buffer: "12".into(),
            },
            Mode::ConfirmQuit,
        ] {
            app.mode = mode;
            draw(&app);
        }
    }

    #[test]
    fn confirm_quit_mentions_lost_scores() {
        let mut app = App::new(Config::default());
        app.mode = Mode::ConfirmQuit;
        assert!(screen_text(&draw(&app)).contains("Unexported scores"));
    }

    #[test]
    fn open_file_shows_buffer() {
        let mut app = App::new(Config::default());
        app.mode = Mode::OpenFile {
            buffer: "essays.csv".into(),
        };
        assert!(screen_text(&draw(&app)).contains("essays.csv"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(8, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut app = App::new(Config::default());
        app.mode = Mode::EditPrompt;
        terminal
            .draw(|frame| render(frame, frame.area(), &app))
            .unwrap();
    }
}
