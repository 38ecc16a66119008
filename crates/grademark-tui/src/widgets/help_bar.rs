// Help bar and message line.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, MessageKind, Mode};

/// Render the key hints for the current mode.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(&app.mode),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Render the last load/export outcome, if any.
pub fn render_message(frame: &mut Frame, area: Rect, app: &App) {
    let Some(message) = &app.message else {
        return;
    };
    let color = match message.kind {
        MessageKind::Info => Color::Green,
        MessageKind::Error => Color::Red,
    };
    let paragraph = Paragraph::new(Line::styled(
        format!(" {}", message.text),
        Style::default().fg(color),
    ));
    frame.render_widget(paragraph, area);
}

pub fn help_text(mode: &Mode) -> &'static str {
    match mode {
        Mode::Normal => {
            " 1-5:Tier | ←/→:Score | 0:Clear | n/p:Next/Prev | g:Jump | e:Prompt | o:Open | x:Export | q:Quit"
        }
        Mode::EditPrompt => " Type the essay prompt | Enter:Newline | Esc:Done",
        Mode::OpenFile { .. } => " Path to a .csv or .xlsx file | Enter:Load | Esc:Cancel",
        Mode::Jump { .. } => " Row number | Enter:Go | Esc:Cancel",
        Mode::ConfirmQuit => " y:Quit | n:Stay",
    }
}
