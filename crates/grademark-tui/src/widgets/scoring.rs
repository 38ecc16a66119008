// Scoring panel: tier radio, fine score slider, and the stored score.

use grademark_core::{Score, ScoreEntry, Tier, MAX_SCORE, MIN_SCORE};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match app.session.current() {
        Some(row) => scoring_lines(&row.entry),
        None => vec![Line::styled(
            "Nothing to score",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Scoring "));
    frame.render_widget(paragraph, area);
}

pub fn scoring_lines(entry: &ScoreEntry) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        "Tier (1-5)",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    for (i, tier) in Tier::ALL.iter().enumerate() {
        let selected = entry.tier == Some(*tier);
        let marker = if selected { "(•)" } else { "( )" };
        let style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(
            format!(
                " {marker} {} {:<14}{:>3}",
                i + 1,
                tier.label(),
                tier.default_score()
            ),
            style,
        ));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("Score ({MIN_SCORE}-{MAX_SCORE}, ←/→)"),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let value = entry.fine_value();
    let graded = entry.score.is_graded();
    lines.push(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            slider(value),
            Style::default().fg(if graded { Color::Green } else { Color::DarkGray }),
        ),
        Span::raw(format!(" {value:>2}")),
    ]));

    lines.push(Line::raw(""));
    lines.push(match entry.score {
        Score::Graded(v) => Line::styled(
            format!(" Final score: {v}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Score::Unscored => Line::styled(
            " Not graded yet (0 clears a score)",
            Style::default().fg(Color::DarkGray),
        ),
    });

    lines
}

/// Text slider with one cell per score value: filled up to and including
/// `value`, a knob at `value`, empty after.
pub fn slider(value: u8) -> String {
    let value = value.min(MAX_SCORE);
    (MIN_SCORE..=MAX_SCORE)
        .map(|i| match i.cmp(&value) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
