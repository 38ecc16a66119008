// Terminal event loop and frame rendering.
//
// Single-threaded: one select loop multiplexes crossterm input with a ~30fps
// render tick. Every key press is applied to `App` before the next frame.

use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tracing::debug;

use crate::app::App;
use crate::input;
use crate::layout::build_layout;
use crate::widgets::{dialog, help_bar, scoring, status_bar, submission};

/// Render the complete grading screen.
pub fn render_frame(frame: &mut Frame, app: &App) {
    let layout = build_layout(frame.area());

    status_bar::render(frame, layout.status_bar, app);
    submission::render(frame, layout.submission, app);
    scoring::render(frame, layout.scoring, app);
    help_bar::render_message(frame, layout.message, app);
    help_bar::render(frame, layout.help_bar, app);

    // Overlays last so they draw on top.
    dialog::render(frame, frame.area(), app);
}

/// Run the TUI event loop until the grader quits.
///
/// 1. Initializes the terminal (raw mode, alternate screen, bracketed paste).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Selects over keyboard/paste events and the render tick.
/// 4. Restores the terminal on exit, including on error.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableBracketedPaste) {
        ratatui::restore();
        return Err(e.into());
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(command) = input::handle_key(key_event, app) {
                            debug!("executing {:?}", command);
                            app.execute(command);
                        }
                        if app.should_quit {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        input::handle_paste(&text, app);
                    }
                    Some(Ok(_)) => {
                        // Mouse, focus, and resize events; resize is picked up
                        // by the next draw.
                    }
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, app)) {
                    break Err(e.into());
                }
            }
        }
    };

    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
