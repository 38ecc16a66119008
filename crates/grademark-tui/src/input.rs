// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into session transitions (navigation,
// scoring, prompt edits) applied directly to `App`, or into a `Command` for
// the event loop to execute (load, export, quit).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use grademark_core::Tier;

use crate::app::{App, Command, Mode};

/// Lines moved per scroll key press in the submission panel.
const SCROLL_STEP: u16 = 1;

/// Handle a keyboard event.
///
/// Returns `Some(Command)` when the key press needs the event loop to do
/// I/O or shut down. Returns `None` when it was handled by mutating `App`.
pub fn handle_key(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    // On Windows crossterm emits both Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode.
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(Command::Quit);
    }

    match app.mode {
        Mode::Normal => handle_normal(key_event, app),
        Mode::EditPrompt => handle_edit_prompt(key_event, app),
        Mode::OpenFile { .. } => handle_open_file(key_event, app),
        Mode::Jump { .. } => handle_jump(key_event, app),
        Mode::ConfirmQuit => handle_confirm_quit(key_event, app),
    }
}

/// Handle pasted text (bracketed paste). Only the text-entry modes accept it.
pub fn handle_paste(text: &str, app: &mut App) {
    match &mut app.mode {
        Mode::EditPrompt => {
            let mut prompt = app.session.essay_prompt().to_string();
            prompt.push_str(text);
            app.session.set_prompt(prompt);
        }
        Mode::OpenFile { buffer } => {
            // Paths pasted from a file manager often carry a trailing newline.
            buffer.push_str(text.trim_end_matches(['\r', '\n']));
        }
        Mode::Jump { buffer } => {
            buffer.extend(text.chars().filter(char::is_ascii_digit));
        }
        Mode::Normal | Mode::ConfirmQuit => {}
    }
}

fn handle_normal(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    match key_event.code {
        // Tier radio
        KeyCode::Char(c @ '1'..='5') => {
            let tier = c.to_digit(10).and_then(|d| Tier::from_number(d as u8))?;
            app.session.select_tier(tier);
            None
        }

        // Fine score slider
        KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => {
            app.session.adjust_score(-1);
            None
        }
        KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('l') => {
            app.session.adjust_score(1);
            None
        }
        KeyCode::Char('0') => {
            app.session.clear_score();
            None
        }

        // Navigation
        KeyCode::Char('n') | KeyCode::PageDown => {
            if app.session.next() {
                app.scroll = 0;
            }
            None
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            if app.session.prev() {
                app.scroll = 0;
            }
            None
        }
        KeyCode::Char('g') => {
            if !app.session.is_empty() {
                app.mode = Mode::Jump {
                    buffer: String::new(),
                };
            }
            None
        }

        // Submission panel scrolling
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll = app.scroll.saturating_add(SCROLL_STEP);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll = app.scroll.saturating_sub(SCROLL_STEP);
            None
        }

        // Dialogs
        KeyCode::Char('e') => {
            app.mode = Mode::EditPrompt;
            None
        }
        KeyCode::Char('o') => {
            let buffer = app
                .last_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            app.mode = Mode::OpenFile { buffer };
            None
        }

        KeyCode::Char('x') => Some(Command::Export),

        KeyCode::Esc => {
            app.message = None;
            None
        }

        KeyCode::Char('q') => {
            app.mode = Mode::ConfirmQuit;
            None
        }

        _ => None,
    }
}

/// True for characters typed with Ctrl or Alt held; text fields ignore them.
fn is_chord(key_event: &KeyEvent) -> bool {
    matches!(key_event.code, KeyCode::Char(_))
        && key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Prompt editor: every keystroke updates the session prompt. Enter inserts
/// a newline; Esc closes the editor.
fn handle_edit_prompt(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    if is_chord(&key_event) {
        return None;
    }
    let mut prompt = app.session.essay_prompt().to_string();
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            return None;
        }
        KeyCode::Enter => prompt.push('\n'),
        KeyCode::Tab => prompt.push('\t'),
        KeyCode::Backspace => {
            prompt.pop();
        }
        KeyCode::Char(c) => prompt.push(c),
        _ => return None,
    }
    app.session.set_prompt(prompt);
    None
}

fn handle_open_file(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    if is_chord(&key_event) {
        return None;
    }
    let Mode::OpenFile { buffer } = &mut app.mode else {
        return None;
    };
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            None
        }
        KeyCode::Enter => {
            let path = buffer.trim().to_string();
            app.mode = Mode::Normal;
            if path.is_empty() {
                None
            } else {
                Some(Command::Load(PathBuf::from(path)))
            }
        }
        KeyCode::Backspace => {
            buffer.pop();
            None
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            None
        }
        _ => None,
    }
}

fn handle_jump(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    if is_chord(&key_event) {
        return None;
    }
    let Mode::Jump { buffer } = &mut app.mode else {
        return None;
    };
    match key_event.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            // The buffer holds digits only, so a parse failure on a
            // non-empty buffer is an overflow: clamp to the last row.
            let target = match buffer.parse::<usize>() {
                Ok(position) => Some(position),
                Err(_) if !buffer.is_empty() => Some(usize::MAX),
                Err(_) => None,
            };
            app.mode = Mode::Normal;
            if let Some(position) = target {
                let before = app.session.current_index();
                if app.session.jump(position) != before {
                    app.scroll = 0;
                }
            }
        }
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            buffer.push(c);
        }
        _ => {}
    }
    None
}

/// Quit confirmation: `y`/`q` confirm, `n`/Esc cancel, everything else is
/// swallowed.
fn handle_confirm_quit(key_event: KeyEvent, app: &mut App) -> Option<Command> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(Command::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
