// Application state for the terminal front end.
//
// `App` owns the grading session plus the view-only state the terminal
// needs (input mode, edit buffers, the message line, scroll). Key handling
// in `input` mutates it directly for local changes and returns a `Command`
// for anything that touches the filesystem or ends the program.

use std::path::PathBuf;

use grademark_core::export;
use grademark_core::{Config, LoadError, LoadOutcome, SessionState};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Commands and modes
// ---------------------------------------------------------------------------

/// Actions that leave the in-memory state: file I/O or shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Export,
    Quit,
}

/// Which input surface currently receives key presses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Editing the essay prompt. Edits are applied to the session live.
    EditPrompt,
    /// Typing the path of a submission file.
    OpenFile { buffer: String },
    /// Typing a one-based row number.
    Jump { buffer: String },
    /// Waiting for the grader to confirm quitting.
    ConfirmQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// One-line feedback shown under the main panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub session: SessionState,
    pub config: Config,
    pub mode: Mode,
    pub message: Option<Message>,
    /// Vertical scroll of the submission panel. Reset when the row changes.
    pub scroll: u16,
    /// Path of the most recently loaded file, used to prefill the open dialog.
    pub last_path: Option<PathBuf>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        App {
            session: SessionState::new(),
            config,
            mode: Mode::Normal,
            message: None,
            scroll: 0,
            last_path: None,
            should_quit: false,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Error,
            text: text.into(),
        });
    }

    /// Run a command produced by key handling.
    pub fn execute(&mut self, command: Command) {
        match command {
            Command::Load(path) => self.load_file(path),
            Command::Export => self.export(),
            Command::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
        }
    }

    /// Load a submission file. Errors are reported on the message line and
    /// leave the current session as it was.
    pub fn load_file(&mut self, path: PathBuf) {
        match self.session.load_from_path(&path, &self.config.columns) {
            Ok(LoadOutcome::Replaced { rows }) => {
                self.scroll = 0;
                self.info(format!("Loaded {} submissions from {}", rows, path.display()));
            }
            Ok(LoadOutcome::Unchanged) => {
                self.info(format!("{} is already loaded", path.display()));
            }
            Err(LoadError::Schema { missing }) => {
                self.error(format!(
                    "{} is missing required columns: {}",
                    path.display(),
                    missing.join(", ")
                ));
            }
            Err(e @ LoadError::Read { .. }) => {
                warn!("load of {} failed: {}", path.display(), e);
                self.error(format!("Could not read {}: {}", path.display(), e));
            }
        }
        self.last_path = Some(path);
    }

    /// Export the graded table to a timestamped file.
    pub fn export(&mut self) {
        let now = chrono::Local::now();
        match export::export_timestamped(&self.session, &self.config.export, &now) {
            Ok(path) => self.info(format!("Exported results to {}", path.display())),
            Err(e) => {
                error!("export failed: {}", e);
                self.error(format!("Export failed: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use grademark_core::{ColumnsConfig, ExportConfig};
    use std::fs;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            columns: ColumnsConfig {
                image_1: "a".into(),
                image_2: "b".into(),
                rubric: "r".into(),
            },
            export: ExportConfig {
                directory: dir.join("out"),
                ..ExportConfig::default()
            },
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_reports_rows_and_resets_scroll() {
        let dir = scratch("grademark_app_load");
        let file = dir.join("in.csv");
        fs::write(&file, "a,b,r\n1,2,3\n4,5,6\n").unwrap();

        let mut app = App::new(config(&dir));
        app.scroll = 7;
        app.execute(Command::Load(file.clone()));

        assert_eq!(app.session.len(), 2);
        assert_eq!(app.scroll, 0);
        assert_eq!(app.message.as_ref().unwrap().kind, MessageKind::Info);
        assert_eq!(app.last_path, Some(file));
    }

    #[test]
    fn schema_error_is_shown_and_session_kept() {
        let dir = scratch("grademark_app_schema");
        let good = dir.join("good.csv");
        let bad = dir.join("bad.csv");
        fs::write(&good, "a,b,r\n1,2,3\n").unwrap();
        fs::write(&bad, "a,b\n1,2\n").unwrap();

        let mut app = App::new(config(&dir));
        app.load_file(good);
        app.load_file(bad);

        let message = app.message.unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.contains("missing required columns: r"));
        assert_eq!(app.session.len(), 1);
    }

    #[test]
    fn export_without_table_reports_error() {
        let dir = scratch("grademark_app_export_empty");
        let mut app = App::new(config(&dir));
        app.execute(Command::Export);
        assert_eq!(app.message.unwrap().kind, MessageKind::Error);
        assert!(!dir.join("out").exists());
    }

    #[test]
    fn export_writes_into_configured_directory() {
        let dir = scratch("grademark_app_export");
        let file = dir.join("in.csv");
        fs::write(&file, "a,b,r\n1,2,3\n").unwrap();

        let mut app = App::new(config(&dir));
        app.load_file(file);
        app.session.set_score(11);
        app.export();

        assert_eq!(app.message.as_ref().unwrap().kind, MessageKind::Info);
        let written: Vec<_> = fs::read_dir(dir.join("out")).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn quit_command_sets_flag() {
        let mut app = App::new(Config::default());
        app.execute(Command::Quit);
        assert!(app.should_quit);
    }
}
