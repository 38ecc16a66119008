// Library root: the grading session model, table loading, export, and
// configuration. The terminal front end lives in `grademark-tui`.

pub mod config;
pub mod export;
pub mod score;
pub mod session;
pub mod table;

pub use config::{ColumnsConfig, Config, ConfigError, ExportConfig, ExportFormat};
pub use export::{ExportError, ExportTable};
pub use score::{Score, ScoreEntry, ScoreSheet, Tier, MAX_SCORE, MIN_SCORE};
pub use session::{CurrentRow, LoadOutcome, Progress, SessionState, StateError};
pub use table::{LoadError, ReadError, Submission, SubmissionTable};
