// Grading session state and its transitions.
//
// `SessionState` holds everything a grading session knows: the loaded table,
// the score sheet, the cursor, and the essay prompt. Every user action is a
// method that reassigns fields directly; nothing is queued or deferred.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ColumnsConfig;
use crate::score::{Score, ScoreEntry, ScoreSheet, Tier, MAX_SCORE};
use crate::table::{LoadError, Submission, SubmissionTable};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A serialized session that does not describe a usable state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("stored table is invalid: {0}")]
    Table(#[from] LoadError),

    #[error("required column index {index} is out of range for {width} columns")]
    ColumnOutOfRange { index: usize, width: usize },

    #[error("stored required column positions do not match the header row")]
    ColumnMismatch,

    #[error("score sheet has {scores} entries but the table has {rows} rows")]
    ScoreCount { scores: usize, rows: usize },

    #[error("row {row} has score {value}, above the maximum of {max}", max = MAX_SCORE)]
    ScoreOutOfRange { row: usize, value: u8 },
}

// ---------------------------------------------------------------------------
// Outcome / view types
// ---------------------------------------------------------------------------

/// What a successful load did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new table replaced the old one; scores and cursor were reset.
    Replaced { rows: usize },
    /// The table is identical to the one already loaded; nothing changed.
    Unchanged,
}

/// Grading progress for the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub graded: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction of rows graded, in `[0.0, 1.0]`. An empty table is 0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.graded as f64 / self.total as f64
        }
    }
}

/// Everything needed to render the row under the cursor.
#[derive(Debug, Clone, Copy)]
pub struct CurrentRow<'a> {
    /// Zero-based row index.
    pub index: usize,
    pub total: usize,
    pub submission: Submission<'a>,
    pub entry: ScoreEntry,
}

impl CurrentRow<'_> {
    /// One-based position, as shown to the grader.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    /// The value the fine control shows for this row.
    pub fn fine_value(&self) -> u8 {
        self.entry.fine_value()
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The whole state of one grading session.
///
/// Invariants: `scores.len()` equals the table's row count (0 with no
/// table), and `current_index` is a valid row index whenever the table is
/// non-empty (0 otherwise).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct SessionState {
    current_index: usize,
    essay_prompt: String,
    table: Option<SubmissionTable>,
    scores: ScoreSheet,
}

/// Serialized form of a session, checked before it becomes a `SessionState`.
#[derive(Deserialize)]
struct SessionRecord {
    current_index: usize,
    essay_prompt: String,
    table: Option<SubmissionTable>,
    scores: ScoreSheet,
}

impl TryFrom<SessionRecord> for SessionState {
    type Error = StateError;

    /// Rejects a score sheet that does not line up with the table or holds
    /// an out-of-range score. A cursor past the end is clamped to the last
    /// row.
    fn try_from(record: SessionRecord) -> Result<Self, StateError> {
        let rows = record.table.as_ref().map_or(0, SubmissionTable::len);
        if record.scores.len() != rows {
            return Err(StateError::ScoreCount {
                scores: record.scores.len(),
                rows,
            });
        }
        if let Some((row, value)) = record
            .scores
            .entries()
            .iter()
            .enumerate()
            .find_map(|(i, e)| match e.score {
                Score::Graded(v) if v > MAX_SCORE => Some((i + 1, v)),
                _ => None,
            })
        {
            return Err(StateError::ScoreOutOfRange { row, value });
        }

        let current_index = record.current_index.min(rows.saturating_sub(1));
        if current_index != record.current_index {
            warn!(
                "stored cursor {} is past the last row; clamped to {}",
                record.current_index, current_index
            );
        }

        Ok(SessionState {
            current_index,
            essay_prompt: record.essay_prompt,
            table: record.table,
            scores: record.scores,
        })
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&SubmissionTable> {
        self.table.as_ref()
    }

    pub fn scores(&self) -> &ScoreSheet {
        &self.scores
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn essay_prompt(&self) -> &str {
        &self.essay_prompt
    }

    /// Number of rows in the loaded table (0 when nothing is loaded).
    pub fn len(&self) -> usize {
        self.table.as_ref().map_or(0, SubmissionTable::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Load --------------------------------------------------------------

    /// Install a parsed table.
    ///
    /// An identical table leaves the session untouched; anything else
    /// replaces the table, resets every score to unscored, and moves the
    /// cursor back to the first row.
    pub fn load_table(&mut self, table: SubmissionTable) -> LoadOutcome {
        if self.table.as_ref() == Some(&table) {
            debug!("loaded table is identical to the current one; keeping session");
            return LoadOutcome::Unchanged;
        }

        let rows = table.len();
        self.scores = ScoreSheet::unscored(rows);
        self.table = Some(table);
        self.current_index = 0;
        info!("loaded submission table with {} rows", rows);
        LoadOutcome::Replaced { rows }
    }

    /// Parse `path` and install it. On any error the session is unchanged.
    pub fn load_from_path(
        &mut self,
        path: &Path,
        columns: &ColumnsConfig,
    ) -> Result<LoadOutcome, LoadError> {
        let table = SubmissionTable::from_path(path, columns)?;
        Ok(self.load_table(table))
    }

    // -- Prompt ------------------------------------------------------------

    /// Store the essay prompt verbatim.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.essay_prompt = prompt.into();
    }

    // -- Navigation --------------------------------------------------------

    /// Move to the previous row. Returns false (no-op) at the first row.
    pub fn prev(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        debug!("moved to row {}", self.current_index + 1);
        true
    }

    /// Move to the next row. Returns false (no-op) at the last row.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 >= self.len() {
            return false;
        }
        self.current_index += 1;
        debug!("moved to row {}", self.current_index + 1);
        true
    }

    /// Jump to a one-based row position, clamped to `[1, len]`. Returns the
    /// new zero-based index. A no-op when no rows are loaded.
    pub fn jump(&mut self, position: usize) -> usize {
        let len = self.len();
        if len == 0 {
            return self.current_index;
        }
        self.current_index = position.clamp(1, len) - 1;
        debug!("jumped to row {}", self.current_index + 1);
        self.current_index
    }

    // -- Scoring -----------------------------------------------------------

    /// Select a tier for the current row; its default becomes the score.
    pub fn select_tier(&mut self, tier: Tier) -> Option<u8> {
        let score = self.scores.select_tier(self.current_index, tier)?;
        debug!(
            "row {}: tier {:?} -> score {}",
            self.current_index + 1,
            tier,
            score
        );
        Some(score)
    }

    /// Set the current row's fine score (clamped to the valid range).
    pub fn set_score(&mut self, value: u8) -> Option<u8> {
        let score = self.scores.set(self.current_index, value)?;
        debug!("row {}: score {}", self.current_index + 1, score);
        Some(score)
    }

    /// Step the current row's fine score by `delta`.
    pub fn adjust_score(&mut self, delta: i16) -> Option<u8> {
        let score = self.scores.adjust(self.current_index, delta)?;
        debug!("row {}: score {}", self.current_index + 1, score);
        Some(score)
    }

    /// Mark the current row unscored again.
    pub fn clear_score(&mut self) -> bool {
        self.scores.clear(self.current_index)
    }

    // -- Views -------------------------------------------------------------

    pub fn progress(&self) -> Progress {
        Progress {
            graded: self.scores.graded_count(),
            total: self.len(),
        }
    }

    /// The row under the cursor, or `None` when no rows are loaded.
    pub fn current(&self) -> Option<CurrentRow<'_>> {
        let table = self.table.as_ref()?;
        let submission = table.submission(self.current_index)?;
        let entry = self.scores.get(self.current_index).copied()?;
        Some(CurrentRow {
            index: self.current_index,
            total: table.len(),
            submission,
            entry,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
