// Submission table loading: CSV and workbook parsing plus required-column
// validation.
//
// A submission file is a header row followed by one row per student. Three
// named columns are required (two answer image references and the rubric);
// every other column is carried along untouched so it can be written back
// out on export. Files ending in a spreadsheet extension (`.xlsx`, `.xls`,
// `.xlsm`, `.xlsb`, `.ods`) are read from their first worksheet; anything
// else is parsed as CSV.

use std::io::Read;
use std::path::Path;

use calamine::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ColumnsConfig;
use crate::session::StateError;

/// Extensions opened through the workbook reader instead of the CSV parser.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    /// One or more required columns are absent from the header row.
    #[error("file is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The file could not be opened or is not a well-formed table.
    #[error("failed to read submission file: {source}")]
    Read {
        #[source]
        source: ReadError,
    },
}

/// Why a submission file could not be read.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("row {row} has {found} fields, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
}

impl From<ReadError> for LoadError {
    fn from(source: ReadError) -> Self {
        LoadError::Read { source }
    }
}

impl From<csv::Error> for LoadError {
    fn from(source: csv::Error) -> Self {
        ReadError::from(source).into()
    }
}

impl From<calamine::Error> for LoadError {
    fn from(source: calamine::Error) -> Self {
        ReadError::from(source).into()
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Borrowed view of one student's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission<'a> {
    pub image_ref_1: &'a str,
    pub image_ref_2: &'a str,
    pub rubric: &'a str,
}

/// Column positions of the required fields within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct RequiredColumns {
    image_1: usize,
    image_2: usize,
    rubric: usize,
}

impl RequiredColumns {
    fn indices(&self) -> [usize; 3] {
        [self.image_1, self.image_2, self.rubric]
    }
}

/// An immutable, ordered table of submissions.
///
/// Rows are stored as raw cell strings in header order, so extra columns
/// survive a load/export cycle unchanged. Every row has exactly
/// `headers.len()` cells. Deserialization re-checks both of these and the
/// required column positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRecord")]
pub struct SubmissionTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    required: RequiredColumns,
}

/// Serialized form of a table, checked before it becomes a `SubmissionTable`.
#[derive(Deserialize)]
struct TableRecord {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    required: RequiredColumns,
}

impl TryFrom<TableRecord> for SubmissionTable {
    type Error = StateError;

    fn try_from(record: TableRecord) -> Result<Self, StateError> {
        let width = record.headers.len();
        let name = |index: usize| {
            record
                .headers
                .get(index)
                .map(|h| h.trim().to_string())
                .ok_or(StateError::ColumnOutOfRange { index, width })
        };
        let columns = ColumnsConfig {
            image_1: name(record.required.image_1)?,
            image_2: name(record.required.image_2)?,
            rubric: name(record.required.rubric)?,
        };

        let stored = record.required;
        let table = SubmissionTable::from_records(record.headers, record.rows, &columns)?;
        // Header lookup takes the first match, so a stored position that
        // points at a later duplicate would disagree with a fresh load.
        if table.required != stored {
            return Err(StateError::ColumnMismatch);
        }
        Ok(table)
    }
}

impl SubmissionTable {
    /// Build a table from already-split records.
    ///
    /// Fails with `LoadError::Schema` when a required column is missing.
    /// Rows whose width differs from the header row are rejected as a read
    /// error, mirroring what the CSV reader does for ragged input.
    pub fn from_records(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        columns: &ColumnsConfig,
    ) -> Result<Self, LoadError> {
        let required = locate_required(&headers, columns)?;

        if let Some((line, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(ReadError::RowWidth {
                row: line + 1,
                found: row.len(),
                expected: headers.len(),
            }
            .into());
        }

        Ok(SubmissionTable {
            headers,
            rows,
            required,
        })
    }

    /// Parse a CSV stream with a header row. A leading UTF-8 byte order mark
    /// is skipped by the reader.
    pub fn from_reader<R: Read>(rdr: R, columns: &ColumnsConfig) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        // Check the schema before reading the body so a wrong file fails fast
        // with the more useful error.
        let required = locate_required(&headers, columns)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(
            "parsed submission table: {} columns, {} rows",
            headers.len(),
            rows.len()
        );

        Ok(SubmissionTable {
            headers,
            rows,
            required,
        })
    }

    /// Read the first worksheet of a spreadsheet file. Every cell is taken
    /// as its displayed text; empty cells become empty strings.
    pub fn from_workbook(path: &Path, columns: &ColumnsConfig) -> Result<Self, LoadError> {
        let mut workbook = calamine::open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ReadError::NoWorksheet)??;

        let mut cells = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
        let headers = cells.next().unwrap_or_default();
        let rows: Vec<Vec<String>> = cells.collect();

        debug!(
            "parsed workbook {}: {} columns, {} rows",
            path.display(),
            headers.len(),
            rows.len()
        );
        Self::from_records(headers, rows, columns)
    }

    /// Open and parse a submission file, picking the reader by extension.
    pub fn from_path(path: &Path, columns: &ColumnsConfig) -> Result<Self, LoadError> {
        let result = if is_workbook(path) {
            Self::from_workbook(path, columns)
        } else {
            std::fs::File::open(path)
                .map_err(|e| LoadError::from(csv::Error::from(e)))
                .and_then(|file| Self::from_reader(file, columns))
        };
        result.inspect_err(|e| {
            warn!("rejected submission file {}: {}", path.display(), e);
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Positions of the image and rubric columns, in that order.
    pub(crate) fn required_indices(&self) -> [usize; 3] {
        self.required.indices()
    }

    /// The submission at `index`, or `None` past the end.
    pub fn submission(&self, index: usize) -> Option<Submission<'_>> {
        let row = self.rows.get(index)?;
        Some(Submission {
            image_ref_1: &row[self.required.image_1],
            image_ref_2: &row[self.required.image_2],
            rubric: &row[self.required.rubric],
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when `path` has a spreadsheet extension (case-insensitive).
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Find each required column by name. Header cells are compared after
/// trimming surrounding whitespace; the first match wins.
fn locate_required(
    headers: &[String],
    columns: &ColumnsConfig,
) -> Result<RequiredColumns, LoadError> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let image_1 = find(&columns.image_1);
    let image_2 = find(&columns.image_2);
    let rubric = find(&columns.rubric);

    match (image_1, image_2, rubric) {
        (Some(image_1), Some(image_2), Some(rubric)) => Ok(RequiredColumns {
            image_1,
            image_2,
            rubric,
        }),
        _ => {
            let missing = [
                (image_1, &columns.image_1),
                (image_2, &columns.image_2),
                (rubric, &columns.rubric),
            ]
            .into_iter()
            .filter(|(pos, _)| pos.is_none())
            .map(|(_, name)| name.clone())
            .collect();
            Err(LoadError::Schema { missing })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
