// Export of the graded table.
//
// The output is the loaded table with two columns filled in: the score
// (or the unscored marker) and the session prompt. If the input already has
// a column with either name, its values are overwritten in place rather
// than duplicated. The three required input columns are never overwritten.
//
// Files are written as an `.xlsx` workbook or as CSV, chosen by the target
// extension. CSV files start with a UTF-8 byte order mark.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::config::ExportConfig;
use crate::score::Score;
use crate::session::SessionState;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no submission table is loaded")]
    NoTable,

    #[error("output column {column} would overwrite a required input column")]
    ShadowsInput { column: String },

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write export: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// The augmented table, ready to serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

/// Build the output table from the session.
pub fn build_export(
    session: &SessionState,
    config: &ExportConfig,
) -> Result<ExportTable, ExportError> {
    let table = session.table().ok_or(ExportError::NoTable)?;
    let required = table.required_indices();

    let mut headers = table.headers().to_vec();
    let mut slot = |name: &str| {
        let idx = column_slot(&mut headers, name);
        if required.contains(&idx) {
            return Err(ExportError::ShadowsInput {
                column: name.to_string(),
            });
        }
        Ok(idx)
    };
    let score_idx = slot(&config.score_column)?;
    let prompt_idx = slot(&config.prompt_column)?;

    let rows = table
        .rows()
        .iter()
        .zip(session.scores().entries())
        .map(|(row, entry)| {
            let mut out = row.clone();
            out.resize(headers.len(), String::new());
            out[score_idx] = match entry.score {
                Score::Graded(v) => v.to_string(),
                Score::Unscored => config.unscored_marker.clone(),
            };
            out[prompt_idx] = session.essay_prompt().to_string();
            out
        })
        .collect();

    Ok(ExportTable { headers, rows })
}

/// Write the graded table as CSV. Returns the number of data rows written.
pub fn write_results<W: Write>(
    session: &SessionState,
    config: &ExportConfig,
    writer: W,
) -> Result<usize, ExportError> {
    let export = build_export(session, config)?;
    write_csv(&export, writer)?;
    Ok(export.rows.len())
}

/// Write the graded table to `path`, replacing any existing file. A path
/// ending in `.xlsx` gets a workbook; anything else gets CSV.
pub fn export_to_path(
    session: &SessionState,
    config: &ExportConfig,
    path: &Path,
) -> Result<usize, ExportError> {
    // Built before touching the filesystem so a failure leaves no file.
    let export = build_export(session, config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        write_workbook(&export, path)?;
    } else {
        let io_err = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = std::fs::File::create(path).map_err(io_err)?;
        file.write_all(UTF8_BOM).map_err(io_err)?;
        write_csv(&export, file)?;
    }

    info!("exported {} rows to {}", export.rows.len(), path.display());
    Ok(export.rows.len())
}

/// Write the graded table to a timestamped file in the configured export
/// directory. Returns the path written.
pub fn export_timestamped<Tz>(
    session: &SessionState,
    config: &ExportConfig,
    now: &DateTime<Tz>,
) -> Result<PathBuf, ExportError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let path = timestamped_path(config, now);
    export_to_path(session, config, &path)?;
    Ok(path)
}

/// `<directory>/<file_stem>-<YYYYmmdd-HHMMSS>.<xlsx|csv>`
pub fn timestamped_path<Tz>(config: &ExportConfig, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    config.directory.join(format!(
        "{}-{}.{}",
        config.file_stem,
        now.format("%Y%m%d-%H%M%S"),
        config.format.extension()
    ))
}

fn write_csv<W: Write>(export: &ExportTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&export.headers)?;
    for row in &export.rows {
        wtr.write_record(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Every cell is written as text so values round-trip unchanged.
fn write_workbook(export: &ExportTable, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (r, cells) in std::iter::once(&export.headers)
        .chain(&export.rows)
        .enumerate()
    {
        let row = u32::try_from(r).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (c, cell) in cells.iter().enumerate() {
            let col = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
            sheet.write_string(row, col, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Index of `name` in `headers`, appending it if absent.
fn column_slot(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h == name) {
        Some(idx) => idx,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnsConfig;
    use crate::table::SubmissionTable;
    use chrono::Utc;

    fn columns() -> ColumnsConfig {
        ColumnsConfig {
            image_1: "img1".into(),
            image_2: "img2".into(),
            rubric: "rubric".into(),
        }
    }

    fn session_from(csv: &str) -> SessionState {
        let mut session = SessionState::new();
        session.load_table(SubmissionTable::from_reader(csv.as_bytes(), &columns()).unwrap());
        session
    }

    fn three_rows() -> SessionState {
        session_from("name,img1,img2,rubric\nA,a1,a2,r\nB,b1,b2,r\nC,c1,c2,r\n")
    }

    #[test]
    fn unscored_rows_use_marker_and_prompt_repeats() {
        let mut session = three_rows();
        session.set_prompt("My summer holiday");
        session.jump(2);
        session.set_score(7);

        let export = build_export(&session, &ExportConfig::default()).unwrap();
        assert_eq!(
            export.headers,
            vec!["name", "img1", "img2", "rubric", "score", "prompt"]
        );
        assert_eq!(
            export.column("score").unwrap(),
            vec!["unscored", "7", "unscored"]
        );
        assert_eq!(export.column("prompt").unwrap(), vec!["My summer holiday"; 3]);
        assert_eq!(export.column("name").unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn existing_output_columns_are_overwritten() {
        let mut session = session_from("img1,img2,rubric,score\na,b,c,old\n");
        session.set_score(0);

        let export = build_export(&session, &ExportConfig::default()).unwrap();
        assert_eq!(export.headers, vec!["img1", "img2", "rubric", "score", "prompt"]);
        assert_eq!(export.rows[0], vec!["a", "b", "c", "0", ""]);
    }

    #[test]
    fn custom_marker_and_column_names() {
        let session = three_rows();
        let config = ExportConfig {
            score_column: "得分".into(),
            prompt_column: "作文题目".into(),
            unscored_marker: "未批改".into(),
            ..ExportConfig::default()
        };
        let export = build_export(&session, &config).unwrap();
        assert_eq!(export.column("得分").unwrap(), vec!["未批改"; 3]);
        assert!(export.column("作文题目").is_some());
    }

    #[test]
    fn export_without_table_fails() {
        let session = SessionState::new();
        assert!(matches!(
            build_export(&session, &ExportConfig::default()),
            Err(ExportError::NoTable)
        ));
        let mut buf = Vec::new();
        assert!(matches!(
            write_results(&session, &ExportConfig::default(), &mut buf),
            Err(ExportError::NoTable)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn write_results_emits_csv() {
        let mut session = session_from("img1,img2,rubric\na,b,\"needs, quoting\"\n");
        session.set_prompt("Line one\nLine two");
        session.set_score(15);

        let mut buf = Vec::new();
        let rows = write_results(&session, &ExportConfig::default(), &mut buf).unwrap();
        assert_eq!(rows, 1);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "img1,img2,rubric,score,prompt\na,b,\"needs, quoting\",15,\"Line one\nLine two\"\n"
        );
    }

    #[test]
    fn timestamped_path_format() {
        let config = ExportConfig {
            directory: PathBuf::from("out"),
            file_stem: "results".into(),
            ..ExportConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            timestamped_path(&config, &now),
            PathBuf::from("out").join("results-20260304-050607.xlsx")
        );

        let csv = ExportConfig {
            format: crate::config::ExportFormat::Csv,
            ..config
        };
        assert_eq!(
            timestamped_path(&csv, &now),
            PathBuf::from("out").join("results-20260304-050607.csv")
        );
    }

    #[test]
    fn export_timestamped_creates_directory() {
        let dir = std::env::temp_dir().join("grademark_export_timestamped");
        let _ = std::fs::remove_dir_all(&dir);
        let config = ExportConfig {
            directory: dir.join("nested"),
            format: crate::config::ExportFormat::Csv,
            ..ExportConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let path = export_timestamped(&three_rows(), &config, &now).unwrap();
        assert!(path.starts_with(dir.join("nested")));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn output_column_never_overwrites_required_input() {
        let mut session = session_from("img1,img2,rubric\na,b,c\n");
        session.set_score(9);
        let config = ExportConfig {
            score_column: "rubric".into(),
            ..ExportConfig::default()
        };
        assert!(matches!(
            build_export(&session, &config),
            Err(ExportError::ShadowsInput { ref column }) if column == "rubric"
        ));
    }

    #[test]
    fn failed_build_leaves_no_file() {
        let path = std::env::temp_dir().join("grademark_export_shadow.csv");
        let _ = std::fs::remove_file(&path);
        let config = ExportConfig {
            prompt_column: "img1".into(),
            ..ExportConfig::default()
        };
        assert!(export_to_path(&three_rows(), &config, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn workbook_export_loads_back() {
        let path = std::env::temp_dir().join("grademark_export_book.xlsx");
        let mut session = three_rows();
        session.set_prompt("题目");
        session.jump(3);
        session.set_score(13);

        assert_eq!(
            export_to_path(&session, &ExportConfig::default(), &path).unwrap(),
            3
        );
        let table = SubmissionTable::from_path(&path, &columns()).unwrap();
        assert_eq!(
            table.headers(),
            &["name", "img1", "img2", "rubric", "score", "prompt"]
        );
        assert_eq!(table.rows()[2], vec!["C", "c1", "c2", "r", "13", "题目"]);
        assert_eq!(table.rows()[0][4], "unscored");
    }
}
