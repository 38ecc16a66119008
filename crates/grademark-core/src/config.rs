// Configuration loading and parsing (grademark.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name of the configuration file inside `config/` or the platform
/// config directory.
pub const CONFIG_FILE_NAME: &str = "grademark.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level configuration. Every section and field is optional in the
/// file; omitted values take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub columns: ColumnsConfig,
    pub export: ExportConfig,
}

/// Header names of the required input columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub image_1: String,
    pub image_2: String,
    pub rubric: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig {
            image_1: "学生作答图片1".into(),
            image_2: "学生作答图片2".into(),
            rubric: "评分标准".into(),
        }
    }
}

/// File format of timestamped exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// How the graded table is written out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub score_column: String,
    pub prompt_column: String,
    /// Cell text written for rows that were never graded.
    pub unscored_marker: String,
    /// Directory timestamped exports are written into.
    pub directory: PathBuf,
    /// File name prefix for timestamped exports.
    pub file_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: ExportFormat::default(),
            score_column: "score".into(),
            prompt_column: "prompt".into(),
            unscored_marker: "unscored".into(),
            directory: PathBuf::from("."),
            file_stem: "grading-results".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate a single config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/grademark.toml` relative to `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE_NAME))
}

/// Seed `config/grademark.toml` under `base_dir` from
/// `defaults/grademark.toml` when the former is missing.
///
/// Returns the path written, or `None` when the config already exists or
/// there is no default to copy.
pub fn seed_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE_NAME);
    let target = base_dir.join("config").join(CONFIG_FILE_NAME);
    if target.exists() || !source.is_file() {
        return Ok(None);
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::copy(&source, &target).map_err(|source| ConfigError::Io {
        path: target.clone(),
        source,
    })?;
    Ok(Some(target))
}

/// Resolve the configuration for the current process.
///
/// Lookup order: `config/grademark.toml` under the working directory
/// (seeded from `defaults/` when present), then `grademark.toml` in the
/// platform config directory, then the built-in defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;

    if let Some(seeded) = seed_config_file(&cwd)? {
        info!("initialized {} from defaults", seeded.display());
    }

    let local = cwd.join("config").join(CONFIG_FILE_NAME);
    if local.is_file() {
        debug!("using config {}", local.display());
        return load_config_file(&local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "grademark") {
        let user = dirs.config_dir().join(CONFIG_FILE_NAME);
        if user.is_file() {
            debug!("using config {}", user.display());
            return load_config_file(&user);
        }
    }

    debug!("no config file found; using built-in defaults");
    Ok(Config::default())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| {
        let path = path.to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound { path }
        } else {
            ConfigError::Io { path, source }
        }
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let c = &config.columns;
    let e = &config.export;

    let non_empty: &[(&str, &str)] = &[
        ("columns.image_1", &c.image_1),
        ("columns.image_2", &c.image_2),
        ("columns.rubric", &c.rubric),
        ("export.score_column", &e.score_column),
        ("export.prompt_column", &e.prompt_column),
        ("export.unscored_marker", &e.unscored_marker),
        ("export.file_stem", &e.file_stem),
    ];
    for (name, val) in non_empty {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    let (i1, i2, r) = (c.image_1.trim(), c.image_2.trim(), c.rubric.trim());
    if i1 == i2 || i1 == r || i2 == r {
        return Err(ConfigError::ValidationError {
            field: "columns".into(),
            message: "image_1, image_2 and rubric must be distinct".into(),
        });
    }

    if e.score_column.trim() == e.prompt_column.trim() {
        return Err(ConfigError::ValidationError {
            field: "export.prompt_column".into(),
            message: format!("must differ from export.score_column ({})", e.score_column),
        });
    }

    // An output column named like an input column would overwrite it.
    let inputs = [&c.image_1, &c.image_2, &c.rubric];
    for (field, output) in [
        ("export.score_column", &e.score_column),
        ("export.prompt_column", &e.prompt_column),
    ] {
        if let Some(input) = inputs.iter().find(|i| i.trim() == output.trim()) {
            return Err(ConfigError::ValidationError {
                field: field.into(),
                message: format!("must not reuse the required input column {input}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// Fresh scratch directory with an empty `config/` inside.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        tmp
    }

    fn write_config(dir: &Path, body: &str) {
        fs::write(dir.join("config").join(CONFIG_FILE_NAME), body).unwrap();
    }

    #[test]
    fn shipped_defaults_match_builtin_defaults() {
        let config = load_config_file(&workspace_root().join("defaults").join(CONFIG_FILE_NAME))
            .expect("defaults/grademark.toml should load");
        assert_eq!(config, Config::default());
        assert_eq!(config.columns.rubric, "评分标准");
        assert_eq!(config.export.unscored_marker, "unscored");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = scratch("grademark_config_partial");
        write_config(&tmp, "[columns]\nrubric = \"Rubric\"\n");

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.columns.rubric, "Rubric");
        assert_eq!(config.columns.image_1, "学生作答图片1");
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn export_section_overrides() {
        let tmp = scratch("grademark_config_export");
        write_config(
            &tmp,
            r#"
[export]
score_column = "得分"
prompt_column = "作文题目"
unscored_marker = "未批改"
directory = "out"
file_stem = "results"
"#,
        );

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.export.score_column, "得分");
        assert_eq!(config.export.unscored_marker, "未批改");
        assert_eq!(config.export.directory, PathBuf::from("out"));
    }

    #[test]
    fn rejects_empty_column_name() {
        let tmp = scratch("grademark_config_empty_col");
        write_config(&tmp, "[columns]\nimage_2 = \"  \"\n");

        match load_config_from(&tmp) {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "columns.image_2")
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_input_columns() {
        let tmp = scratch("grademark_config_dup_input");
        write_config(&tmp, "[columns]\nimage_1 = \"a\"\nimage_2 = \"a\"\nrubric = \"r\"\n");

        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "columns"
        ));
    }

    #[test]
    fn rejects_duplicate_output_columns() {
        let tmp = scratch("grademark_config_dup_output");
        write_config(&tmp, "[export]\nscore_column = \"x\"\nprompt_column = \"x\"\n");

        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "export.prompt_column"
        ));
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = scratch("grademark_config_missing");
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch("grademark_config_invalid");
        write_config(&tmp, "[columns\nrubric = ");
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn seed_copies_default_once() {
        let tmp = std::env::temp_dir().join("grademark_config_seed");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE_NAME), "[export]\n").unwrap();

        let seeded = seed_config_file(&tmp).unwrap();
        assert_eq!(seeded, Some(tmp.join("config").join(CONFIG_FILE_NAME)));

        // An existing config is never replaced.
        fs::write(tmp.join("config").join(CONFIG_FILE_NAME), "# edited\n").unwrap();
        assert_eq!(seed_config_file(&tmp).unwrap(), None);
        let kept = fs::read_to_string(tmp.join("config").join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(kept, "# edited\n");
    }

    #[test]
    fn seed_without_defaults_is_ok() {
        let tmp = std::env::temp_dir().join("grademark_config_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert_eq!(seed_config_file(&tmp).unwrap(), None);
        assert!(!tmp.join("config").exists());
    }

    #[test]
    fn unreadable_config_is_an_io_error() {
        let tmp = scratch("grademark_config_unreadable");
        // A directory where the file should be cannot be read as text.
        fs::create_dir_all(tmp.join("config").join(CONFIG_FILE_NAME)).unwrap();
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn rejects_output_column_shadowing_input() {
        let tmp = scratch("grademark_config_shadow");
        write_config(
            &tmp,
            "[columns]\nrubric = \"rubric\"\n[export]\nscore_column = \" rubric \"\n",
        );
        match load_config_from(&tmp) {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "export.score_column")
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }

        write_config(&tmp, "[export]\nprompt_column = \"学生作答图片2\"\n");
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "export.prompt_column"
        ));
    }

    #[test]
    fn export_format_parses_lowercase() {
        let tmp = scratch("grademark_config_format");
        write_config(&tmp, "[export]\nformat = \"csv\"\n");
        assert_eq!(load_config_from(&tmp).unwrap().export.format, ExportFormat::Csv);
        assert_eq!(ExportConfig::default().format, ExportFormat::Xlsx);
    }
}
