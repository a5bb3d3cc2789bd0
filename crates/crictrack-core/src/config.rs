// Tracker configuration: config/tracker.toml, seeded from defaults/.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "tracker.toml";

const CONFIG_DIR: &str = "config";
const DEFAULTS_DIR: &str = "defaults";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {path} and no defaults/tracker.toml to create it from")]
    Missing { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid tracker TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("cannot copy {from} to {to}: {source}")]
    CopyDefaults {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// tracker.toml
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub data_paths: DataPaths,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize)]
struct TrackerFile {
    database: DatabaseSection,
    data_paths: DataPaths,
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// Locations of the CSV files read by `crictrack load`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub matches: String,
    pub performances: String,
}

/// Report and chart settings. Every field has a default, so the whole
/// `[report]` table may be omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Batting average a player must exceed (with more than one innings)
    /// to be listed as a high performer.
    pub high_performer_threshold: f64,
    pub histogram_bin_width: u32,
    /// Upper edge of the regular histogram bins; runs at or above this land
    /// in the overflow bucket.
    pub histogram_limit: u32,
    pub plots_dir: String,
    pub default_player: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            high_performer_threshold: 40.0,
            histogram_bin_width: 10,
            histogram_limit: 100,
            plots_dir: "plots".into(),
            default_player: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A high-performer threshold must be a finite, non-negative average. Also
/// applied to thresholds given on the command line.
pub fn validate_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(threshold)
    } else {
        Err(invalid(
            "report.high_performer_threshold",
            format!("must be a finite value >= 0, got {threshold}"),
        ))
    }
}

impl ReportConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.high_performer_threshold)?;

        let width = self.histogram_bin_width;
        if width == 0 {
            return Err(invalid("report.histogram_bin_width", "must be > 0"));
        }
        let limit = self.histogram_limit;
        if limit == 0 || limit % width != 0 {
            return Err(invalid(
                "report.histogram_limit",
                format!("must be > 0 and a multiple of histogram_bin_width ({width}), got {limit}"),
            ));
        }
        Ok(())
    }
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("database.path", &self.db_path),
            ("data_paths.players", &self.data_paths.players),
            ("data_paths.matches", &self.data_paths.matches),
            ("data_paths.performances", &self.data_paths.performances),
            ("report.plots_dir", &self.report.plots_dir),
        ];
        if let Some((field, _)) = paths.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(invalid(*field, "must not be empty"));
        }
        self.report.validate()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Parse and validate `config/tracker.toml` under `base_dir` without
/// touching `defaults/`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let file: TrackerFile =
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;

    let config = Config {
        db_path: file.database.path,
        data_paths: file.data_paths,
        report: file.report,
    };
    config.validate()?;
    Ok(config)
}

/// Copy `defaults/tracker.toml` to `config/tracker.toml` unless the latter
/// exists. Returns the created path, or `None` when nothing was copied.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = config_path(base_dir);
    let defaults = base_dir.join(DEFAULTS_DIR).join(CONFIG_FILE);

    if !defaults.is_file() {
        return if target.is_file() {
            Ok(None)
        } else {
            Err(ConfigError::Missing { path: target })
        };
    }

    let copy_error = |source: std::io::Error| ConfigError::CopyDefaults {
        from: defaults.clone(),
        to: target.clone(),
        source,
    };

    std::fs::create_dir_all(base_dir.join(CONFIG_DIR)).map_err(copy_error)?;
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_error(e)),
    };
    let mut src = std::fs::File::open(&defaults).map_err(copy_error)?;
    std::io::copy(&mut src, &mut dest).map_err(copy_error)?;

    info!("Created {} from defaults", target.display());
    Ok(Some(target))
}

/// Load config relative to `base_dir`, creating it from defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
