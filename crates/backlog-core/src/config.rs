//! Configuration types for backlog.
//!
//! [`Config::load`] layers, lowest precedence first: the embedded defaults, an
//! optional TOML file (`$XDG_CONFIG_HOME/backlog/config.toml` unless a path
//! is given), then `BACKLOG__SECTION__KEY` environment variables. The binary
//! applies CLI flags on top and resolves an immutable [`ImportConfig`] for the
//! pipeline; nothing below the binary reads the environment.

use crate::error::{Error, Result};
use crate::timestamp::TimeZoneSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[source]
directory = "."
extension = "log"

[target]
database      = "lounge.sqlite3"
network       = ""
channel       = ""
create_schema = false

[import]
timezone = "UTC"
mode     = "best-effort"
workers  = 1
"#;

const ENV_PREFIX: &str = "BACKLOG";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub import: ImportSection,
}

/// `[source]`: where the bouncer logs live.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Only files with this extension are imported; anything else is skipped.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_directory() -> PathBuf { PathBuf::from(".") }
fn default_extension() -> String { "log".to_string() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
        }
    }
}

/// `[target]`: The Lounge database and destination identifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Network UUID as stored in The Lounge user file.
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub channel: String,
    /// Create the `messages` table if it does not exist.
    #[serde(default)]
    pub create_schema: bool,
}

fn default_database() -> PathBuf { PathBuf::from("lounge.sqlite3") }

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            network: String::new(),
            channel: String::new(),
            create_schema: false,
        }
    }
}

/// `[import]`: how lines are turned into records.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSection {
    #[serde(default)]
    pub timezone: TimeZoneSpec,
    #[serde(default)]
    pub mode: ImportMode,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize { 1 }

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            timezone: TimeZoneSpec::default(),
            mode: ImportMode::default(),
            workers: default_workers(),
        }
    }
}

/// What to do with a file that contains rejected lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Skip rejected lines, import the rest.
    #[default]
    BestEffort,
    /// Hold back the whole file if any line is rejected.
    Strict,
}

impl std::str::FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "best-effort" => Ok(ImportMode::BestEffort),
            "strict" => Ok(ImportMode::Strict),
            other => Err(Error::Config(format!(
                "unknown import mode {other:?} (expected best-effort or strict)"
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load configuration layered on top of the built-in defaults.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_path(), false),
        };
        tracing::debug!(path = %path.display(), required, "loading configuration");

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Resolve the immutable settings handed to the pipeline.
    pub fn import_config(&self) -> Result<ImportConfig> {
        if self.target.network.trim().is_empty() {
            return Err(Error::Config("target.network must be set".into()));
        }
        if self.target.channel.trim().is_empty() {
            return Err(Error::Config("target.channel must be set".into()));
        }
        if self.import.workers == 0 {
            return Err(Error::Config("import.workers must be at least 1".into()));
        }
        Ok(ImportConfig {
            network_id: self.target.network.clone(),
            channel: self.target.channel.clone(),
            timezone: self.import.timezone,
            mode: self.import.mode,
            workers: self.import.workers,
            extension: self.source.extension.clone(),
        })
    }
}

/// Settings for one import run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub network_id: String,
    pub channel: String,
    pub timezone: TimeZoneSpec,
    pub mode: ImportMode,
    /// Files processed in parallel; `1` processes them one by one.
    pub workers: usize,
    pub extension: String,
}

impl ImportConfig {
    /// Defaults for everything except the destination.
    pub fn new(network_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            channel: channel.into(),
            timezone: TimeZoneSpec::utc(),
            mode: ImportMode::BestEffort,
            workers: 1,
            extension: default_extension(),
        }
    }

    pub fn with_timezone(mut self, timezone: TimeZoneSpec) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("backlog")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.source.extension, "log");
        assert_eq!(cfg.import.timezone, TimeZoneSpec::utc());
        assert_eq!(cfg.import.mode, ImportMode::BestEffort);
        assert_eq!(cfg.import.workers, 1);
        assert!(!cfg.target.create_schema);
    }

    #[test]
    fn defaults_need_a_destination() {
        let err = Config::defaults().import_config().unwrap_err();
        assert!(err.to_string().contains("target.network"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r##"
[target]
network = "aef323ad"
channel = "#rust"

[import]
timezone = "+02:00"
mode = "strict"
workers = 4
"##
        )
        .unwrap();

        let cfg = Config::load(Some(&path)).unwrap();
        let import = cfg.import_config().unwrap();
        assert_eq!(import.network_id, "aef323ad");
        assert_eq!(import.channel, "#rust");
        assert_eq!(import.timezone.offset().local_minus_utc(), 7200);
        assert_eq!(import.mode, ImportMode::Strict);
        assert_eq!(import.workers, 4);
        assert_eq!(import.extension, "log");
    }

    #[test]
    fn bad_timezone_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[import]\ntimezone = \"Europe/Berlin\"\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(Error::ConfigLoad(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/backlog/config.toml");
        assert!(Config::load(Some(path)).is_err());
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("strict".parse::<ImportMode>().unwrap(), ImportMode::Strict);
        assert_eq!(
            "best-effort".parse::<ImportMode>().unwrap(),
            ImportMode::BestEffort
        );
        assert!("lenient".parse::<ImportMode>().is_err());
    }
}
