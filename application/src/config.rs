//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend configuration.
    pub backend: Backend,

    /// Client state storage configuration.
    pub storage: Storage,

    /// QR scanner configuration.
    pub scanner: Scanner,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Backend configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Backend {
    /// Base URL of the backend, without the `/api` part.
    #[default("https://school-erp.kesug.com/backend".to_owned())]
    pub url: String,

    /// Timeout of a single backend request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Backend> for service::infra::backend::http::Config {
    fn from(value: Backend) -> Self {
        let Backend { url, timeout } = value;
        Self { url, timeout }
    }
}

/// Client state storage configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Storage {
    /// Directory the session is persisted in.
    #[default(PathBuf::from(".attendance"))]
    pub dir: PathBuf,
}

/// QR scanner configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Scanner {
    /// Command line of the external QR decoder printing decoded payloads
    /// line by line.
    #[default(vec![
        "zbarcam".to_owned(),
        "--raw".to_owned(),
        "--nodisplay".to_owned(),
        "--quiet".to_owned(),
    ])]
    pub command: Vec<String>,

    /// Time a scan result is shown before scanning resumes.
    #[default(time::Duration::from_millis(2500))]
    #[serde(with = "humantime_serde")]
    pub display_window: time::Duration,

    /// Maximum number of accepted scans kept in the session history.
    #[default(20)]
    pub history_limit: usize,
}

impl From<&Scanner> for service::scanner::Config {
    fn from(value: &Scanner) -> Self {
        Self {
            display_window: value.display_window,
            history_limit: value.history_limit,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{fs, time::Duration};

    use super::{Config, LogLevel};

    #[test]
    fn defaults_without_file() {
        let conf = Config::new("/nonexistent/attendance").unwrap();

        assert_eq!(conf.backend.url, "https://school-erp.kesug.com/backend");
        assert_eq!(conf.backend.timeout, Duration::from_secs(30));
        assert_eq!(conf.scanner.command[0], "zbarcam");
        assert_eq!(conf.scanner.display_window, Duration::from_millis(2500));
        assert_eq!(conf.scanner.history_limit, 20);
        assert!(matches!(conf.log.level, LogLevel::Info));
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [backend]
                url = "http://localhost:8000/backend"
                timeout = "5s"

                [scanner]
                command = ["qr-decoder", "--stdout"]
                display_window = "1s 500ms"

                [log]
                level = "DEBUG"
            "#,
        )
        .unwrap();

        let conf = Config::new(path.to_str().unwrap()).unwrap();

        assert_eq!(conf.backend.url, "http://localhost:8000/backend");
        assert_eq!(conf.backend.timeout, Duration::from_secs(5));
        assert_eq!(conf.scanner.command, ["qr-decoder", "--stdout"]);
        assert_eq!(conf.scanner.display_window, Duration::from_millis(1500));
        assert_eq!(conf.scanner.history_limit, 20);
        assert!(matches!(conf.log.level, LogLevel::Debug));
    }
}
