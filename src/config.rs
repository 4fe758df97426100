// src/config.rs
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::docs::DocsSource;
use crate::errors::ConfigError;

/// Runtime settings of one deployed evaluation function.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Default `env_logger` filter; `RUST_LOG` still takes precedence.
    pub log_filter: String,
    /// Upper bound on one dispatch. `None` leaves the bound to the host.
    pub eval_timeout: Option<Duration>,
    pub docs: DocsSource,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
            eval_timeout: None,
            docs: DocsSource::Embedded,
        }
    }
}

/// Shape of the optional TOML file named by `EVALFN_CONFIG`.
///
/// ```toml
/// host = "127.0.0.1"
/// port = 9000
/// log = "debug"
/// eval_timeout_ms = 5000
/// docs_dir = "/srv/docs"
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub eval_timeout_ms: Option<u64>,
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

fn parse_timeout(key: &str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: ms.to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`: first the TOML file named by
    /// `EVALFN_CONFIG`, then `EVALFN_*` overrides.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("EVALFN_CONFIG") {
            let text = std::fs::read_to_string(&path)?;
            config.apply_file(FileConfig::parse(&text)?)?;
        }

        if let Some(host) = lookup("EVALFN_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("EVALFN_PORT") {
            config.port = parse_number("EVALFN_PORT", &port)?;
        }
        if let Some(log) = lookup("EVALFN_LOG") {
            config.log_filter = log;
        }
        if let Some(ms) = lookup("EVALFN_EVAL_TIMEOUT_MS") {
            let ms = parse_number("EVALFN_EVAL_TIMEOUT_MS", &ms)?;
            config.eval_timeout = Some(parse_timeout("EVALFN_EVAL_TIMEOUT_MS", ms)?);
        }
        if let Some(dir) = lookup("EVALFN_DOCS_DIR") {
            config.docs = DocsSource::Directory(PathBuf::from(dir));
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(log) = file.log {
            self.log_filter = log;
        }
        if let Some(ms) = file.eval_timeout_ms {
            self.eval_timeout = Some(parse_timeout("eval_timeout_ms", ms)?);
        }
        if let Some(dir) = file.docs_dir {
            self.docs = DocsSource::Directory(dir);
        }
        Ok(())
    }
}
