//! Configuration for the `students` command.
//!
//! Each setting is resolved in order of precedence:
//! 1. Command-line flag (highest priority)
//! 2. Environment variable
//! 3. Config file (~/.config/students/config.toml)
//! 4. Built-in default (lowest priority)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "STUDENTS_API_URL";
const ENV_PAGE_SIZE: &str = "STUDENTS_PAGE_SIZE";
const ENV_TIMEOUT: &str = "STUDENTS_TIMEOUT_SECS";
const ENV_LOG_DIR: &str = "STUDENTS_LOG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Effective configuration after all sources are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_dir: None,
        }
    }
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub timeout_secs: Option<u64>,
}

fn parse_env<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value })
    })
    .transpose()
}

impl Config {
    /// ~/.config/students/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("students").join("config.toml"))
    }

    /// Load from the real environment and the default config path.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(overrides, |key| std::env::var(key).ok(), file)
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Merge flag > env > file > default.
    pub fn resolve(
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Result<Self, ConfigError> {
        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env(ENV_BASE_URL))
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let page_size = match overrides.page_size {
            Some(size) => size,
            None => parse_env(ENV_PAGE_SIZE, env(ENV_PAGE_SIZE))?
                .or(file.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                value: page_size.to_string(),
            });
        }

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => parse_env(ENV_TIMEOUT, env(ENV_TIMEOUT))?
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let log_dir = env(ENV_LOG_DIR).map(PathBuf::from).or(file.log_dir);

        Ok(Self {
            base_url,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
            log_dir,
        })
    }

    pub fn to_toml(&self) -> String {
        let file = FileConfig {
            base_url: Some(self.base_url.clone()),
            page_size: Some(self.page_size),
            timeout_secs: Some(self.timeout.as_secs()),
            log_dir: self.log_dir.clone(),
        };
        toml::to_string_pretty(&file).unwrap_or_default()
    }
}
