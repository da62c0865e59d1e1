//! Configuration loading from `config.toml`
//!
//! Every field is optional in the file. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::session::DEFAULT_SESSION_SIZE;
use crate::flashcards::CorruptDataPolicy;

/// Name of the application directory under the platform data dir
pub const APP_DIR_NAME: &str = "flashmind";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not determine the local data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Directory holding `cards.json` and `tags.json`
    pub data_dir: Option<PathBuf>,
    /// Maximum number of cards queued per study session
    pub session_size: usize,
    /// How to treat unparseable card or tag files
    pub on_corrupt_data: CorruptDataPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_size: DEFAULT_SESSION_SIZE,
            on_corrupt_data: CorruptDataPolicy::default(),
        }
    }
}

impl Config {
    /// Platform data directory for the app, e.g. `~/.local/share/flashmind`
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Default location of `config.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        if config.session_size == 0 {
            log::warn!("session_size of 0 in config; using {}", DEFAULT_SESSION_SIZE);
            config.session_size = DEFAULT_SESSION_SIZE;
        }
        Ok(config)
    }

    /// The configured data directory, or the platform default
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.session_size, 50);
        assert_eq!(config.on_corrupt_data, CorruptDataPolicy::Recover);
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("session_size = 20\n").unwrap();
        assert_eq!(config.session_size, 20);
        assert!(config.data_dir.is_none());
        assert_eq!(config.on_corrupt_data, CorruptDataPolicy::Recover);
    }

    #[test]
    fn test_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "data_dir = \"/tmp/cards\"\nsession_size = 10\non_corrupt_data = \"fail\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/tmp/cards"));
        assert_eq!(config.session_size, 10);
        assert_eq!(config.on_corrupt_data, CorruptDataPolicy::Fail);
    }

    #[test]
    fn test_zero_session_size_falls_back() {
        let config = Config::parse("session_size = 0").unwrap();
        assert_eq!(config.session_size, DEFAULT_SESSION_SIZE);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "on_corrupt_data = \"shrug\"").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}
