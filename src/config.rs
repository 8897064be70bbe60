use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::view::DEFAULT_PAGE_SIZE;

const APP_DIR: &str = "notepad";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    database: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    page_size: Option<usize>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    pub export_dir: PathBuf,
    pub page_size: usize,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_raw(RawConfig::default())
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    pub fn load() -> Result<Config, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let raw = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Config::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Config {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."));

        Config {
            database: raw.database.unwrap_or_else(|| data_dir.join("notes.db")),
            export_dir: raw
                .export_dir
                .or_else(dirs::download_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            page_size: raw
                .page_size
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            log_file: raw.log_file.unwrap_or_else(|| data_dir.join("notepad.log")),
            log_level: raw.log_level.unwrap_or_else(|| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn keys_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database = \"/tmp/n.db\"\nexport_dir = \"/tmp/out\"\npage_size = 10\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/n.db"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.page_size, 10);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn zero_page_size_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = 0\n").unwrap();
        assert_eq!(Config::from_file(&path).unwrap().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = \"many\"\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
