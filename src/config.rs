// Launcher configuration loaded from YAML

use eyre::{Result, WrapErr, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";
const DATA_FILE: &str = "data.json";
const FALLBACK_DATA_FILE: &str = "todostore.json";

/// Settings read from `config.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where tasks are stored
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Minimum level for log output on stderr
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the per-user config file is
    /// read if present and defaults apply otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).wrap_err_with(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| eyre!("Invalid log_level: {} (expected off, error, warn, info, debug or trace)", self.log_level))
    }

    /// Pick the data file: command-line flag, then config, then the per-user
    /// data directory, then the working directory
    pub fn resolve_data_file(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.data_file.clone())
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join(DATA_FILE)))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_FILE))
    }
}

/// `<config dir>/todostore/config.yaml`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_file, None);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml("data_file: /tmp/todo.json\nlog_level: debug\n").unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/todo.json")));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_from_yaml_empty_document() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        assert!(Config::from_yaml("colour: red\n").is_err());
    }

    #[test]
    fn test_from_yaml_rejects_bad_level() {
        assert!(Config::from_yaml("log_level: loud\n").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.yaml").as_path())).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "log_level: info\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.level_filter().unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn test_resolve_data_file_precedence() {
        let config = Config {
            data_file: Some(PathBuf::from("from-config.json")),
            ..Config::default()
        };

        assert_eq!(
            config.resolve_data_file(Some(PathBuf::from("from-flag.json"))),
            PathBuf::from("from-flag.json")
        );
        assert_eq!(config.resolve_data_file(None), PathBuf::from("from-config.json"));

        let fallback = Config::default().resolve_data_file(None);
        assert!(fallback.ends_with("data.json") || fallback == Path::new(FALLBACK_DATA_FILE));
    }
}
