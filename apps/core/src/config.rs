use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "confluence-crx";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Process configuration of the command line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the extension's key-value storage.
    pub store_path: PathBuf,
    pub log_dir: PathBuf,
    /// JSON5 list of `{url, lastAccessed}` standing in for open browser tabs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs_path: Option<PathBuf>,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            store_path: base.join("storage.sqlite3"),
            log_dir: base.join("logs"),
            tabs_path: None,
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    ["APPDATA", "XDG_DATA_HOME"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .map(PathBuf::from)
        .find(|dir| !dir.as_os_str().is_empty())
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Loads `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut config = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };
    config.config_path = config_path;
    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.store_path.as_os_str().is_empty() {
        return Err("store_path is required".into());
    }

    if cfg.log_dir.as_os_str().is_empty() {
        return Err("log_dir is required".into());
    }

    if cfg
        .tabs_path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        return Err("tabs_path must not be empty when set".into());
    }

    Ok(())
}
