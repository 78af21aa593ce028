use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.todoist.com/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const TOKEN_ENV_VARS: [&str; 2] = ["TODOIST_API_TOKEN", "TODOIST_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Contents of the optional `config.toml`. The API token never lives here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TdcConfig {
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub strip_emojis: Option<bool>,
    pub show_ids: Option<bool>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_token: Option<String>,
    pub strip_emojis: bool,
    pub show_ids: bool,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_token: Option<String>,
    pub api_base_url: String,
    pub timeout: Duration,
    pub strip_emojis: bool,
    pub show_ids: bool,
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    home_dir_from(|key| std::env::var(key).ok())
}

fn home_dir_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(|key| non_blank(lookup(key)))
        .map(PathBuf::from)
        .next()
}

/// Where the config file is looked up: `$TDC_CONFIG`, then `$TDC_HOME/config.toml`,
/// then `~/.config/tdc/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_path_from(|key| std::env::var(key).ok())
}

pub fn config_path_from(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(explicit) = non_blank(lookup("TDC_CONFIG")) {
        return Some(PathBuf::from(explicit));
    }
    if let Some(home) = non_blank(lookup("TDC_HOME")) {
        return Some(PathBuf::from(home).join("config.toml"));
    }
    home_dir_from(lookup).map(|home| home.join(".config").join("tdc").join("config.toml"))
}

/// Read a config file; a missing file is `Ok(None)`.
pub fn load_config_from(path: &Path) -> Result<Option<TdcConfig>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str::<TdcConfig>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

pub fn load_config() -> Result<Option<TdcConfig>, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(None),
    }
}

/// Merge flags, environment and file: flag wins over environment, environment over file.
pub fn resolve_settings(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
    file: Option<&TdcConfig>,
) -> Result<Settings, ConfigError> {
    let file = file.cloned().unwrap_or_default();

    let api_token = non_blank(overrides.api_token.clone())
        .or_else(|| TOKEN_ENV_VARS.into_iter().find_map(|key| non_blank(env(key))));

    let api_base_url = non_blank(env("TDC_API_BASE_URL"))
        .or_else(|| non_blank(file.api_base_url.clone()))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let timeout_secs = match non_blank(env("TDC_TIMEOUT_SECS")) {
        Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            key: "TDC_TIMEOUT_SECS",
            value: raw,
        })?,
        None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    let strip_emojis = overrides.strip_emojis
        || env_flag(&env, "TDC_STRIP_EMOJIS")?
            .or(file.strip_emojis)
            .unwrap_or(false);
    let show_ids = overrides.show_ids || env_flag(&env, "TDC_SHOW_IDS")?.or(file.show_ids).unwrap_or(false);

    Ok(Settings {
        api_token,
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
        timeout: Duration::from_secs(timeout_secs),
        strip_emojis,
        show_ids,
    })
}

fn env_flag(env: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = non_blank(env(key)) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
