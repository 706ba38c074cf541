use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use base64::prelude::{BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "jira-comment";
const CONFIG_FILE_NAME: &str = "config.json";

const ENV_CONFIG_DIR: &str = "JIRA_COMMENT_CONFIG_DIR";
const ENV_BASE_URL: &str = "JIRA_BASE_URL";
const ENV_TOKEN: &str = "JIRA_TOKEN";
const ENV_EMAIL: &str = "JIRA_EMAIL";
const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Effective settings: the stored config file overlaid with environment variables.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub jira_base_url: Option<String>,
    pub jira_token: Option<String>,
    pub jira_email: Option<String>,
    pub jira_api_token: Option<String>,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Without a config directory the environment alone supplies the settings.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let stored = match config_directory_from(&lookup) {
            Ok(dir) => StoredConfig::load_from(&dir.join(CONFIG_FILE_NAME))?,
            Err(_) => StoredConfig::default(),
        };
        Ok(Self::resolve(stored, lookup))
    }

    pub fn resolve(stored: StoredConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, fallback: Option<String>| non_empty(lookup(key)).or(non_empty(fallback));
        Self {
            jira_base_url: pick(ENV_BASE_URL, stored.jira_base_url),
            jira_token: pick(ENV_TOKEN, stored.jira_token),
            jira_email: pick(ENV_EMAIL, stored.jira_email),
            jira_api_token: pick(ENV_API_TOKEN, stored.jira_api_token),
        }
    }

    pub fn base_url(&self) -> AppResult<&str> {
        self.jira_base_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Jira base URL not configured".to_string()))
    }

    /// Credential for the `Authorization: Basic` header. An explicit token
    /// is used verbatim, otherwise it is derived from email and API token.
    pub fn basic_token(&self) -> AppResult<String> {
        if let Some(token) = &self.jira_token {
            return Ok(token.clone());
        }
        match (&self.jira_email, &self.jira_api_token) {
            (Some(email), Some(api_token)) => {
                Ok(BASE64_STANDARD.encode(format!("{email}:{api_token}")))
            }
            _ => Err(AppError::Configuration(
                "Jira token not configured; set a token or an email and API token".to_string(),
            )),
        }
    }
}

/// On-disk configuration written by `config init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_api_token: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    config_directory_from(|key| env::var(key).ok())
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

fn config_directory_from(lookup: impl Fn(&str) -> Option<String>) -> AppResult<PathBuf> {
    if let Some(dir) = non_empty(lookup(ENV_CONFIG_DIR)) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty(lookup("XDG_CONFIG_HOME")) {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }
    non_empty(lookup("HOME"))
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR_NAME))
        .ok_or_else(|| AppError::Configuration("cannot locate a config directory".to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
