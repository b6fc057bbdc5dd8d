mod credentials;

pub use credentials::CredentialStore;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::{OAuthApp, DEFAULT_BASE_URL};
use crate::error::{Result, SleepLogError};
use crate::render::RendererKind;

/// Directory name used under the platform config and data dirs
pub const APP_DIR_NAME: &str = "sleeplog";

const CONFIG_FILENAME: &str = "config.json";
const TOKENS_FILENAME: &str = "fitbit_tokens.json";

/// First night of tracking; full backfills start here.
pub const DEFAULT_EPOCH: (i32, u32, u32) = (2018, 8, 7);

/// Get the configuration directory path
/// Returns ~/.config/sleeplog on Unix, ~/Library/Application Support/sleeplog on macOS
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .ok_or_else(|| SleepLogError::config("Could not determine config directory"))
}

/// Get the data directory path for the table and tokens
/// Returns ~/.local/share/sleeplog on Unix, ~/Library/Application Support/sleeplog on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .ok_or_else(|| SleepLogError::config("Could not determine data directory"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Settings for one run. Missing keys in the config file take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sleep table CSV
    pub table_path: PathBuf,
    /// Token JSON written by `auth import` and refreshes
    pub tokens_path: PathBuf,
    pub api_base_url: String,
    /// Backfill start for an empty table
    pub epoch_date: NaiveDate,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Scopes the token must carry
    pub scopes: Vec<String>,
    pub format: RendererKind,
}

impl Default for Config {
    fn default() -> Self {
        let base = crate::storage::default_storage_path();
        let (y, m, d) = DEFAULT_EPOCH;

        Self {
            table_path: base.join(crate::storage::TABLE_FILENAME),
            tokens_path: base.join(TOKENS_FILENAME),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            epoch_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            client_id: None,
            client_secret: None,
            scopes: vec!["sleep".to_string()],
            format: RendererKind::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(CONFIG_FILENAME))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !path.exists() {
            if required {
                return Err(SleepLogError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&json).map_err(|e| {
            SleepLogError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// OAuth app credentials, if both halves are configured
    pub fn oauth_app(&self) -> Option<OAuthApp> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some(OAuthApp {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => None,
        }
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.tokens_path.clone())
    }
}
