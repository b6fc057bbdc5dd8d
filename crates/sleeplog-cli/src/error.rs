use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for sleeplog
#[derive(Error, Debug)]
pub enum SleepLogError {
    #[error("Corrupt sleep table {path:?}: {reason}")]
    CorruptData { path: PathBuf, reason: String },

    #[error("Could not decode sleep log: {0}")]
    Decode(String),

    #[error("Merge conflict: a sleep log for {date} is already present")]
    MergeConflict { date: NaiveDate },

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication required. Please run 'sleeplog auth import' first.")]
    NotAuthenticated,

    #[error("Rate limited. Please wait before retrying.")]
    RateLimited,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SleepLogError>;

impl SleepLogError {
    /// Create a corrupt data error for the table at `path`
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error from a message
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a provider error from a message
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid parameter error from a message
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// True for failures raised by the remote provider rather than local data
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::NotAuthenticated | Self::RateLimited
        )
    }
}

/// Render an error for the terminal, with a hint where one helps.
pub fn format_user_error(err: &SleepLogError) -> String {
    match err {
        SleepLogError::CorruptData { .. } => format!(
            "{}\nThe table was left untouched. Fix or move the file and run sync again.",
            err
        ),
        SleepLogError::MergeConflict { .. } => format!(
            "{}\nThe provider returned a date that is already stored; nothing was written.",
            err
        ),
        SleepLogError::ProviderUnavailable(_) | SleepLogError::RateLimited => {
            format!("{}\nThe local table was not modified. Re-run later.", err)
        }
        _ => err.to_string(),
    }
}
