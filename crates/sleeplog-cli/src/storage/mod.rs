//! Storage layer for the local sleep table
//!
//! ## Storage Layout
//!
//! ```text
//! ~/.local/share/sleeplog/
//! ├── sleep.csv               # Sleep table, one row per night
//! └── fitbit_tokens.json      # OAuth2 tokens (0600)
//! ```
//!
//! The table is written atomically (temp file + rename), so a killed run
//! leaves the previous table in place.

mod table;

pub use table::{TableStore, COLUMNS};

use std::path::PathBuf;

/// Default table file name
pub const TABLE_FILENAME: &str = "sleep.csv";

/// Get the default storage path
pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::config::APP_DIR_NAME)
}

/// Get the default sleep table path
pub fn default_table_path() -> PathBuf {
    default_storage_path().join(TABLE_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_path() {
        let path = default_table_path();
        assert!(path.ends_with("sleeplog/sleep.csv"));
    }
}
