use crate::client::FitbitToken;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Manages the on-disk Fitbit token file.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store backed by the token file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save the token, replacing any previous one
    pub fn save(&self, token: &FitbitToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            super::ensure_dir(parent)?;
        }

        let json = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, json)?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Load the token, `None` if none was saved
    pub fn load(&self) -> Result<Option<FitbitToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let token: FitbitToken = serde_json::from_str(&json)?;
        Ok(Some(token))
    }

    /// Check if credentials exist
    pub fn has_credentials(&self) -> bool {
        self.path.exists()
    }

    /// Remove the stored token
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_token() -> FitbitToken {
        FitbitToken::new("test_access", "test_refresh", 3600).with_scope("sleep")
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("tokens.json"));

        let token = create_test_token();
        store.save(&token).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, Some(token));
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("tokens.json"));

        assert!(store.load().unwrap().is_none());
        assert!(!store.has_credentials());
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("a").join("tokens.json"));

        store.save(&create_test_token()).unwrap();
        assert!(store.has_credentials());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("tokens.json"));
        store.save(&create_test_token()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_clear_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("tokens.json"));

        store.save(&create_test_token()).unwrap();
        assert!(store.has_credentials());

        store.clear().unwrap();
        assert!(!store.has_credentials());
        store.clear().unwrap();
    }
}
