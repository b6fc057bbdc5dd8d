use chrono::Utc;
use serde::{Deserialize, Serialize};

/// OAuth2 Bearer token for the Fitbit Web API.
/// Short-lived, refreshed with the refresh token and the app's client credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitbitToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Space separated scopes granted to the token
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub expires_in: i64,
    /// Unix timestamp; filled from `expires_in` when a token is issued
    #[serde(default)]
    pub expires_at: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl FitbitToken {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            scope: String::new(),
            user_id: None,
            expires_in,
            expires_at: Utc::now().timestamp() + expires_in,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Stamp `expires_at` from `expires_in`, relative to now.
    pub fn stamp_expiry(mut self) -> Self {
        self.expires_at = Utc::now().timestamp() + self.expires_in;
        self
    }

    /// Check if the access token has expired.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.expires_at < now
    }

    /// Whether the token was granted `scope`
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
