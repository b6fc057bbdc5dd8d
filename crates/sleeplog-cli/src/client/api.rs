//! Fitbit Web API client for authenticated requests
//!
//! This module provides a thin client for making authenticated requests
//! to the Fitbit Web API using OAuth2 bearer tokens.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::tokens::FitbitToken;
use crate::error::{Result, SleepLogError};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.fitbit.com";

const API_USER_AGENT: &str = concat!("sleeplog/", env!("CARGO_PKG_VERSION"));

/// OAuth2 application credentials used for the refresh-token grant
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

/// Fitbit Web API client
pub struct FitbitClient {
    client: Client,
    base_url: String,
}

impl FitbitClient {
    /// Create a client against the public API host
    pub fn new() -> Result<Self> {
        Self::new_with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (configuration and tests)
    pub fn new_with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SleepLogError::provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the full URL for a given path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build headers with authorization
    fn build_headers(&self, token: &FitbitToken) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(API_USER_AGENT));
        let auth = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| SleepLogError::config("Access token contains invalid characters"))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// Make an authenticated GET request and return the response
    pub async fn get(&self, token: &FitbitToken, path: &str) -> Result<Response> {
        let url = self.build_url(path);
        let headers = self.build_headers(token)?;

        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| SleepLogError::provider(e.to_string()))?;

        self.handle_response_status(response).await
    }

    /// Make an authenticated GET request and deserialize JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, token: &FitbitToken, path: &str) -> Result<T> {
        let response = self.get(token, path).await?;
        response.json().await.map_err(|e| {
            SleepLogError::provider(format!("Failed to parse JSON response: {}", e))
        })
    }

    /// Exchange the refresh token for a new token pair
    pub async fn refresh_token(&self, app: &OAuthApp, token: &FitbitToken) -> Result<FitbitToken> {
        let url = self.build_url("/oauth2/token");

        tracing::info!("refreshing access token");
        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, API_USER_AGENT)
            .basic_auth(&app.client_id, Some(&app.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", token.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SleepLogError::provider(e.to_string()))?;

        let response = self.handle_response_status(response).await?;
        let issued: FitbitToken = response.json().await.map_err(|e| {
            SleepLogError::provider(format!("Failed to parse token response: {}", e))
        })?;

        Ok(issued.stamp_expiry())
    }

    /// Handle response status codes and convert to errors
    async fn handle_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(response)
            }
            StatusCode::UNAUTHORIZED => Err(SleepLogError::NotAuthenticated),
            StatusCode::TOO_MANY_REQUESTS => Err(SleepLogError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(SleepLogError::provider(format!(
                    "API error {}: {}",
                    status, body
                )))
            }
        }
    }
}
