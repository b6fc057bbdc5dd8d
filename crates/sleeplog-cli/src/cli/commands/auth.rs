//! Token management commands for sleeplog

use chrono::Utc;

use crate::client::{FitbitClient, FitbitProvider, FitbitToken};
use crate::config::Config;
use crate::error::{Result, SleepLogError};

/// Save a token pair obtained from the Fitbit OAuth2 flow
pub async fn import(
    config: &Config,
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    scope: Option<String>,
) -> Result<()> {
    if access_token.trim().is_empty() || refresh_token.trim().is_empty() {
        return Err(SleepLogError::invalid_param("tokens must not be empty"));
    }

    let scope = scope.unwrap_or_else(|| config.scopes.join(" "));
    let token = FitbitToken::new(access_token.trim(), refresh_token.trim(), expires_in)
        .with_scope(scope);

    let store = config.credential_store();
    store.save(&token)?;

    println!("Token saved to {}", store.path().display());
    Ok(())
}

/// Execute the logout command
pub async fn logout(config: &Config) -> Result<()> {
    let store = config.credential_store();

    if !store.has_credentials() {
        println!("Not logged in.");
        return Ok(());
    }

    store.clear()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Execute the status command
pub async fn status(config: &Config) -> Result<()> {
    let store = config.credential_store();

    let token = match store.load()? {
        Some(token) => token,
        None => {
            println!("Status: Not logged in");
            println!("Run 'sleeplog auth import' to store a token.");
            return Ok(());
        }
    };

    println!("Status: Logged in");
    println!("Token file: {}", store.path().display());
    if let Some(user) = &token.user_id {
        println!("User: {}", user);
    }

    if token.is_expired() {
        if config.oauth_app().is_some() {
            println!("Access Token: Expired (will refresh on next request)");
        } else {
            println!("Access Token: Expired (set client_id and client_secret to refresh)");
        }
    } else {
        let expires_in = token.expires_at - Utc::now().timestamp();
        if expires_in > 3600 {
            println!("Access Token: Valid (expires in {} hours)", expires_in / 3600);
        } else if expires_in > 60 {
            println!("Access Token: Valid (expires in {} minutes)", expires_in / 60);
        } else {
            println!("Access Token: Valid (expires in {} seconds)", expires_in);
        }
    }

    let missing = missing_scopes(config, &token);
    if !missing.is_empty() {
        println!("Missing scopes: {}", missing.join(", "));
    }

    Ok(())
}

/// Load the stored token, refreshing it when it has expired
pub async fn authorized_token(config: &Config, client: &FitbitClient) -> Result<FitbitToken> {
    let store = config.credential_store();
    let token = store.load()?.ok_or(SleepLogError::NotAuthenticated)?;

    let missing = missing_scopes(config, &token);
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "stored token lacks configured scopes");
    }

    if !token.is_expired() {
        return Ok(token);
    }

    let app = config.oauth_app().ok_or_else(|| {
        SleepLogError::config(
            "Access token expired and no client_id/client_secret configured to refresh it",
        )
    })?;

    eprintln!("Refreshing access token...");
    let refreshed = client.refresh_token(&app, &token).await?;
    store.save(&refreshed)?;

    Ok(refreshed)
}

/// Provider for `config`, with a usable token
pub async fn provider(config: &Config) -> Result<FitbitProvider> {
    let client = FitbitClient::new_with_base_url(&config.api_base_url)?;
    let token = authorized_token(config, &client).await?;
    Ok(FitbitProvider::new(client, token))
}

fn missing_scopes<'a>(config: &'a Config, token: &FitbitToken) -> Vec<&'a str> {
    // Tokens imported without scope information are trusted
    if token.scope.is_empty() {
        return Vec::new();
    }
    config
        .scopes
        .iter()
        .map(String::as_str)
        .filter(|s| !token.has_scope(s))
        .collect()
}
