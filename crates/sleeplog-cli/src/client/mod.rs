pub mod api;
pub mod provider;
pub mod tokens;

pub use api::{FitbitClient, OAuthApp, DEFAULT_BASE_URL};
pub use provider::{FitbitProvider, SleepProvider};
pub use tokens::FitbitToken;
