//! Source of raw sleep logs for a date range

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use super::api::FitbitClient;
use super::tokens::FitbitToken;
use crate::error::Result;

/// Longest range the sleep log endpoint accepts in one request
pub const MAX_RANGE_DAYS: u32 = 100;

/// Provider of raw sleep log records.
///
/// `start` and `end` are inclusive. Records come back in whatever order the
/// provider chooses; an empty vector means nothing was logged in the range.
#[async_trait]
pub trait SleepProvider {
    async fn sleep_logs(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<serde_json::Value>>;
}

#[derive(Debug, Deserialize)]
struct SleepLogsResponse {
    #[serde(default)]
    sleep: Vec<serde_json::Value>,
}

/// Sleep logs from the Fitbit Web API
pub struct FitbitProvider {
    client: FitbitClient,
    token: FitbitToken,
}

impl FitbitProvider {
    pub fn new(client: FitbitClient, token: FitbitToken) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl SleepProvider for FitbitProvider {
    async fn sleep_logs(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<serde_json::Value>> {
        let mut logs = Vec::new();

        for (from, to) in split_range(start, end, MAX_RANGE_DAYS) {
            let path = format!(
                "/1.2/user/-/sleep/date/{}/{}.json",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            );
            let response: SleepLogsResponse = self.client.get_json(&self.token, &path).await?;
            tracing::debug!(%from, %to, logs = response.sleep.len(), "fetched sleep window");
            logs.extend(response.sleep);
        }

        Ok(logs)
    }
}

/// Split an inclusive range into consecutive windows of at most `window_days`.
pub(crate) fn split_range(
    start: NaiveDate,
    end: NaiveDate,
    window_days: u32,
) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::new();
    if window_days == 0 || start > end {
        return windows;
    }

    let span = Duration::days(window_days as i64 - 1);
    let mut from = start;
    while from <= end {
        let to = (from + span).min(end);
        windows.push((from, to));
        from = to + Duration::days(1);
    }

    windows
}
