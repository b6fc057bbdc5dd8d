pub mod auth;
pub mod report;
pub mod sync;

pub use auth::{import as auth_import, logout, status};
pub use report::run as report;
pub use sync::run as sync_run;

use chrono::{Local, NaiveDate};

use crate::error::{Result, SleepLogError};

/// Parse a `YYYY-MM-DD` argument, defaulting to today's local date
pub fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| SleepLogError::InvalidDateFormat(s.to_string())),
        None => Ok(Local::now().date_naive()),
    }
}
