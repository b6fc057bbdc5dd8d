pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod render;
pub mod storage;
pub mod sync;

pub use error::{Result, SleepLogError};
pub use models::{SleepRecord, SleepTable};
