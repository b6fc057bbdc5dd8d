//! Domain models for sleep logs

pub mod sleep;
pub mod table;

pub use sleep::{SleepRecord, Stage, StageValues};
pub use table::SleepTable;
