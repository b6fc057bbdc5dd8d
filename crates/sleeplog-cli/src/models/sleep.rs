//! Sleep log record as stored in the local table
//!
//! One record per calendar date of sleep onset. Field names follow the
//! provider's camelCase so the CSV header reads the same as the API payload.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sleep stage buckets. Minutes in the four stages sum to the sleep period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Deep,
    Light,
    Rem,
    Wake,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Deep, Stage::Light, Stage::Rem, Stage::Wake];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Deep => "deep",
            Stage::Light => "light",
            Stage::Rem => "rem",
            Stage::Wake => "wake",
        }
    }

    /// Whether the stage counts as sleep for efficiency
    pub fn is_asleep(&self) -> bool {
        !matches!(self, Stage::Wake)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageValues<T> {
    pub deep: T,
    pub light: T,
    pub rem: T,
    pub wake: T,
}

impl<T: Copy> StageValues<T> {
    /// Build from a function of the stage
    pub fn from_fn(mut f: impl FnMut(Stage) -> T) -> Self {
        Self {
            deep: f(Stage::Deep),
            light: f(Stage::Light),
            rem: f(Stage::Rem),
            wake: f(Stage::Wake),
        }
    }

    pub fn get(&self, stage: Stage) -> T {
        match stage {
            Stage::Deep => self.deep,
            Stage::Light => self.light,
            Stage::Rem => self.rem,
            Stage::Wake => self.wake,
        }
    }
}

/// A single night of sleep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    pub date: NaiveDate,
    pub minutes_after_wakeup: u32,
    pub minutes_to_fall_asleep: u32,
    pub start_time: NaiveDateTime,
    pub deep: u32,
    pub light: u32,
    pub rem: u32,
    pub wake: u32,
    /// Asleep share of the period, 2 decimals. `None` when `duration` is 0.
    pub efficiency: Option<f64>,
    pub duration: u32,
}

impl SleepRecord {
    /// Build a record from raw stage minutes, computing the derived fields.
    pub fn new(
        date: NaiveDate,
        start_time: NaiveDateTime,
        minutes_after_wakeup: u32,
        minutes_to_fall_asleep: u32,
        stages: StageValues<u32>,
    ) -> Self {
        let duration = stages.deep + stages.light + stages.rem + stages.wake;
        let asleep = stages.deep + stages.light + stages.rem;

        Self {
            date,
            minutes_after_wakeup,
            minutes_to_fall_asleep,
            start_time,
            deep: stages.deep,
            light: stages.light,
            rem: stages.rem,
            wake: stages.wake,
            efficiency: efficiency(asleep, duration),
            duration,
        }
    }

    pub fn minutes(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Deep => self.deep,
            Stage::Light => self.light,
            Stage::Rem => self.rem,
            Stage::Wake => self.wake,
        }
    }

    pub fn stage_minutes(&self) -> StageValues<u32> {
        StageValues::from_fn(|stage| self.minutes(stage))
    }

    pub fn asleep_minutes(&self) -> u32 {
        Stage::ALL
            .iter()
            .filter(|s| s.is_asleep())
            .map(|s| self.minutes(*s))
            .sum()
    }
}

/// Efficiency for a period; a zero-length period has none.
pub fn efficiency(asleep: u32, duration: u32) -> Option<f64> {
    if duration == 0 {
        return None;
    }
    Some(round_to(asleep as f64 / duration as f64, 2))
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
