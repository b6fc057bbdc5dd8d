//! Derived sleep metrics and the data handed to renderers
//!
//! Stage percentages are per night: stage minutes over that night's duration,
//! rounded to 0.1%. Medians are taken per stage across the nights that have a
//! non-zero duration.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::sleep::round_to;
use crate::models::{SleepRecord, SleepTable, Stage, StageValues};

/// Efficiency of one night
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyPoint {
    pub date: NaiveDate,
    pub efficiency: Option<f64>,
}

/// Stage percentages of one night. `None` for a zero-duration night.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStages {
    pub date: NaiveDate,
    pub percentages: Option<StageValues<f64>>,
}

/// Per-stage medians, or an explicit marker that there was nothing to take
/// a median of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "values", rename_all = "snake_case")]
pub enum Medians {
    NoData,
    Values(StageValues<f64>),
}

impl Medians {
    pub fn values(&self) -> Option<&StageValues<f64>> {
        match self {
            Medians::NoData => None,
            Medians::Values(values) => Some(values),
        }
    }
}

/// Stage percentages for every night plus medians
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub daily: Vec<DailyStages>,
    pub medians: Medians,
}

/// Everything a renderer needs, in ascending date order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub efficiency: Vec<EfficiencyPoint>,
    pub stages: StageReport,
}

impl ChartData {
    pub fn from_table(table: &SleepTable) -> Self {
        Self {
            efficiency: efficiency_series(table),
            stages: StageReport::from_table(table),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.efficiency.is_empty()
    }
}

impl StageReport {
    pub fn from_table(table: &SleepTable) -> Self {
        let daily: Vec<DailyStages> = table
            .iter()
            .map(|record| DailyStages {
                date: record.date,
                percentages: stage_percentages(record),
            })
            .collect();

        let nights: Vec<&StageValues<f64>> =
            daily.iter().filter_map(|d| d.percentages.as_ref()).collect();

        let medians = if nights.is_empty() {
            Medians::NoData
        } else {
            // Non-empty, so every stage has a median
            Medians::Values(StageValues::from_fn(|stage| {
                median(nights.iter().map(|p| p.get(stage)).collect()).unwrap_or_default()
            }))
        };

        Self { daily, medians }
    }
}

/// `(date, efficiency)` for every night
pub fn efficiency_series(table: &SleepTable) -> Vec<EfficiencyPoint> {
    table
        .iter()
        .map(|record| EfficiencyPoint {
            date: record.date,
            efficiency: record.efficiency,
        })
        .collect()
}

/// Share of the night spent in `stage`, as a percentage with one decimal.
pub fn stage_percentage(record: &SleepRecord, stage: Stage) -> Option<f64> {
    if record.duration == 0 {
        return None;
    }
    let fraction = round_to(record.minutes(stage) as f64 / record.duration as f64, 3);
    Some(round_to(fraction * 100.0, 1))
}

pub fn stage_percentages(record: &SleepRecord) -> Option<StageValues<f64>> {
    if record.duration == 0 {
        return None;
    }
    Some(StageValues::from_fn(|stage| {
        stage_percentage(record, stage).unwrap_or_default()
    }))
}

/// Median; the mean of the two middle values for an even count.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
