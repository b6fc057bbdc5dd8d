//! Renderers for derived sleep metrics
//!
//! Each output format is a `Renderer` over the same `ChartData`, chosen by
//! `RendererKind` from the config file or `--format`.

mod chart;
mod json;
mod table;

pub use chart::ChartRenderer;
pub use json::JsonRenderer;
pub use table::TableRenderer;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::ChartData;

/// Consumer of finalized chart data
pub trait Renderer {
    fn render(&self, data: &ChartData, out: &mut dyn Write) -> Result<()>;
}

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Table,
    Json,
    Chart,
}

impl RendererKind {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            RendererKind::Table => Box::new(TableRenderer),
            RendererKind::Json => Box::new(JsonRenderer),
            RendererKind::Chart => Box::new(ChartRenderer::default()),
        }
    }
}

/// Percentage cell, `-` when absent
pub(crate) fn fmt_percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Efficiency cell, `-` when absent
pub(crate) fn fmt_efficiency(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::metrics::ChartData;
    use crate::models::{SleepRecord, SleepTable, StageValues};

    pub fn chart_data() -> ChartData {
        let nights = [(1, 60, 120, 30, 10), (2, 0, 0, 0, 0), (3, 90, 200, 80, 30)];
        let table = SleepTable::from_records(nights.iter().map(|&(day, deep, light, rem, wake)| {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            SleepRecord::new(
                date,
                date.and_hms_opt(23, 0, 0).unwrap(),
                0,
                0,
                StageValues {
                    deep,
                    light,
                    rem,
                    wake,
                },
            )
        }))
        .unwrap();

        ChartData::from_table(&table)
    }
}
