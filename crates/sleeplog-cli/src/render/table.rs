//! Plain text table

use std::io::Write;

use super::{fmt_efficiency, fmt_percent, Renderer};
use crate::error::Result;
use crate::metrics::{ChartData, Medians};
use crate::models::Stage;

pub struct TableRenderer;

impl Renderer for TableRenderer {
    fn render(&self, data: &ChartData, out: &mut dyn Write) -> Result<()> {
        if data.is_empty() {
            writeln!(out, "No sleep data.")?;
            return Ok(());
        }

        writeln!(
            out,
            "{:<16} {:>6} {:>7} {:>7} {:>7} {:>7}",
            "Date", "Eff", "Deep%", "Light%", "REM%", "Wake%"
        )?;
        writeln!(out, "{}", "-".repeat(55))?;

        for (point, day) in data.efficiency.iter().zip(&data.stages.daily) {
            let pct = |stage: Stage| fmt_percent(day.percentages.map(|p| p.get(stage)));
            writeln!(
                out,
                "{:<16} {:>6} {:>7} {:>7} {:>7} {:>7}",
                point.date.format("%a %Y-%m-%d").to_string(),
                fmt_efficiency(point.efficiency),
                pct(Stage::Deep),
                pct(Stage::Light),
                pct(Stage::Rem),
                pct(Stage::Wake),
            )?;
        }

        writeln!(out, "{}", "-".repeat(55))?;
        match &data.stages.medians {
            Medians::Values(m) => writeln!(
                out,
                "{:<16} {:>6} {:>7.1} {:>7.1} {:>7.1} {:>7.1}",
                "Median", "", m.deep, m.light, m.rem, m.wake
            )?,
            Medians::NoData => writeln!(out, "{:<16} no stage data", "Median")?,
        }

        writeln!(out, "\nShowing {} nights", data.efficiency.len())?;
        Ok(())
    }
}
