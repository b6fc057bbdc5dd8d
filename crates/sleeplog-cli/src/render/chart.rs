//! Bar charts drawn with ratatui into an off-screen buffer and printed as text

use std::io::Write;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget};

use super::{fmt_efficiency, Renderer};
use crate::error::Result;
use crate::metrics::{ChartData, Medians};
use crate::models::Stage;

/// Colour per stage
fn stage_color(stage: Stage) -> Color {
    match stage {
        Stage::Wake => Color::Magenta,
        Stage::Rem => Color::Cyan,
        Stage::Light => Color::Green,
        Stage::Deep => Color::Blue,
    }
}

/// Efficiency bar chart above a grouped stage-percentage chart
pub struct ChartRenderer {
    /// Rows inside each chart's border
    pub height: u16,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self { height: 14 }
    }
}

const EFFICIENCY_BAR_WIDTH: u16 = 5;
const STAGE_BAR_WIDTH: u16 = 3;
const GROUP_GAP: u16 = 2;
const MIN_WIDTH: u16 = 32;

impl ChartRenderer {
    fn efficiency_chart(data: &ChartData) -> (BarChart<'static>, u16) {
        let bars: Vec<Bar> = data
            .efficiency
            .iter()
            .map(|point| {
                Bar::default()
                    .value(point.efficiency.map(|e| (e * 100.0).round() as u64).unwrap_or(0))
                    .text_value(fmt_efficiency(point.efficiency))
                    .label(Line::from(point.date.format("%m-%d").to_string()))
            })
            .collect();

        let n = bars.len() as u16;
        let width = n * (EFFICIENCY_BAR_WIDTH + 1) + 1;

        let chart = BarChart::default()
            .block(Block::default().title(" Sleep Efficiency ").borders(Borders::ALL))
            .bar_width(EFFICIENCY_BAR_WIDTH)
            .bar_gap(1)
            .max(100)
            .data(BarGroup::default().bars(&bars));

        (chart, width)
    }

    fn stages_chart(data: &ChartData) -> (BarChart<'static>, u16) {
        let mut chart = BarChart::default()
            .block(Block::default().title(" Sleep Stages % ").borders(Borders::ALL))
            .bar_width(STAGE_BAR_WIDTH)
            .bar_gap(0)
            .group_gap(GROUP_GAP)
            .max(100);

        for day in &data.stages.daily {
            let bars: Vec<Bar> = [Stage::Wake, Stage::Rem, Stage::Light, Stage::Deep]
                .into_iter()
                .map(|stage| {
                    let pct = day.percentages.map(|p| p.get(stage));
                    Bar::default()
                        .value(pct.map(|p| p.round() as u64).unwrap_or(0))
                        .text_value(pct.map(|p| format!("{:.0}", p)).unwrap_or_default())
                        .label(Line::from(stage.as_str()[..1].to_uppercase()))
                        .style(Style::default().fg(stage_color(stage)))
                })
                .collect();

            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(day.date.format("%m-%d").to_string()))
                    .bars(&bars),
            );
        }

        let n = data.stages.daily.len() as u16;
        let width = n * (4 * STAGE_BAR_WIDTH + GROUP_GAP) + 2;

        (chart, width)
    }

    fn draw(&self, chart: BarChart<'_>, width: u16, out: &mut dyn Write) -> Result<()> {
        let area = Rect::new(0, 0, width.max(MIN_WIDTH), self.height + 2);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);

        for row in buf.content.chunks(area.width as usize) {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

impl Renderer for ChartRenderer {
    fn render(&self, data: &ChartData, out: &mut dyn Write) -> Result<()> {
        if data.is_empty() {
            writeln!(out, "No sleep data.")?;
            return Ok(());
        }

        let (chart, width) = Self::efficiency_chart(data);
        self.draw(chart, width, out)?;
        writeln!(out)?;

        let (chart, width) = Self::stages_chart(data);
        self.draw(chart, width, out)?;
        writeln!(out, "W=wake R=rem L=light D=deep")?;

        match &data.stages.medians {
            Medians::Values(m) => writeln!(
                out,
                "Median %  deep {:.1}  light {:.1}  rem {:.1}  wake {:.1}",
                m.deep, m.light, m.rem, m.wake
            )?,
            Medians::NoData => writeln!(out, "Median %  no stage data")?,
        }

        Ok(())
    }
}
