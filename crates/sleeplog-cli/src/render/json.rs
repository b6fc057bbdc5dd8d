use std::io::Write;

use super::Renderer;
use crate::error::Result;
use crate::metrics::ChartData;

/// Pretty-printed JSON of the chart data
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, data: &ChartData, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, data)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures;

    #[test]
    fn test_json_shape() {
        let mut out = Vec::new();
        JsonRenderer.render(&fixtures::chart_data(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["efficiency"][0]["date"], "2024-01-01");
        assert_eq!(value["efficiency"][0]["efficiency"], 0.95);
        assert!(value["efficiency"][1]["efficiency"].is_null());
        assert_eq!(value["stages"]["daily"][0]["percentages"]["deep"], 27.3);
        assert!(value["stages"]["daily"][1]["percentages"].is_null());
        assert_eq!(value["stages"]["medians"]["status"], "values");
        assert!(value["stages"]["medians"]["values"]["rem"].is_number());
    }
}
