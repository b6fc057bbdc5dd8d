//! Report command: sync, derive metrics, render

use std::io::{self, Write};

use crate::config::Config;
use crate::error::Result;
use crate::metrics::ChartData;
use crate::models::SleepTable;
use crate::render::RendererKind;
use crate::storage::TableStore;

use super::sync::sync_table;

/// Render the last `days` nights, syncing first unless `offline`
pub async fn run(
    config: &Config,
    format: RendererKind,
    days: usize,
    offline: bool,
    today: Option<String>,
) -> Result<()> {
    let table = if offline {
        match TableStore::new(&config.table_path).load()? {
            Some(table) => table,
            None => {
                println!("No sleep table found at: {}", config.table_path.display());
                println!("Run 'sleeplog sync' to create one.");
                return Ok(());
            }
        }
    } else {
        let outcome = sync_table(config, today.as_deref()).await?;
        tracing::info!(stats = %outcome.stats, "synced before report");
        outcome.table
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&table, format, days, &mut out)?;
    out.flush()?;

    Ok(())
}

/// Render the last `days` nights of `table`
pub fn write_report(
    table: &SleepTable,
    format: RendererKind,
    days: usize,
    out: &mut dyn Write,
) -> Result<()> {
    let data = ChartData::from_table(&table.tail(days));
    format.renderer().render(&data, out)
}
