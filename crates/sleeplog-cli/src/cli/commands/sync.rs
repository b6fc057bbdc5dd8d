//! Sync command for sleeplog

use crate::config::Config;
use crate::error::Result;
use crate::storage::TableStore;
use crate::sync::{SyncEngine, SyncOutcome};

use super::auth::provider;
use super::resolve_date;

/// Bring the local table up to date with the provider
pub async fn run(config: &Config, today: Option<String>) -> Result<()> {
    println!("Using table: {}", config.table_path.display());
    let outcome = sync_table(config, today.as_deref()).await?;
    println!("Sync complete: {}", outcome.stats);
    Ok(())
}

/// Shared by `sync` and `report`
pub(crate) async fn sync_table(config: &Config, today: Option<&str>) -> Result<SyncOutcome> {
    let today = resolve_date(today)?;

    let store = TableStore::new(&config.table_path);
    let provider = provider(config).await?;
    let engine = SyncEngine::new(provider, store, config.epoch_date);
    engine.run(today).await
}
