//! Incremental sync of the local sleep table
//!
//! Provides:
//! - Gap detection between the latest stored night and today
//! - Full backfill from the epoch date when no table exists
//! - Decode + collision-checked merge of fetched logs
//! - Atomic persistence of the merged table

pub mod decode;

use std::fmt;

use chrono::{Duration, NaiveDate};

use crate::client::SleepProvider;
use crate::error::Result;
use crate::models::SleepTable;
use crate::storage::TableStore;

pub use decode::{decode_record, decode_records};

/// What a sync run has to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPlan {
    /// Nothing to request
    UpToDate,
    /// Request `[from, to]`; `backfill` when building the table from scratch
    Fetch {
        from: NaiveDate,
        to: NaiveDate,
        backfill: bool,
    },
}

/// Decide the request range from the latest stored date.
pub fn plan_sync(latest: Option<NaiveDate>, epoch: NaiveDate, today: NaiveDate) -> SyncPlan {
    let (from, backfill) = match latest {
        Some(latest) if latest >= today => return SyncPlan::UpToDate,
        Some(latest) => (latest + Duration::days(1), false),
        None => (epoch, true),
    };

    if from > today {
        return SyncPlan::UpToDate;
    }

    SyncPlan::Fetch {
        from,
        to: today,
        backfill,
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    /// Range requested from the provider, if any
    pub requested: Option<(NaiveDate, NaiveDate)>,
    /// Raw logs returned by the provider
    pub fetched: usize,
    /// Records added to the table
    pub appended: usize,
    /// Rows in the table after the run
    pub total: usize,
    /// Whether the table file was rewritten
    pub persisted: bool,
    /// Whether the run was a backfill from the epoch
    pub backfill: bool,
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = match self.requested {
            None => return write!(f, "already up to date ({} nights stored)", self.total),
            Some(range) => range,
        };

        write!(
            f,
            "requested {} to {}, fetched {}, added {}, {} nights stored{}",
            from,
            to,
            self.fetched,
            self.appended,
            self.total,
            if self.persisted { "" } else { " (table unchanged)" }
        )?;

        if self.backfill && self.total == 0 {
            write!(
                f,
                "; no sleep logs since {}, the next sync repeats the full backfill",
                from
            )?;
        }
        Ok(())
    }
}

/// Result of a sync run
#[derive(Debug)]
pub struct SyncOutcome {
    pub table: SleepTable,
    pub stats: SyncStats,
}

/// Sync engine keeping the local table current with a provider
pub struct SyncEngine<P> {
    provider: P,
    store: TableStore,
    epoch: NaiveDate,
}

impl<P: SleepProvider> SyncEngine<P> {
    pub fn new(provider: P, store: TableStore, epoch: NaiveDate) -> Self {
        Self {
            provider,
            store,
            epoch,
        }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Bring the table up to `today` and return it.
    ///
    /// Any failure leaves the persisted table as it was.
    pub async fn run(&self, today: NaiveDate) -> Result<SyncOutcome> {
        let local = self.store.load()?;
        let latest = local.as_ref().and_then(|t| t.latest_date());
        let mut table = local.unwrap_or_default();

        let plan = plan_sync(latest, self.epoch, today);
        tracing::info!(?latest, %today, ?plan, "planned sync");

        let (from, to, backfill) = match plan {
            SyncPlan::UpToDate => {
                let stats = SyncStats {
                    total: table.len(),
                    ..SyncStats::default()
                };
                return Ok(SyncOutcome { table, stats });
            }
            SyncPlan::Fetch { from, to, backfill } => (from, to, backfill),
        };

        let raw = self.provider.sleep_logs(from, to).await?;
        let mut stats = SyncStats {
            requested: Some((from, to)),
            fetched: raw.len(),
            backfill,
            ..SyncStats::default()
        };

        if raw.is_empty() && backfill {
            tracing::warn!(%from, %to, "provider has no sleep logs since the epoch; the next sync repeats the backfill");
        }

        if raw.is_empty() && !backfill {
            tracing::info!(%from, %to, "provider returned no new sleep logs");
            stats.total = table.len();
            return Ok(SyncOutcome { table, stats });
        }

        let records = decode_records(&raw)?;
        if let Some(outside) = records.iter().find(|r| r.date < from || r.date > to) {
            tracing::warn!(date = %outside.date, %from, %to, "provider returned a log outside the requested range");
        }

        stats.appended = table.merge(records)?;
        stats.total = table.len();

        self.store.save(&table)?;
        stats.persisted = true;

        tracing::info!(appended = stats.appended, total = stats.total, "sync complete");
        Ok(SyncOutcome { table, stats })
    }
}
