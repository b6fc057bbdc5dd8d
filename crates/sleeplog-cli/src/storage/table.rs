//! CSV persistence for the sleep table
//!
//! One header row, one row per record, ascending by date. Writes go to a
//! sibling temp file which is renamed over the table, so readers never see a
//! truncated file.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, SleepLogError};
use crate::models::{SleepRecord, SleepTable};

/// Column order of the persisted table
pub const COLUMNS: [&str; 10] = [
    "date",
    "minutesAfterWakeup",
    "minutesToFallAsleep",
    "startTime",
    "deep",
    "light",
    "rem",
    "wake",
    "efficiency",
    "duration",
];

/// Reads and writes the sleep table file
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("csv.tmp")
    }

    /// Load the persisted table.
    ///
    /// `Ok(None)` when no file exists. Any unreadable or malformed content is
    /// `CorruptData`; a partially parsed table is never returned.
    pub fn load(&self) -> Result<Option<SleepTable>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.corrupt(format!("cannot open: {}", e))),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader
            .headers()
            .map_err(|e| self.corrupt(format!("unreadable header: {}", e)))?
            .clone();

        if let Some(missing) = COLUMNS.into_iter().find(|c| !headers.iter().any(|h| h == *c)) {
            return Err(self.corrupt(format!("missing column `{}`", missing)));
        }

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<SleepRecord>().enumerate() {
            // Header is line 1
            let record = row.map_err(|e| self.corrupt(format!("row {}: {}", index + 2, e)))?;
            self.check_derived(&record, index + 2)?;
            records.push(record);
        }

        let table = SleepTable::from_records(records).map_err(|e| match e {
            SleepLogError::MergeConflict { date } => {
                self.corrupt(format!("date {} appears more than once", date))
            }
            other => other,
        })?;

        tracing::debug!(path = %self.path.display(), rows = table.len(), "loaded sleep table");
        Ok(Some(table))
    }

    /// Replace the persisted table with `table`
    pub fn save(&self, table: &SleepTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = self.write_rows(&temp_path, table) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &self.path)?;

        tracing::info!(path = %self.path.display(), rows = table.len(), "wrote sleep table");
        Ok(())
    }

    fn write_rows(&self, path: &Path, table: &SleepTable) -> Result<()> {
        // Header is written by hand so an empty table still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(COLUMNS)?;
        for record in table {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Stored `duration` and `efficiency` must follow from the stage minutes
    fn check_derived(&self, record: &SleepRecord, line: usize) -> Result<()> {
        let expected = SleepRecord::new(
            record.date,
            record.start_time,
            record.minutes_after_wakeup,
            record.minutes_to_fall_asleep,
            record.stage_minutes(),
        );

        if record.duration != expected.duration {
            return Err(self.corrupt(format!(
                "row {}: duration {} does not match stage minutes ({})",
                line, record.duration, expected.duration
            )));
        }
        if record.efficiency != expected.efficiency {
            return Err(self.corrupt(format!(
                "row {}: efficiency {:?} does not match stage minutes ({:?})",
                line, record.efficiency, expected.efficiency
            )));
        }
        Ok(())
    }

    fn corrupt(&self, reason: String) -> SleepLogError {
        SleepLogError::corrupt(&self.path, reason)
    }
}
