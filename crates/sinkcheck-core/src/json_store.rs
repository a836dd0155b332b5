//! JSON-lines result store
//!
//! One serialized [`VerdictRecord`] per line, appended as verdicts land.
//! A session that dies halfway leaves every prior verdict on disk, and the
//! same file accumulates results across sessions.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::{ResultStore, StoreResult, VerdictRecord};

/// File-backed append-only store.
///
/// Writes are small and synchronous; `record` hands the line to the OS,
/// `flush` syncs the file to disk.
pub struct JsonResultStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonResultStore {
    /// Open (or create) a results file in append mode.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::Open(format!("{}: {e}", path.display())))?;
        Ok(JsonResultStore {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultStore for JsonResultStore {
    async fn record(&self, record: &VerdictRecord) -> StoreResult<()> {
        let line = serde_json::to_string(record)?;
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{line}").map_err(|e| StoreError::Write(e.to_string()))
    }

    async fn flush(&self) -> StoreResult<()> {
        let file = self.file.lock().unwrap();
        file.sync_all().map_err(|e| StoreError::Flush(e.to_string()))
    }
}

/// Read a results file back, newest records last. Blank lines are skipped.
pub fn read_records(path: impl AsRef<Path>) -> StoreResult<Vec<VerdictRecord>> {
    let file = File::open(path.as_ref())
        .map_err(|e| StoreError::Open(format!("{}: {e}", path.as_ref().display())))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| StoreError::Read(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
