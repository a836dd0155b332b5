//! Verdict persistence seam

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::sink::SinkId;
use sinkcheck_caps::Configuration;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One recorded verdict: which sink, which exact configuration, what the
/// human (or the auto-fail path) decided, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub sink: SinkId,
    pub configuration: Configuration,
    pub passed: bool,
    pub recorded_at: DateTime<Utc>,
}

impl VerdictRecord {
    pub fn new(sink: SinkId, configuration: Configuration, passed: bool) -> Self {
        VerdictRecord {
            sink,
            configuration,
            passed,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only verdict ledger.
///
/// Guarantees:
/// - Records are immutable once accepted and arrive in session order.
/// - `record` is called once per tested configuration, as its verdict
///   lands, so an interrupted session loses at most the in-flight one.
/// - `flush` pushes everything accepted so far to durable storage; the
///   session flushes on completion and on early termination.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append one verdict record.
    async fn record(&self, record: &VerdictRecord) -> StoreResult<()>;

    /// Make everything accepted so far durable.
    async fn flush(&self) -> StoreResult<()>;
}
