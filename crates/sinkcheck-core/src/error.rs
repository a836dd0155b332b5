//! Error types for session orchestration and the collaborator seams

use thiserror::Error;

use crate::sink::SinkId;
use sinkcheck_caps::CapsError;

/// Errors surfaced by pipeline runtime implementations
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The device identifier does not resolve to any sink element
    #[error("Sink element not found: {0}")]
    SinkNotFound(SinkId),

    /// The element exists but is not an audio or video sink
    #[error("Element '{sink}' is not an audio or video sink (klass: {klass})")]
    NotASink { sink: SinkId, klass: String },

    /// The advertised capabilities could not be read
    #[error("Capabilities of '{sink}' could not be read: {reason}")]
    CapsUnavailable { sink: SinkId, reason: String },

    /// The pipeline could not be brought up at all (spawn failure, not a
    /// refused configuration)
    #[error("Pipeline launch failed: {0}")]
    Launch(String),

    /// Teardown of a started pipeline failed
    #[error("Pipeline teardown failed: {0}")]
    Teardown(String),
}

/// Errors surfaced by verdict sources
#[derive(Error, Debug)]
pub enum VerdictError {
    /// The verdict interface has gone away for good (window closed, stdin
    /// at end of file)
    #[error("Verdict interface closed")]
    Closed,

    /// Reading a single verdict failed
    #[error("Verdict interface failure: {0}")]
    Io(String),
}

/// Errors surfaced by result stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open result store: {0}")]
    Open(String),

    #[error("Failed to read result store: {0}")]
    Read(String),

    #[error("Failed to write verdict record: {0}")]
    Write(String),

    #[error("Failed to flush result store: {0}")]
    Flush(String),

    #[error("Record serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors that end a test session before every configuration has a verdict
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Capability error: {0}")]
    Caps(#[from] CapsError),

    #[error("Pipeline runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// The human verdict interface went away mid-session; verdicts recorded
    /// before this point stay recorded
    #[error("Verdict collection ended early: {0}")]
    VerdictLost(#[from] VerdictError),

    #[error("Result store error: {0}")]
    Store(#[from] StoreError),
}
