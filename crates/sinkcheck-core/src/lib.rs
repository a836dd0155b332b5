//! sinkcheck session core
//!
//! The session state machine and the collaborator seams it drives: a
//! pipeline runtime, a human verdict source and an append-only result
//! store. In-memory fakes are provided for testing via the `fakes` module;
//! the process-backed runtime lives in `sinkcheck-gst`.

pub mod error;
pub mod fakes;
pub mod json_store;
pub mod plan;
pub mod runtime;
pub mod session;
pub mod sink;
pub mod store;
pub mod telemetry;
pub mod verdict;

pub use error::{RuntimeError, SessionError, StoreError, VerdictError};
pub use json_store::{read_records, JsonResultStore};
pub use plan::TestPlan;
pub use runtime::{
    NoopSurfaceBinder, PipelineTicket, RuntimeResult, SinkCapabilities, SinkRuntime, StartOutcome,
    StartReport, SurfaceBinder,
};
pub use session::{SessionPhase, SessionReport, TestSession};
pub use sink::{SinkClass, SinkId};
pub use store::{ResultStore, StoreResult, VerdictRecord};
pub use telemetry::init_tracing;
pub use verdict::{VerdictPrompt, VerdictSource};
