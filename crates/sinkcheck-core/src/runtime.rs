//! Pipeline runtime seam
//!
//! The session never touches a media stack directly; it talks to a
//! [`SinkRuntime`], which owns element resolution, capability discovery and
//! the lifetime of each constrained playback pipeline. A process-backed
//! implementation lives in `sinkcheck-gst`; a scripted one for tests lives
//! in the `fakes` module.

use async_trait::async_trait;

use crate::error::RuntimeError;
use crate::sink::{SinkClass, SinkId};
use sinkcheck_caps::{CapsStructure, Configuration};

/// Result type for runtime operations
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Opaque handle to a pipeline started by a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineTicket(pub u64);

impl std::fmt::Display for PipelineTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What capability discovery returned for one sink.
#[derive(Debug, Clone)]
pub struct SinkCapabilities {
    pub class: SinkClass,
    /// Advertised descriptors in declaration order; may be empty for sinks
    /// that accept anything
    pub descriptors: Vec<CapsStructure>,
}

/// Outcome of a start attempt.
///
/// A refused configuration is a normal outcome that the session turns into
/// an automatic failure verdict; only a malfunctioning runtime returns `Err`.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// The pipeline reached its playing state
    Playing,
    /// The pipeline rejected the configuration or died during startup
    Failed(String),
}

/// Handle and outcome returned by [`SinkRuntime::start`].
#[derive(Debug, Clone)]
pub struct StartReport {
    pub ticket: PipelineTicket,
    pub outcome: StartOutcome,
}

/// Media pipeline runtime.
///
/// Guarantees:
/// - `list_capabilities` brings the element to the minimal readiness needed
///   to read its sink-pad caps and leaves it idle again afterwards.
/// - `start` returns a report for every answerable request, including
///   refused configurations; `Err` means the runtime itself malfunctioned.
/// - `stop` is idempotent: unknown or already-stopped tickets are a no-op.
#[async_trait]
pub trait SinkRuntime: Send + Sync {
    /// Resolve a sink element and read its advertised capabilities.
    ///
    /// Returns [`RuntimeError::SinkNotFound`] when the identifier resolves
    /// to nothing, and [`RuntimeError::NotASink`] for elements of another
    /// class.
    async fn list_capabilities(&self, sink: &SinkId) -> RuntimeResult<SinkCapabilities>;

    /// Start a playback pipeline constrained to exactly `config`.
    async fn start(&self, sink: &SinkId, config: &Configuration) -> RuntimeResult<StartReport>;

    /// Tear down a previously started pipeline and release its resources.
    async fn stop(&self, ticket: PipelineTicket) -> RuntimeResult<()>;
}

/// Render-surface hook for video-capable runtimes.
///
/// Invoked when a live pipeline asks for a surface to draw into. Runtimes
/// that open their own windows never call it, and ignoring the request is
/// always safe.
pub trait SurfaceBinder: Send + Sync {
    fn bind(&self, sink: &SinkId);
}

/// Binder that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurfaceBinder;

impl SurfaceBinder for NoopSurfaceBinder {
    fn bind(&self, _sink: &SinkId) {}
}
