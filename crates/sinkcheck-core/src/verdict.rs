//! Human verdict seam

use async_trait::async_trait;

use crate::error::VerdictError;
use crate::sink::SinkId;
use sinkcheck_caps::Configuration;

/// What the person at the machine is asked to judge.
#[derive(Debug, Clone)]
pub struct VerdictPrompt {
    pub sink: SinkId,
    pub configuration: Configuration,
    /// 1-based position within the session
    pub position: usize,
    pub total: usize,
}

/// Source of pass/fail answers while a pipeline is playing.
///
/// Guarantees:
/// - `ask` suspends until an answer arrives; the session stays parked on the
///   live pipeline meanwhile.
/// - `Err(VerdictError::Closed)` means the interface is gone for good. The
///   session treats it as early termination, never as a verdict.
#[async_trait]
pub trait VerdictSource: Send + Sync {
    async fn ask(&self, prompt: &VerdictPrompt) -> Result<bool, VerdictError>;
}
