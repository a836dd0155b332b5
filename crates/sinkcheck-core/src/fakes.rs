//! In-memory fakes for the collaborator seams (testing only)
//!
//! `ScriptedRuntime`, `ScriptedVerdicts` and `MemoryResultStore` satisfy the
//! trait contracts without a media stack or a person present, and keep call
//! logs so tests can assert ordering and release discipline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{RuntimeError, VerdictError};
use crate::runtime::{
    PipelineTicket, RuntimeResult, SinkCapabilities, SinkRuntime, StartOutcome, StartReport,
    SurfaceBinder,
};
use crate::sink::{SinkClass, SinkId};
use crate::store::{ResultStore, StoreResult, VerdictRecord};
use crate::verdict::{VerdictPrompt, VerdictSource};
use sinkcheck_caps::{CapsStructure, Configuration};

// ---------------------------------------------------------------------------
// ScriptedRuntime
// ---------------------------------------------------------------------------

/// What a scripted runtime knows about one sink.
#[derive(Debug, Clone)]
pub struct SinkProfile {
    pub class: SinkClass,
    pub descriptors: Vec<CapsStructure>,
}

#[derive(Default)]
struct RuntimeState {
    sinks: HashMap<String, SinkProfile>,
    /// Failure reasons handed out to upcoming starts, front first
    scripted_failures: Vec<String>,
    fail_every_start: Option<String>,
    next_ticket: u64,
    active: HashMap<u64, SinkId>,
    starts: Vec<Configuration>,
    stop_calls: u64,
    max_active: usize,
}

/// Scripted pipeline runtime backed by plain maps.
///
/// Starts succeed unless a failure was scripted; active pipelines are
/// tracked so tests can assert that no two overlap and that every start is
/// eventually released.
#[derive(Default)]
pub struct ScriptedRuntime {
    state: Mutex<RuntimeState>,
    binder: Option<Arc<dyn SurfaceBinder>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink with its class and advertised descriptors.
    pub fn with_sink(self, name: &str, profile: SinkProfile) -> Self {
        self.state
            .lock()
            .unwrap()
            .sinks
            .insert(name.to_string(), profile);
        self
    }

    /// Invoke `binder` whenever a video pipeline reaches playback.
    pub fn with_surface_binder(mut self, binder: Arc<dyn SurfaceBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Script the next start to report the given failure.
    pub fn fail_next_start(&self, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .scripted_failures
            .push(reason.to_string());
    }

    /// Make every start report the given failure.
    pub fn fail_every_start(&self, reason: &str) {
        self.state.lock().unwrap().fail_every_start = Some(reason.to_string());
    }

    /// Configurations handed to `start`, in call order.
    pub fn starts(&self) -> Vec<Configuration> {
        self.state.lock().unwrap().starts.clone()
    }

    pub fn stop_calls(&self) -> u64 {
        self.state.lock().unwrap().stop_calls
    }

    /// Pipelines currently live.
    pub fn active_count(&self) -> usize {
        self.state.lock().unwrap().active.len()
    }

    /// Most pipelines ever live at once.
    pub fn max_active(&self) -> usize {
        self.state.lock().unwrap().max_active
    }
}

#[async_trait]
impl SinkRuntime for ScriptedRuntime {
    async fn list_capabilities(&self, sink: &SinkId) -> RuntimeResult<SinkCapabilities> {
        let state = self.state.lock().unwrap();
        let profile = state
            .sinks
            .get(sink.as_str())
            .ok_or_else(|| RuntimeError::SinkNotFound(sink.clone()))?;
        Ok(SinkCapabilities {
            class: profile.class,
            descriptors: profile.descriptors.clone(),
        })
    }

    async fn start(&self, sink: &SinkId, config: &Configuration) -> RuntimeResult<StartReport> {
        let (report, class) = {
            let mut state = self.state.lock().unwrap();
            let profile = state
                .sinks
                .get(sink.as_str())
                .ok_or_else(|| RuntimeError::SinkNotFound(sink.clone()))?;
            let class = profile.class;

            state.starts.push(config.clone());
            state.next_ticket += 1;
            let ticket = PipelineTicket(state.next_ticket);

            let failure = if state.scripted_failures.is_empty() {
                state.fail_every_start.clone()
            } else {
                Some(state.scripted_failures.remove(0))
            };

            let outcome = match failure {
                Some(reason) => StartOutcome::Failed(reason),
                None => {
                    state.active.insert(ticket.0, sink.clone());
                    state.max_active = state.max_active.max(state.active.len());
                    StartOutcome::Playing
                }
            };
            (StartReport { ticket, outcome }, class)
        };

        if matches!(report.outcome, StartOutcome::Playing) && class == SinkClass::Video {
            if let Some(binder) = &self.binder {
                binder.bind(sink);
            }
        }
        Ok(report)
    }

    async fn stop(&self, ticket: PipelineTicket) -> RuntimeResult<()> {
        let mut state = self.state.lock().unwrap();
        state.stop_calls += 1;
        state.active.remove(&ticket.0);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedVerdicts
// ---------------------------------------------------------------------------

/// Verdict source that answers from a prepared list and reports the
/// interface closed once the list runs out.
#[derive(Default)]
pub struct ScriptedVerdicts {
    answers: Mutex<Vec<bool>>,
    prompts: Mutex<Vec<VerdictPrompt>>,
}

impl ScriptedVerdicts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(answers: Vec<bool>) -> Self {
        ScriptedVerdicts {
            answers: Mutex::new(answers),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<VerdictPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn asked_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl VerdictSource for ScriptedVerdicts {
    async fn ask(&self, prompt: &VerdictPrompt) -> Result<bool, VerdictError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            return Err(VerdictError::Closed);
        }
        Ok(answers.remove(0))
    }
}

// ---------------------------------------------------------------------------
// MemoryResultStore
// ---------------------------------------------------------------------------

/// In-memory verdict store backed by a vector.
#[derive(Default)]
pub struct MemoryResultStore {
    records: Mutex<Vec<VerdictRecord>>,
    flushes: Mutex<u64>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<VerdictRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn flush_count(&self) -> u64 {
        *self.flushes.lock().unwrap()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn record(&self, record: &VerdictRecord) -> StoreResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn flush(&self) -> StoreResult<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CountingBinder
// ---------------------------------------------------------------------------

/// Surface binder that only counts invocations.
#[derive(Debug, Default)]
pub struct CountingBinder {
    binds: Mutex<u64>,
}

impl CountingBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_count(&self) -> u64 {
        *self.binds.lock().unwrap()
    }
}

impl SurfaceBinder for CountingBinder {
    fn bind(&self, _sink: &SinkId) {
        *self.binds.lock().unwrap() += 1;
    }
}
