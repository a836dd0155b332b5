//! Interactive test session state machine
//!
//! Drives one sink through its configuration sweep, one pipeline at a time.
//! Per configuration the observable order is fixed: start, then either the
//! human prompt or an automatic failure, then teardown, then the recorded
//! verdict. Teardown happens on every exit path, and a second pipeline is
//! never started before the previous one is released.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::plan::TestPlan;
use crate::runtime::{SinkRuntime, StartOutcome};
use crate::sink::SinkId;
use crate::store::{ResultStore, VerdictRecord};
use crate::verdict::{VerdictPrompt, VerdictSource};
use sinkcheck_caps::Configuration;

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Between configurations
    Idle,
    /// A start request is outstanding
    AwaitingPipelineResult,
    /// Playback is live, waiting on the human
    AwaitingHumanVerdict,
    /// Every configuration has a verdict
    Done,
}

/// Summary returned when a session runs to completion.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: String,
    pub sink: SinkId,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// One manual conformance session for one sink.
pub struct TestSession {
    session_id: String,
    sink: SinkId,
    configurations: Vec<Configuration>,
    runtime: Arc<dyn SinkRuntime>,
    verdicts: Arc<dyn VerdictSource>,
    store: Arc<dyn ResultStore>,
    cursor: usize,
    phase: SessionPhase,
    passed: usize,
    failed: usize,
}

impl TestSession {
    pub fn new(
        plan: &TestPlan,
        runtime: Arc<dyn SinkRuntime>,
        verdicts: Arc<dyn VerdictSource>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        TestSession {
            session_id: Uuid::new_v4().to_string(),
            sink: plan.sink.clone(),
            configurations: plan.configurations.clone(),
            runtime,
            verdicts,
            store,
            cursor: 0,
            phase: SessionPhase::Idle,
            passed: 0,
            failed: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Phase the session was last observed in; after an early termination
    /// this tells which step it died on.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Run every pending configuration to completion.
    ///
    /// Verdicts are recorded incrementally; when this returns an error, all
    /// configurations before the failing one already sit in the store, and
    /// the in-flight one has none.
    pub async fn run(&mut self) -> Result<SessionReport, SessionError> {
        let started = Instant::now();
        let total = self.configurations.len();
        info!(
            event = "session.started",
            session_id = %self.session_id,
            sink = %self.sink,
            configurations = total,
        );

        while self.cursor < self.configurations.len() {
            let config = self.configurations[self.cursor].clone();
            let position = self.cursor + 1;

            self.phase = SessionPhase::AwaitingPipelineResult;
            info!(
                event = "config.started",
                session_id = %self.session_id,
                position,
                total,
                caps = %config,
            );
            let report = self.runtime.start(&self.sink, &config).await?;

            let passed = match report.outcome {
                StartOutcome::Failed(ref reason) => {
                    // The sink refused the configuration: automatic failure,
                    // nobody is asked.
                    warn!(
                        event = "config.start_failed",
                        session_id = %self.session_id,
                        position,
                        reason = %reason,
                    );
                    false
                }
                StartOutcome::Playing => {
                    self.phase = SessionPhase::AwaitingHumanVerdict;
                    let prompt = VerdictPrompt {
                        sink: self.sink.clone(),
                        configuration: config.clone(),
                        position,
                        total,
                    };
                    match self.verdicts.ask(&prompt).await {
                        Ok(verdict) => verdict,
                        Err(err) => {
                            // The interface is gone. Release the pipeline,
                            // keep everything recorded so far, and report
                            // the termination to the caller.
                            if let Err(stop_err) = self.runtime.stop(report.ticket).await {
                                warn!(
                                    event = "config.teardown_failed",
                                    session_id = %self.session_id,
                                    error = %stop_err,
                                );
                            }
                            if let Err(flush_err) = self.store.flush().await {
                                warn!(
                                    event = "session.flush_failed",
                                    session_id = %self.session_id,
                                    error = %flush_err,
                                );
                            }
                            return Err(SessionError::VerdictLost(err));
                        }
                    }
                }
            };

            let record = VerdictRecord::new(self.sink.clone(), config, passed);
            self.runtime.stop(report.ticket).await?;
            self.store.record(&record).await?;
            info!(
                event = "config.recorded",
                session_id = %self.session_id,
                position,
                passed,
            );

            if passed {
                self.passed += 1;
            } else {
                self.failed += 1;
            }
            self.cursor += 1;
            self.phase = SessionPhase::Idle;
        }

        self.phase = SessionPhase::Done;
        self.store.flush().await?;

        let report = SessionReport {
            session_id: self.session_id.clone(),
            sink: self.sink.clone(),
            total,
            passed: self.passed,
            failed: self.failed,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            event = "session.finished",
            session_id = %self.session_id,
            passed = report.passed,
            failed = report.failed,
            duration_ms = report.duration_ms,
        );
        Ok(report)
    }
}
