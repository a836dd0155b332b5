//! Test planning: discovery, normalization and expansion for one sink

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::runtime::SinkRuntime;
use crate::sink::{SinkClass, SinkId};
use sinkcheck_caps::{expand_all, CapsStructure, Configuration, FieldDomain};

/// Everything a session needs to drive one sink: its class, the normalized
/// domains and the expanded configuration sweep.
#[derive(Debug, Clone)]
pub struct TestPlan {
    pub sink: SinkId,
    pub class: SinkClass,
    pub domains: Vec<FieldDomain>,
    pub configurations: Vec<Configuration>,
}

impl TestPlan {
    /// Ask a runtime for the sink's advertisement and expand it.
    pub async fn discover(runtime: &dyn SinkRuntime, sink: &SinkId) -> Result<Self, SessionError> {
        let caps = runtime.list_capabilities(sink).await?;
        if caps.descriptors.is_empty() {
            warn!(sink = %sink, "sink advertises no constrainable capabilities");
        }
        let plan = Self::from_caps(sink.clone(), caps.class, &caps.descriptors)?;
        debug!(
            sink = %sink,
            class = %plan.class,
            descriptors = plan.domains.len(),
            configurations = plan.len(),
            "test plan ready"
        );
        Ok(plan)
    }

    /// Build a plan from externally supplied descriptors, bypassing
    /// discovery.
    pub fn from_caps(
        sink: SinkId,
        class: SinkClass,
        descriptors: &[CapsStructure],
    ) -> sinkcheck_caps::Result<Self> {
        let domains = FieldDomain::from_structures(descriptors)?;
        let configurations = expand_all(&domains);
        Ok(TestPlan {
            sink,
            class,
            domains,
            configurations,
        })
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Stable identity of this matrix: SHA-256 over the sink name and the
    /// ordered rendered configurations.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.sink.as_str().as_bytes());
        for config in &self.configurations {
            hasher.update(b"\n");
            hasher.update(config.to_caps_string().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
