use std::fmt::{Display, Formatter};

use firmscope_core::{EnvelopeMeta, SourceId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Canonical command metadata payload used to construct envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub source_chain: Vec<SourceId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(source_chain: Vec<SourceId>, latency_ms: u64) -> Result<Self, ValidationError> {
        if source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(Self {
            request_id: RequestId::new_v4(),
            source_chain,
            latency_ms,
            warnings: Vec::new(),
        })
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self, schema_version: &str) -> Result<EnvelopeMeta, ValidationError> {
        let mut envelope_meta = EnvelopeMeta::new(
            self.request_id.to_string(),
            schema_version,
            self.source_chain,
            self.latency_ms,
        )?;

        for warning in self.warnings {
            envelope_meta.push_warning(warning);
        }

        Ok(envelope_meta)
    }
}
