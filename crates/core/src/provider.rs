//! Voice-call provider (outbound)
//!
//! The provider actually places calls; this core only asks it to initiate
//! one and records the attempt. Outcomes arrive later through the webhook.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::lead::Lead;

/// Result of a call-initiation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outbound voice-call provider trait
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Ask the provider to start a call to this lead. The lead id is
    /// attached as correlation metadata so the webhook can link back.
    async fn initiate_call(&self, lead: &Lead) -> Result<DialResult, ProviderError>;
}

/// Stub provider for development and tests
///
/// Records every initiation request and answers with a configurable
/// result.
pub struct StubVoiceProvider {
    result: RwLock<Result<DialResult, String>>,
    calls: RwLock<Vec<String>>,
}

impl StubVoiceProvider {
    /// Stub that accepts every call.
    pub fn accepting() -> Self {
        Self {
            result: RwLock::new(Ok(DialResult {
                success: true,
                message: None,
            })),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Stub that fails every call with a transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: RwLock::new(Err(message.into())),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Change the answer for subsequent calls.
    pub fn set_result(&self, result: Result<DialResult, String>) {
        *self.result.write() = result;
    }

    /// Lead ids of all initiation requests seen so far.
    pub fn initiated(&self) -> Vec<String> {
        self.calls.read().clone()
    }
}

#[async_trait]
impl VoiceProvider for StubVoiceProvider {
    async fn initiate_call(&self, lead: &Lead) -> Result<DialResult, ProviderError> {
        self.calls.write().push(lead.id.clone());
        tracing::debug!(lead_id = %lead.id, phone = %lead.phone, "Stub provider: call initiated");
        match &*self.result.read() {
            Ok(result) => Ok(result.clone()),
            Err(message) => Err(ProviderError::ConnectionFailed(message.clone())),
        }
    }
}
