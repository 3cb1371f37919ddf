//! Normalized call outcome
//!
//! The canonical record produced from one inbound webhook document. It is
//! ephemeral: it exists only for the duration of a single webhook
//! invocation, long enough to resolve a lead and commit the transition.

use serde::{Deserialize, Serialize};

use crate::disposition::Disposition;
use crate::lead::LeadStatus;

/// Normalized result of one provider webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Provider-echoed correlation id linking back to the lead, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    /// Dialed phone number as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Customer name as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    /// Classified outcome label
    pub disposition: Disposition,

    /// Call duration in seconds
    #[serde(default)]
    pub duration_seconds: f64,

    /// Terminal status for the lead: `Completed` or `Failed` only
    pub status: LeadStatus,

    /// Recording artifact, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
}

impl CallOutcome {
    /// Duration converted to the minutes unit stored on the lead.
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}
