//! Lead lifecycle types
//!
//! A lead is a single contact targeted for an outbound call. Leads are
//! created `Pending`, move to `InProgress` when a call is successfully
//! initiated, and reach `Completed` or `Failed` through the webhook
//! ingestor. A lead never transitions backward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Disposition sentinel written when a call has been initiated but no
/// outcome has arrived yet.
pub const DISPOSITION_CALL_INITIATED: &str = "Call initiated";

/// Lead lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Waiting to be dialed
    Pending,
    /// A call has been initiated and no outcome has arrived yet
    InProgress,
    /// Terminal: call finished
    Completed,
    /// Terminal: call failed, or no phone resource was available at intake
    Failed,
}

impl LeadStatus {
    /// Terminal states are never transitioned out of.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Failed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "Pending",
            LeadStatus::InProgress => "In Progress",
            LeadStatus::Completed => "Completed",
            LeadStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single contact with a phone number targeted for an outbound call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Opaque lead ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Phone number, free-form (provider/locale-specific formatting)
    pub phone: String,

    /// Assigned phone resource from the pool. `None` means no line is
    /// available; such a lead is never eligible for dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_id: Option<String>,

    /// Lifecycle status
    pub status: LeadStatus,

    /// Categorical outcome label, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,

    /// Call duration in minutes
    #[serde(default)]
    pub duration_minutes: f64,

    /// Call cost in currency units
    #[serde(default)]
    pub cost: f64,

    /// Recording URL, if the provider produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Owning campaign, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
}

impl Lead {
    /// Create a new pending lead.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            phone_id: None,
            status: LeadStatus::Pending,
            disposition: None,
            duration_minutes: 0.0,
            cost: 0.0,
            recording_url: None,
            created_at: now,
            updated_at: now,
            campaign_id: None,
        }
    }

    /// Set the assigned phone resource
    pub fn phone_id(mut self, phone_id: impl Into<String>) -> Self {
        self.phone_id = Some(phone_id.into());
        self
    }

    /// Set the owning campaign
    pub fn campaign(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    /// Set the status
    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    /// Eligible for dispatch: `Pending` with a phone resource assigned.
    /// A lead without a phone resource is never eligible regardless of
    /// status.
    pub fn is_eligible(&self) -> bool {
        self.status == LeadStatus::Pending && self.phone_id.is_some()
    }
}

/// Partial update applied to a lead row.
///
/// Only the set fields are written; `updated_at` is refreshed by the
/// repository on every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
}

impl LeadUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    pub fn duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn recording_url(mut self, url: impl Into<String>) -> Self {
        self.recording_url = Some(url.into());
        self
    }

    /// Apply this update to a lead in place.
    pub fn apply(&self, lead: &mut Lead) {
        if let Some(status) = self.status {
            lead.status = status;
        }
        if let Some(ref disposition) = self.disposition {
            lead.disposition = Some(disposition.clone());
        }
        if let Some(minutes) = self.duration_minutes {
            lead.duration_minutes = minutes;
        }
        if let Some(cost) = self.cost {
            lead.cost = cost;
        }
        if let Some(ref url) = self.recording_url {
            lead.recording_url = Some(url.clone());
        }
        lead.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility_requires_phone_resource() {
        let lead = Lead::new("Raj Kumar", "9876543210");
        assert!(!lead.is_eligible());

        let lead = lead.phone_id("p1");
        assert!(lead.is_eligible());
    }

    #[test]
    fn test_non_pending_is_never_eligible() {
        let lead = Lead::new("Raj Kumar", "9876543210")
            .phone_id("p1")
            .status(LeadStatus::InProgress);
        assert!(!lead.is_eligible());
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut lead = Lead::new("Raj Kumar", "9876543210").phone_id("p1");
        LeadUpdate::new()
            .status(LeadStatus::Completed)
            .disposition("Not Interested")
            .duration_minutes(1.5)
            .apply(&mut lead);

        assert_eq!(lead.status, LeadStatus::Completed);
        assert_eq!(lead.disposition.as_deref(), Some("Not Interested"));
        assert_eq!(lead.duration_minutes, 1.5);
        assert_eq!(lead.cost, 0.0);
        assert_eq!(lead.phone_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(LeadStatus::Completed.is_terminal());
        assert!(LeadStatus::Failed.is_terminal());
        assert!(!LeadStatus::Pending.is_terminal());
        assert!(!LeadStatus::InProgress.is_terminal());
    }
}
