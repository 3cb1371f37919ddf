//! Webhook ingestion
//!
//! Orchestrates normalization, lead resolution, and the state-transition
//! commit. The return value is always an acknowledgement: callers map it
//! to HTTP 200 unconditionally so the provider never retries delivery.
//! Duplicate and out-of-order deliveries are expected; an already-terminal
//! lead is acknowledged without a second transition, and statistics are
//! recomputed from rows elsewhere, so nothing double-counts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dialer_core::{CallOutcome, Lead, LeadRepository, LeadUpdate, RepositoryError};

use crate::matcher::LeadMatcher;
use crate::normalize::{derived_cost, normalize};

/// Acknowledgement body returned for every delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

impl WebhookAck {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub struct WebhookIngestor {
    repo: Arc<dyn LeadRepository>,
    matcher: LeadMatcher,
}

impl WebhookIngestor {
    pub fn new(repo: Arc<dyn LeadRepository>) -> Self {
        Self {
            matcher: LeadMatcher::new(repo.clone()),
            repo,
        }
    }

    /// Ingest a raw request body. Non-JSON bodies are acknowledged with
    /// `success: false`.
    pub async fn ingest_bytes(&self, body: &[u8]) -> WebhookAck {
        match serde_json::from_slice::<Value>(body) {
            Ok(doc) => self.ingest(&doc).await,
            Err(err) => {
                tracing::warn!(error = %err, "Webhook body is not valid JSON");
                WebhookAck::failed("invalid JSON payload")
            }
        }
    }

    /// Ingest a parsed webhook document.
    pub async fn ingest(&self, doc: &Value) -> WebhookAck {
        let outcome = normalize(doc);
        tracing::info!(
            call_id = outcome.call_id.as_deref().unwrap_or("-"),
            disposition = %outcome.disposition,
            duration_seconds = outcome.duration_seconds,
            status = %outcome.status,
            "Webhook outcome normalized"
        );

        let lead = match self.resolve(&outcome).await {
            Ok(Some(lead)) => lead,
            Ok(None) => {
                // Legitimate unresolved outcome, not an error
                tracing::warn!(
                    phone = outcome.phone.as_deref().unwrap_or("-"),
                    "Webhook could not be matched to a lead"
                );
                return WebhookAck::failed("no matching lead found");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Lead lookup failed");
                return WebhookAck::failed(format!("lead lookup failed: {err}"));
            }
        };

        if lead.status.is_terminal() {
            tracing::info!(lead_id = %lead.id, status = %lead.status, "Duplicate delivery ignored");
            return WebhookAck::ok("lead already finalized");
        }

        let mut update = LeadUpdate::new()
            .status(outcome.status)
            .disposition(outcome.disposition.label())
            .duration_minutes(outcome.duration_minutes())
            .cost(derived_cost(outcome.duration_seconds));
        if let Some(ref url) = outcome.recording_url {
            update = update.recording_url(url.clone());
        }

        match self.repo.update(&lead.id, update).await {
            Ok(updated) => {
                tracing::info!(
                    lead_id = %updated.id,
                    status = %updated.status,
                    disposition = updated.disposition.as_deref().unwrap_or("-"),
                    "Lead outcome recorded"
                );
                WebhookAck::ok(format!("lead {} updated", updated.id))
            }
            Err(err) => {
                tracing::warn!(lead_id = %lead.id, error = %err, "Lead update failed");
                WebhookAck::failed(format!("lead update failed: {err}"))
            }
        }
    }

    /// Correlation id first, phone/name matching second.
    async fn resolve(&self, outcome: &CallOutcome) -> Result<Option<Lead>, RepositoryError> {
        if let Some(ref id) = outcome.call_id {
            match self.repo.get(id).await {
                Ok(lead) => return Ok(Some(lead)),
                // A provider-generated call id is not a lead id; fall
                // through to matching
                Err(RepositoryError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        self.matcher
            .resolve(outcome.phone.as_deref(), outcome.customer_name.as_deref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer_core::{InMemoryLeadRepository, Lead, LeadStatus};
    use serde_json::json;

    fn setup(leads: Vec<Lead>) -> (Arc<InMemoryLeadRepository>, WebhookIngestor) {
        let repo = Arc::new(InMemoryLeadRepository::with_leads(leads));
        let ingestor = WebhookIngestor::new(repo.clone());
        (repo, ingestor)
    }

    fn in_progress_lead(phone: &str) -> Lead {
        Lead::new("Maria Garcia", phone)
            .phone_id("p1")
            .status(LeadStatus::InProgress)
    }

    #[tokio::test]
    async fn test_outcome_committed_via_correlation_id() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        let ack = ingestor
            .ingest(&json!({
                "message": {
                    "call": { "metadata": { "lead_id": lead_id } },
                    "durationSeconds": 90,
                    "analysis": { "summary": "not interested, please remove me" },
                }
            }))
            .await;

        assert!(ack.success);
        let lead = repo.get(&lead_id).await.unwrap();
        assert_eq!(lead.status, LeadStatus::Completed);
        assert_eq!(lead.disposition.as_deref(), Some("Do Not Contact"));
        assert!((lead.duration_minutes - 1.5).abs() < 1e-9);
        assert!((lead.cost - 1.485).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_call_id_falls_back_to_phone_match() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        let ack = ingestor
            .ingest(&json!({
                "callId": "provider-call-99",
                "customer": { "number": "+1 (555) 010-2222" },
                "durationSeconds": 30,
            }))
            .await;

        assert!(ack.success);
        assert_eq!(repo.get(&lead_id).await.unwrap().status, LeadStatus::Completed);
    }

    #[tokio::test]
    async fn test_unresolved_webhook_is_acknowledged_without_update() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        let ack = ingestor
            .ingest(&json!({ "customer": { "number": "555-999-0000" } }))
            .await;

        assert!(!ack.success);
        assert_eq!(
            repo.get(&lead_id).await.unwrap().status,
            LeadStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_duplicate_delivery_leaves_terminal_lead_untouched() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        let payload = json!({
            "customer": { "number": "5550102222" },
            "durationSeconds": 90,
            "summary": "not interested",
        });

        let first = ingestor.ingest(&payload).await;
        assert!(first.success);
        let after_first = repo.get(&lead_id).await.unwrap();

        let second = ingestor.ingest(&payload).await;
        assert!(second.success);
        let after_second = repo.get(&lead_id).await.unwrap();

        assert_eq!(after_first.status, after_second.status);
        assert_eq!(after_first.disposition, after_second.disposition);
        assert_eq!(after_first.duration_minutes, after_second.duration_minutes);
        assert_eq!(after_first.cost, after_second.cost);
    }

    #[tokio::test]
    async fn test_failure_marker_fails_the_lead() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        let ack = ingestor
            .ingest(&json!({
                "customer": { "number": "5550102222" },
                "success": false,
                "endedReason": "assistant-error",
            }))
            .await;

        assert!(ack.success);
        let lead = repo.get(&lead_id).await.unwrap();
        assert_eq!(lead.status, LeadStatus::Failed);
        assert_eq!(lead.disposition.as_deref(), Some("Other: assistant-error"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_acknowledged_as_failure() {
        let (_repo, ingestor) = setup(vec![]);
        let ack = ingestor.ingest_bytes(b"this is not json").await;
        assert!(!ack.success);
        assert_eq!(ack.message, "invalid JSON payload");
    }

    #[tokio::test]
    async fn test_recording_url_carried_to_lead() {
        let lead = in_progress_lead("5550102222");
        let lead_id = lead.id.clone();
        let (repo, ingestor) = setup(vec![lead]);

        ingestor
            .ingest(&json!({
                "customer": { "number": "5550102222" },
                "message": { "artifact": { "recordingUrl": "https://cdn.example.com/r.mp3" } },
            }))
            .await;

        assert_eq!(
            repo.get(&lead_id).await.unwrap().recording_url.as_deref(),
            Some("https://cdn.example.com/r.mp3")
        );
    }
}
