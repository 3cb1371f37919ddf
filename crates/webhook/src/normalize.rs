//! Payload normalization
//!
//! The provider controls the webhook schema and varies it across message
//! versions: fields appear at the top level on some messages and nested
//! under a `message` envelope on others. Every field is therefore
//! extracted through an ordered list of candidate paths; the first path
//! present in the document wins, and a field with no present path stays
//! null/default.

use serde_json::Value;

use dialer_core::{CallOutcome, LeadStatus};

use crate::classify::classify;

/// Provider billing rate, currency units per connected minute. Cost is
/// derived from duration, never extracted from the payload.
pub const BILLING_RATE_PER_MINUTE: f64 = 0.99;

/// Correlation id: the lead id we attached as call metadata, falling back
/// to the provider's own call id.
const CALL_ID_PATHS: &[&str] = &[
    "message.call.metadata.lead_id",
    "call.metadata.lead_id",
    "metadata.lead_id",
    "message.call.id",
    "call.id",
    "callId",
    "id",
];

const PHONE_PATHS: &[&str] = &[
    "message.call.customer.number",
    "call.customer.number",
    "message.customer.number",
    "customer.number",
    "phoneNumber",
    "phone",
];

const NAME_PATHS: &[&str] = &[
    "message.call.customer.name",
    "call.customer.name",
    "message.customer.name",
    "customer.name",
    "customerName",
];

const ENDED_REASON_PATHS: &[&str] = &[
    "message.endedReason",
    "endedReason",
    "message.ended_reason",
    "ended_reason",
];

const SUMMARY_PATHS: &[&str] = &[
    "message.analysis.summary",
    "analysis.summary",
    "message.summary",
    "summary",
];

const TRANSCRIPT_PATHS: &[&str] = &[
    "message.artifact.transcript",
    "artifact.transcript",
    "message.transcript",
    "transcript",
];

const DURATION_PATHS: &[&str] = &[
    "message.durationSeconds",
    "durationSeconds",
    "message.duration",
    "duration",
];

const RECORDING_PATHS: &[&str] = &[
    "message.artifact.recordingUrl",
    "artifact.recordingUrl",
    "message.recordingUrl",
    "recordingUrl",
    "recording_url",
];

const SUCCESS_PATHS: &[&str] = &["success", "message.success"];

const STATUS_PATHS: &[&str] = &["status", "message.status"];

/// Walk a dotted path through nested objects.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// First candidate path holding a value of the required type wins; a
/// present path with the wrong type falls through to the next candidate.
fn first_string(doc: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(doc, path).and_then(Value::as_str))
        .map(|s| s.to_string())
}

fn first_f64(doc: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|path| {
        let value = lookup(doc, path)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    })
}

fn first_bool(doc: &Value, paths: &[&str]) -> Option<bool> {
    paths
        .iter()
        .find_map(|path| lookup(doc, path).and_then(Value::as_bool))
}

/// Cost derived from duration at the fixed billing rate.
pub fn derived_cost(duration_seconds: f64) -> f64 {
    (duration_seconds / 60.0) * BILLING_RATE_PER_MINUTE
}

/// `Failed` only on an explicit failure signal: `success: false` at top
/// level or under the envelope, or a status string containing "fail".
/// Everything else is `Completed`, including zero-duration calls — a
/// connected-then-ended call is still a completed attempt.
fn terminal_status(doc: &Value) -> LeadStatus {
    if first_bool(doc, SUCCESS_PATHS) == Some(false) {
        return LeadStatus::Failed;
    }
    if let Some(status) = first_string(doc, STATUS_PATHS) {
        if status.to_lowercase().contains("fail") {
            return LeadStatus::Failed;
        }
    }
    LeadStatus::Completed
}

/// Reduce one inbound webhook document to a canonical outcome.
pub fn normalize(doc: &Value) -> CallOutcome {
    let summary = first_string(doc, SUMMARY_PATHS).unwrap_or_default();
    let transcript = first_string(doc, TRANSCRIPT_PATHS).unwrap_or_default();
    let content = format!("{summary} {transcript}");
    let ended_reason = first_string(doc, ENDED_REASON_PATHS).unwrap_or_default();

    let duration_seconds = first_f64(doc, DURATION_PATHS).unwrap_or(0.0).max(0.0);

    CallOutcome {
        call_id: first_string(doc, CALL_ID_PATHS),
        phone: first_string(doc, PHONE_PATHS),
        customer_name: first_string(doc, NAME_PATHS),
        disposition: classify(&content, &ended_reason),
        duration_seconds,
        status: terminal_status(doc),
        recording_url: first_string(doc, RECORDING_PATHS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer_core::Disposition;
    use serde_json::json;

    #[test]
    fn test_flat_payload() {
        let doc = json!({
            "callId": "call-1",
            "phone": "5550102222",
            "durationSeconds": 90,
            "summary": "customer said not interested",
        });

        let outcome = normalize(&doc);
        assert_eq!(outcome.call_id.as_deref(), Some("call-1"));
        assert_eq!(outcome.phone.as_deref(), Some("5550102222"));
        assert_eq!(outcome.duration_seconds, 90.0);
        assert_eq!(outcome.status, LeadStatus::Completed);
        assert_eq!(outcome.disposition, Disposition::NotInterested);
    }

    #[test]
    fn test_enveloped_payload() {
        let doc = json!({
            "message": {
                "call": {
                    "id": "call-2",
                    "metadata": { "lead_id": "lead-7" },
                    "customer": { "number": "+1 (555) 010-2222", "name": "Maria Garcia" },
                },
                "endedReason": "customer-ended-call",
                "durationSeconds": 42,
                "artifact": {
                    "transcript": "hello? ... click",
                    "recordingUrl": "https://cdn.example.com/rec/2.mp3",
                },
            }
        });

        let outcome = normalize(&doc);
        // Metadata lead id outranks the provider call id
        assert_eq!(outcome.call_id.as_deref(), Some("lead-7"));
        assert_eq!(outcome.phone.as_deref(), Some("+1 (555) 010-2222"));
        assert_eq!(outcome.customer_name.as_deref(), Some("Maria Garcia"));
        assert_eq!(outcome.disposition, Disposition::HangUp);
        assert_eq!(
            outcome.recording_url.as_deref(),
            Some("https://cdn.example.com/rec/2.mp3")
        );
    }

    #[test]
    fn test_first_present_path_wins() {
        let doc = json!({
            "durationSeconds": 60,
            "duration": 999,
        });
        assert_eq!(normalize(&doc).duration_seconds, 60.0);
    }

    #[test]
    fn test_duration_accepts_numeric_string() {
        let doc = json!({ "message": { "duration": "75" } });
        assert_eq!(normalize(&doc).duration_seconds, 75.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let outcome = normalize(&json!({}));
        assert_eq!(outcome.call_id, None);
        assert_eq!(outcome.phone, None);
        assert_eq!(outcome.duration_seconds, 0.0);
        assert_eq!(outcome.disposition, Disposition::Unknown);
        // No explicit failure signal: completed, even at duration 0
        assert_eq!(outcome.status, LeadStatus::Completed);
    }

    #[test]
    fn test_explicit_success_false_fails() {
        assert_eq!(
            normalize(&json!({ "success": false })).status,
            LeadStatus::Failed
        );
        assert_eq!(
            normalize(&json!({ "message": { "success": false } })).status,
            LeadStatus::Failed
        );
    }

    #[test]
    fn test_failing_status_string_fails() {
        assert_eq!(
            normalize(&json!({ "status": "call-FAILED" })).status,
            LeadStatus::Failed
        );
        assert_eq!(
            normalize(&json!({ "message": { "status": "failure" } })).status,
            LeadStatus::Failed
        );
        assert_eq!(
            normalize(&json!({ "status": "ended" })).status,
            LeadStatus::Completed
        );
    }

    #[test]
    fn test_zero_duration_without_failure_marker_is_completed() {
        let doc = json!({ "durationSeconds": 0, "endedReason": "customer-ended-call" });
        let outcome = normalize(&doc);
        assert_eq!(outcome.status, LeadStatus::Completed);
        assert_eq!(outcome.duration_seconds, 0.0);
    }

    #[test]
    fn test_negative_duration_clamped() {
        assert_eq!(normalize(&json!({ "duration": -5 })).duration_seconds, 0.0);
    }

    #[test]
    fn test_derived_cost() {
        assert!((derived_cost(90.0) - 1.485).abs() < 1e-9);
        assert_eq!(derived_cost(0.0), 0.0);
    }

    #[test]
    fn test_summary_and_transcript_both_feed_classification() {
        let doc = json!({
            "summary": "routine call",
            "transcript": "please leave a message after the tone",
        });
        assert_eq!(normalize(&doc).disposition, Disposition::AnsweringMachine);
    }
}
