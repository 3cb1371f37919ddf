//! Webhook ingestion pipeline
//!
//! Reduces the provider's heterogeneously-shaped outcome webhooks into a
//! canonical `CallOutcome`, classifies the call into a disposition,
//! resolves the target lead, and commits the state transition. The
//! endpoint contract is acknowledge-always: processing failures are
//! visible in the response body, never in the HTTP status.

pub mod classify;
pub mod ingest;
pub mod matcher;
pub mod normalize;

pub use classify::classify;
pub use ingest::{WebhookAck, WebhookIngestor};
pub use matcher::LeadMatcher;
pub use normalize::{derived_cost, normalize, BILLING_RATE_PER_MINUTE};
