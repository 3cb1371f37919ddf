//! Core types and traits for the campaign dialer
//!
//! This crate provides foundational types used across all other crates:
//! - Lead lifecycle types and the dispatch-eligibility rule
//! - Normalized call outcomes and disposition labels
//! - Derived campaign statistics
//! - Traits for external collaborators (lead repository, voice provider,
//!   phone pool) with in-memory/stub implementations
//! - Error types

pub mod disposition;
pub mod error;
pub mod lead;
pub mod outcome;
pub mod phone;
pub mod pool;
pub mod provider;
pub mod repository;
pub mod stats;

pub use disposition::Disposition;
pub use error::{ProviderError, RepositoryError};
pub use lead::{Lead, LeadStatus, LeadUpdate, DISPOSITION_CALL_INITIATED};
pub use outcome::CallOutcome;
pub use phone::{digits_only, last_digits, suffixes_overlap};
pub use pool::{PhonePool, RoundRobinPhonePool};
pub use provider::{DialResult, StubVoiceProvider, VoiceProvider};
pub use repository::{InMemoryLeadRepository, LeadRepository};
pub use stats::CampaignStats;
