//! Pacing and dispatch engine
//!
//! Delivers calls to the voice provider at a bounded rate with
//! single-flight discipline, and terminates runs on its own once the
//! snapshot is exhausted or every call has resolved.

pub mod dispatcher;
pub mod events;
pub mod provider;
pub mod scheduler;

pub use dispatcher::CallDispatcher;
pub use events::{DialerEvent, HaltReason, RunStatus, RunSummary};
pub use provider::HttpVoiceProvider;
pub use scheduler::PacingScheduler;

use dialer_core::{LeadStatus, ProviderError, RepositoryError};
use thiserror::Error;

/// Engine errors
///
/// Only `start()` failures surface to the user; everything inside a run
/// degrades per-lead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Nothing to dispatch: no eligible leads")]
    NoEligibleLeads,

    #[error("A pacing run is already active")]
    AlreadyRunning,

    #[error("Invalid pacing rate: {0} calls/sec")]
    InvalidRate(u32),

    #[error("Stale dispatch for lead {lead_id}: status is {status}")]
    StaleLead { lead_id: String, status: LeadStatus },

    #[error("Another call is already in flight")]
    AlreadyInFlight,

    #[error("Provider declined the call: {0}")]
    CallDeclined(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
