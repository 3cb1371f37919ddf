//! Call dispatcher
//!
//! Performs one call-initiation attempt against the voice provider and
//! records the attempt on the lead. At most one initiation request is in
//! flight at any instant; the flag is released on every path by a drop
//! guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dialer_core::{
    LeadRepository, LeadStatus, LeadUpdate, VoiceProvider, DISPOSITION_CALL_INITIATED,
};

use crate::EngineError;

/// Single-flight claim. Released on drop.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn try_acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Performs call-initiation attempts with single-flight discipline
pub struct CallDispatcher {
    repo: Arc<dyn LeadRepository>,
    provider: Arc<dyn VoiceProvider>,
    in_flight: Arc<AtomicBool>,
}

impl CallDispatcher {
    pub fn new(repo: Arc<dyn LeadRepository>, provider: Arc<dyn VoiceProvider>) -> Self {
        Self {
            repo,
            provider,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a call-initiation request is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Attempt one call initiation.
    ///
    /// The live lead is re-read at call time; the snapshot is not trusted.
    /// On provider success the lead moves to `InProgress` with the
    /// call-initiated sentinel disposition. On any failure the lead is left
    /// `Pending` and may be retried by a later run.
    pub async fn dispatch(&self, lead_id: &str) -> Result<(), EngineError> {
        let lead = self.repo.get(lead_id).await?;
        if lead.status != LeadStatus::Pending {
            return Err(EngineError::StaleLead {
                lead_id: lead_id.to_string(),
                status: lead.status,
            });
        }

        let _guard = InFlightGuard::try_acquire(self.in_flight.clone())
            .ok_or(EngineError::AlreadyInFlight)?;

        let result = self.provider.initiate_call(&lead).await?;
        if !result.success {
            return Err(EngineError::CallDeclined(
                result.message.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        self.repo
            .update(
                lead_id,
                LeadUpdate::new()
                    .status(LeadStatus::InProgress)
                    .disposition(DISPOSITION_CALL_INITIATED),
            )
            .await?;

        tracing::info!(lead_id = %lead_id, phone = %lead.phone, "Call initiated");
        Ok(())
    }
}
