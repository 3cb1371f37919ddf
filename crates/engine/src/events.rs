//! Dialer run events and summaries

use serde::{Deserialize, Serialize};

/// Why a pacing run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// Watchdog saw no eligible or in-progress leads left and at least one
    /// completion
    AllCallsResolved,
    /// Cursor reached the end of the snapshot with nothing in flight
    SnapshotExhausted,
    /// Caller stopped the run
    Stopped,
}

/// Summary of a finished pacing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub completed: usize,
    pub failed: usize,
    pub reason: HaltReason,
}

/// Events emitted over the engine's broadcast channel
#[derive(Debug, Clone)]
pub enum DialerEvent {
    RunStarted { run_id: String, total: usize },
    CallDispatched { lead_id: String },
    /// Tick consumed while a call was in flight; the lead is silently
    /// skipped for this run, not retried
    LeadSkipped { lead_id: String },
    DispatchFailed { lead_id: String, reason: String },
    RunFinished(RunSummary),
}

/// Snapshot of the scheduler state for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub cursor: usize,
    pub total: usize,
    pub rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<RunSummary>,
}
