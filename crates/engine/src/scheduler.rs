//! Pacing scheduler
//!
//! Maintains a recurring dispatch tick at the configured rate over a
//! snapshot of eligible leads, advancing a cursor by exactly one lead per
//! tick whether or not the tick dispatched. A supplementary watchdog
//! observes the live lead set and force-terminates the run once every call
//! has resolved.
//!
//! All run state (timer, cursor, stop channel, in-flight flag) lives on
//! the scheduler instance; independent schedulers never share state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use dialer_config::{PacingConfig, ALLOWED_PACING_RATES};
use dialer_core::{Lead, LeadRepository, LeadStatus, VoiceProvider};

use crate::dispatcher::CallDispatcher;
use crate::events::{DialerEvent, HaltReason, RunStatus, RunSummary};
use crate::EngineError;

struct ActiveRun {
    run_id: String,
    rate: u32,
    total: usize,
    cursor: Arc<AtomicUsize>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Rate-limited dispatch loop with single-flight discipline
pub struct PacingScheduler {
    repo: Arc<dyn LeadRepository>,
    dispatcher: Arc<CallDispatcher>,
    pacing: PacingConfig,
    events: broadcast::Sender<DialerEvent>,
    run: Mutex<Option<ActiveRun>>,
    last_summary: Arc<RwLock<Option<RunSummary>>>,
}

impl PacingScheduler {
    pub fn new(
        repo: Arc<dyn LeadRepository>,
        provider: Arc<dyn VoiceProvider>,
        pacing: PacingConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            dispatcher: Arc::new(CallDispatcher::new(repo.clone(), provider)),
            repo,
            pacing,
            events,
            run: Mutex::new(None),
            last_summary: Arc::new(RwLock::new(None)),
        }
    }

    /// Subscribe to run events.
    pub fn subscribe(&self) -> broadcast::Receiver<DialerEvent> {
        self.events.subscribe()
    }

    /// Start a pacing run over the current eligible-lead set.
    ///
    /// The eligible set is snapshotted here; leads that become eligible
    /// later are picked up by the next run. Starting with zero eligible
    /// leads is an error, not a silent success.
    pub async fn start(&self, rate_override: Option<u32>) -> Result<String, EngineError> {
        let rate = rate_override.unwrap_or(self.pacing.rate);
        if !ALLOWED_PACING_RATES.contains(&rate) {
            return Err(EngineError::InvalidRate(rate));
        }

        let mut run = self.run.lock().await;
        if let Some(active) = run.as_ref() {
            if !active.handle.is_finished() {
                return Err(EngineError::AlreadyRunning);
            }
        }

        let snapshot: Vec<String> = self
            .repo
            .list(self.pacing.snapshot_limit)
            .await?
            .iter()
            .filter(|lead| lead.is_eligible())
            .map(|lead| lead.id.clone())
            .collect();
        if snapshot.is_empty() {
            return Err(EngineError::NoEligibleLeads);
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let total = snapshot.len();
        let cursor = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(run_loop(RunContext {
            run_id: run_id.clone(),
            snapshot,
            tick_interval: Duration::from_millis(1000 / rate as u64),
            watchdog_interval: Duration::from_millis(self.pacing.watchdog_interval_ms),
            snapshot_limit: self.pacing.snapshot_limit,
            repo: self.repo.clone(),
            dispatcher: self.dispatcher.clone(),
            events: self.events.clone(),
            cursor: cursor.clone(),
            last_summary: self.last_summary.clone(),
            stop_rx,
        }));

        *run = Some(ActiveRun {
            run_id: run_id.clone(),
            rate,
            total,
            cursor,
            stop_tx,
            handle,
        });

        tracing::info!(run_id = %run_id, total, rate, "Pacing run started");
        let _ = self.events.send(DialerEvent::RunStarted {
            run_id: run_id.clone(),
            total,
        });
        Ok(run_id)
    }

    /// Stop the active run.
    ///
    /// Cancels the pending timer's scheduling claim; a provider request
    /// already sent is not aborted. Stopping an already-stopped run is a
    /// no-op.
    pub async fn stop(&self) {
        let run = self.run.lock().await;
        if let Some(active) = run.as_ref() {
            if !active.handle.is_finished() {
                let _ = active.stop_tx.send(true);
                tracing::info!(run_id = %active.run_id, "Stop requested");
            }
        }
    }

    /// Current scheduler state.
    pub async fn status(&self) -> RunStatus {
        let run = self.run.lock().await;
        match run.as_ref() {
            Some(active) => RunStatus {
                running: !active.handle.is_finished(),
                run_id: Some(active.run_id.clone()),
                cursor: active.cursor.load(Ordering::Acquire),
                total: active.total,
                rate: active.rate,
                last_summary: self.last_summary.read().clone(),
            },
            None => RunStatus {
                running: false,
                run_id: None,
                cursor: 0,
                total: 0,
                rate: self.pacing.rate,
                last_summary: self.last_summary.read().clone(),
            },
        }
    }
}

struct RunContext {
    run_id: String,
    snapshot: Vec<String>,
    tick_interval: Duration,
    watchdog_interval: Duration,
    snapshot_limit: usize,
    repo: Arc<dyn LeadRepository>,
    dispatcher: Arc<CallDispatcher>,
    events: broadcast::Sender<DialerEvent>,
    cursor: Arc<AtomicUsize>,
    last_summary: Arc<RwLock<Option<RunSummary>>>,
    stop_rx: watch::Receiver<bool>,
}

async fn run_loop(mut ctx: RunContext) {
    let total = ctx.snapshot.len();
    let snapshot_ids: HashSet<String> = ctx.snapshot.iter().cloned().collect();

    let mut ticker = tokio::time::interval(ctx.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut watchdog = tokio::time::interval(ctx.watchdog_interval);
    watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // At most one dispatch task is live at a time (single-flight); the
    // latest handle is enough to know whether the tail call has resolved.
    let mut last_dispatch: Option<JoinHandle<()>> = None;

    let reason = loop {
        tokio::select! {
            // Stop always wins over a simultaneously-ready tick
            biased;

            // Caller stop, or the scheduler itself was dropped
            _ = ctx.stop_rx.changed() => break HaltReason::Stopped,

            _ = ticker.tick(), if ctx.cursor.load(Ordering::Acquire) < total => {
                let index = ctx.cursor.fetch_add(1, Ordering::AcqRel);
                let lead_id = ctx.snapshot[index].clone();

                if ctx.dispatcher.is_in_flight() {
                    // Tick consumed, lead silently skipped for this run
                    tracing::debug!(run_id = %ctx.run_id, lead_id = %lead_id, "Tick skipped: call in flight");
                    let _ = ctx.events.send(DialerEvent::LeadSkipped { lead_id });
                } else {
                    let dispatcher = ctx.dispatcher.clone();
                    let events = ctx.events.clone();
                    last_dispatch = Some(tokio::spawn(async move {
                        match dispatcher.dispatch(&lead_id).await {
                            Ok(()) => {
                                let _ = events.send(DialerEvent::CallDispatched { lead_id });
                            }
                            Err(err) => {
                                // Per-lead failure; the run continues
                                tracing::warn!(lead_id = %lead_id, error = %err, "Dispatch failed");
                                let _ = events.send(DialerEvent::DispatchFailed {
                                    lead_id,
                                    reason: err.to_string(),
                                });
                            }
                        }
                    }));
                }
            }

            _ = watchdog.tick() => {
                match ctx.repo.list(ctx.snapshot_limit).await {
                    Ok(live) => {
                        if all_calls_resolved(&live) {
                            break HaltReason::AllCallsResolved;
                        }
                        let tail_done = last_dispatch
                            .as_ref()
                            .map_or(true, |handle| handle.is_finished());
                        if ctx.cursor.load(Ordering::Acquire) >= total
                            && tail_done
                            && !ctx.dispatcher.is_in_flight()
                        {
                            break HaltReason::SnapshotExhausted;
                        }
                    }
                    Err(err) => {
                        // Transient scan failure; try again next interval
                        tracing::warn!(run_id = %ctx.run_id, error = %err, "Watchdog scan failed");
                    }
                }
            }
        }
    };

    let (completed, failed) = match ctx.repo.list(ctx.snapshot_limit).await {
        Ok(leads) => summary_counts(&leads, &snapshot_ids),
        Err(err) => {
            tracing::warn!(run_id = %ctx.run_id, error = %err, "Summary scan failed");
            (0, 0)
        }
    };

    let summary = RunSummary {
        run_id: ctx.run_id.clone(),
        completed,
        failed,
        reason,
    };
    tracing::info!(
        run_id = %ctx.run_id,
        completed,
        failed,
        reason = ?reason,
        "Pacing run finished"
    );
    *ctx.last_summary.write() = Some(summary.clone());
    let _ = ctx.events.send(DialerEvent::RunFinished(summary));
}

/// Termination condition over the live set: nothing left to dial, nothing
/// in flight, and at least one call actually completed.
fn all_calls_resolved(leads: &[Lead]) -> bool {
    let eligible = leads.iter().filter(|l| l.is_eligible()).count();
    let in_progress = leads
        .iter()
        .filter(|l| l.status == LeadStatus::InProgress)
        .count();
    let completed = leads
        .iter()
        .filter(|l| l.status == LeadStatus::Completed)
        .count();
    eligible == 0 && in_progress == 0 && completed > 0
}

fn summary_counts(leads: &[Lead], snapshot_ids: &HashSet<String>) -> (usize, usize) {
    let mut completed = 0;
    let mut failed = 0;
    for lead in leads.iter().filter(|l| snapshot_ids.contains(&l.id)) {
        match lead.status {
            LeadStatus::Completed => completed += 1,
            LeadStatus::Failed => failed += 1,
            _ => {}
        }
    }
    (completed, failed)
}
