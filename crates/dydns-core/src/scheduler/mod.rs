//! Fixed-interval reconciliation loop
//!
//! The Scheduler is responsible for:
//! - Running one reconciliation pass per tick, bounded by a per-attempt timeout
//! - Reporting each outcome through tracing and the event channel
//! - Waiting out the interval between ticks
//! - Stopping promptly when its cancellation token fires
//!
//! ## State Machine
//!
//! ```text
//!            ┌──────── tick ────────┐
//!            ▼                      │
//! start ─► Running ── pass ── idle ─┘
//!            │                 │
//!            └──── cancel ─────┴──► Stopped
//! ```
//!
//! A failed pass is never fatal: it is reported and the loop moves on to
//! the next tick at the same fixed interval. There is no backoff.

use crate::config::{ReconciliationTarget, SchedulerConfig};
use crate::error::{Error, Result};
use crate::reconciler::{ReconciliationOutcome, Reconciler};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Events emitted by the Scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Loop started
    Started {
        host: String,
        domain: String,
        interval: Duration,
    },

    /// A reconciliation pass finished (successfully or not)
    PassCompleted {
        /// 1-based pass counter
        tick: u64,
        outcome: ReconciliationOutcome,
        finished_at: DateTime<Utc>,
    },

    /// Loop stopped
    Stopped {
        /// Passes started before stopping
        ticks: u64,
        reason: String,
    },
}

/// Drives reconciliation passes until cancelled
///
/// ## Lifecycle
///
/// 1. Create with [`Scheduler::new()`]
/// 2. Start with [`Scheduler::run()`], handing it a `CancellationToken`
/// 3. Cancel the token to stop; `run()` returns once the loop has exited
///
/// Only one pass is ever in flight.
pub struct Scheduler {
    /// Performs the passes
    reconciler: Reconciler,

    /// Record to keep current
    target: ReconciliationTarget,

    /// Idle wait between passes
    interval: Duration,

    /// Ceiling for a single pass
    attempt_timeout: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SchedulerEvent>,
}

impl Scheduler {
    /// Create a new scheduler
    ///
    /// # Returns
    ///
    /// A tuple of (scheduler, event_receiver) where event_receiver yields
    /// scheduler events. Dropping the receiver is fine; events are then
    /// discarded.
    pub fn new(
        reconciler: Reconciler,
        target: ReconciliationTarget,
        config: SchedulerConfig,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        target.validate()?;
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let scheduler = Self {
            reconciler,
            target,
            interval: config.interval(),
            attempt_timeout: config.attempt_timeout(),
            event_tx: tx,
        };

        Ok((scheduler, rx))
    }

    /// Run the loop until `shutdown` is cancelled
    ///
    /// The first pass starts immediately. Cancellation interrupts an
    /// in-flight pass as well as the idle wait.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            host = %self.target.host,
            domain = %self.target.domain,
            interval_secs = self.interval.as_secs(),
            attempt_timeout_secs = self.attempt_timeout.as_secs(),
            "Scheduler started"
        );
        self.emit_event(SchedulerEvent::Started {
            host: self.target.host.clone(),
            domain: self.target.domain.clone(),
            interval: self.interval,
        });

        let mut tick: u64 = 0;

        let reason = loop {
            if shutdown.is_cancelled() {
                break "Shutdown signal";
            }

            tick += 1;
            debug!(tick, "Starting reconciliation pass");

            let outcome = tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    warn!(tick, "Shutdown signal received during reconciliation pass");
                    break "Shutdown signal during pass";
                }

                outcome = self.run_once() => outcome,
            };

            self.report(tick, outcome);

            tokio::select! {
                biased;

                () = shutdown.cancelled() => break "Shutdown signal",

                () = tokio::time::sleep(self.interval) => {}
            }
        };

        info!(ticks = tick, reason, "Scheduler stopped");
        self.emit_event(SchedulerEvent::Stopped {
            ticks: tick,
            reason: reason.to_string(),
        });
    }

    /// Run a single pass bounded by the per-attempt timeout
    pub async fn run_once(&self) -> ReconciliationOutcome {
        match tokio::time::timeout(self.attempt_timeout, self.reconciler.reconcile(&self.target))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => ReconciliationOutcome::Failed(Error::Timeout(self.attempt_timeout)),
        }
    }

    fn report(&self, tick: u64, outcome: ReconciliationOutcome) {
        let label = outcome.label();

        match (&outcome, outcome.error()) {
            // Retrying alone will not fix these
            (_, Some(err)) if err.is_configuration_problem() => {
                error!(
                    tick,
                    outcome = label,
                    error = %err,
                    "Reconciliation pass failed; operator action required"
                );
            }
            (_, Some(err)) => {
                warn!(
                    tick,
                    outcome = label,
                    error = %err,
                    "Reconciliation pass failed, retrying next tick"
                );
            }
            (
                ReconciliationOutcome::Updated {
                    previous,
                    current,
                    detail,
                },
                None,
            ) => {
                info!(
                    tick,
                    outcome = label,
                    %previous,
                    %current,
                    %detail,
                    "DNS record updated"
                );
            }
            (ReconciliationOutcome::AlreadyCurrent { address }, None) => {
                info!(tick, outcome = label, %address, "DNS record already current");
            }
            (
                ReconciliationOutcome::NoMatchingRecord { .. } | ReconciliationOutcome::Failed(_),
                None,
            ) => {}
        }

        self.emit_event(SchedulerEvent::PassCompleted {
            tick,
            outcome,
            finished_at: Utc::now(),
        });
    }

    fn emit_event(&self, event: SchedulerEvent) {
        // A closed channel means nobody is listening, which is fine
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event; consider raising event_channel_capacity");
        }
    }
}
