//! Session loop runner.
//!
//! [`run_session`] drives the tick on a fixed wall-clock cadence and
//! multiplexes three event sources with it:
//!
//! - **Ticks** from a [`tokio::time::interval`] at the clock's period
//! - **Commands** from the UI boundary
//! - **Outcomes** from the background worker
//!
//! Events are handled one at a time, so a tick always runs to completion
//! before the next command or outcome is applied. Jobs produced by any
//! of them go out on the job channel; snapshots and notices go to the
//! [`SnapshotSink`].
//!
//! The run ends on a stop request, after `max_ticks`, or when the command
//! channel closes. Before returning it queues the shutdown save.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tamagotchi_types::{Command, Job, Notice, Outcome, PetSnapshot};
use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::session::{Reaction, Session};
use crate::tick::{self, TickError};

/// Errors that can occur during the session run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason why the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested.
    Stopped,
    /// The UI boundary hung up.
    CommandsClosed,
}

/// Result of the session run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: SessionEndReason,
    /// The last snapshot emitted, if any tick completed.
    pub final_snapshot: Option<PetSnapshot>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Receives the session's output.
///
/// Implementations render or log snapshots and surface notices to the
/// user. Both calls happen on the loop task and must not block.
pub trait SnapshotSink: Send {
    /// Called after every tick with the resulting snapshot.
    fn on_tick(&mut self, snapshot: &PetSnapshot);

    /// Called for every notice, in emission order.
    fn on_notice(&mut self, notice: &Notice);
}

/// A sink that discards everything.
pub struct NoOpSink;

impl SnapshotSink for NoOpSink {
    fn on_tick(&mut self, _snapshot: &PetSnapshot) {}

    fn on_notice(&mut self, _notice: &Notice) {}
}

/// Shared stop control for a running session.
#[derive(Debug)]
pub struct SessionControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the loop when a stop is requested.
    stop_notify: Notify,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,
}

impl SessionControl {
    /// Create a control with an optional tick bound (0 = unlimited).
    pub fn new(max_ticks: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            max_ticks,
        }
    }

    /// Request a clean stop and wake the loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }

    /// Get the configured tick limit.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }
}

/// Channel ends the loop owns.
#[derive(Debug)]
pub struct SessionChannels {
    /// Commands from the UI boundary.
    pub commands: mpsc::UnboundedReceiver<Command>,
    /// Outcomes from the background worker.
    pub outcomes: mpsc::UnboundedReceiver<Outcome>,
    /// Jobs for the background worker.
    pub jobs: mpsc::UnboundedSender<Job>,
}

/// Run the session loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails unrecoverably.
pub async fn run_session(
    session: &mut Session,
    channels: &mut SessionChannels,
    control: &Arc<SessionControl>,
    sink: &mut dyn SnapshotSink,
) -> Result<RunResult, RunnerError> {
    let mut final_snapshot: Option<PetSnapshot> = None;
    let mut total_ticks: u64 = 0;
    let mut outcomes_open = true;

    let period = session.clock().period();
    info!(
        max_ticks = control.max_ticks(),
        tick_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        speed = session.clock().speed(),
        "Session starting"
    );

    let startup = session.startup();
    dispatch(startup, &channels.jobs, sink);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let end_reason = loop {
        if control.is_stop_requested() {
            info!("Stop requested");
            break SessionEndReason::Stopped;
        }

        tokio::select! {
            biased;

            () = control.stopped() => {
                info!("Stop requested");
                break SessionEndReason::Stopped;
            }

            _ = interval.tick() => {
                let summary = tick::run_tick(session)?;
                total_ticks = total_ticks.saturating_add(1);

                let reaction = Reaction {
                    jobs: summary.jobs,
                    notices: Vec::new(),
                };
                dispatch(reaction, &channels.jobs, sink);
                sink.on_tick(&summary.snapshot);

                if control.tick_limit_reached(summary.tick) {
                    info!(
                        tick = summary.tick,
                        max_ticks = control.max_ticks(),
                        "Tick limit reached"
                    );
                    final_snapshot = Some(summary.snapshot);
                    break SessionEndReason::MaxTicksReached;
                }
                final_snapshot = Some(summary.snapshot);
            }

            outcome = channels.outcomes.recv(), if outcomes_open => {
                if let Some(outcome) = outcome {
                    let reaction = session.handle_outcome(outcome);
                    dispatch(reaction, &channels.jobs, sink);
                } else {
                    warn!("Outcome channel closed, background results will no longer arrive");
                    outcomes_open = false;
                }
            }

            command = channels.commands.recv() => {
                let Some(command) = command else {
                    info!("Command channel closed");
                    break SessionEndReason::CommandsClosed;
                };
                debug!(?command, "Command received");
                let reaction = session.handle_command(command);
                dispatch(reaction, &channels.jobs, sink);
            }
        }
    };

    let shutdown = session.shutdown();
    dispatch(shutdown, &channels.jobs, sink);

    Ok(RunResult {
        end_reason,
        final_snapshot,
        total_ticks,
    })
}

fn dispatch(reaction: Reaction, jobs: &mpsc::UnboundedSender<Job>, sink: &mut dyn SnapshotSink) {
    for job in reaction.jobs {
        let kind = job.kind();
        if jobs.send(job).is_err() {
            warn!(job = kind, "Background worker is gone, dropping job");
        }
    }
    for notice in &reaction.notices {
        sink.on_notice(notice);
    }
}

/// Log the end of a session run.
pub fn log_session_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_snapshot.as_ref().map(|s| s.tick),
        "Session ended"
    );

    if let Some(ref snapshot) = result.final_snapshot {
        info!(
            phase = ?snapshot.phase,
            pet = snapshot.pet_name.as_deref().unwrap_or("-"),
            xp = snapshot.xp,
            health = snapshot.health,
            "Final snapshot"
        );
    } else {
        warn!("Session ended with no ticks executed");
    }
}
