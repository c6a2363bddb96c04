//! The simulation tick.
//!
//! Each tick advances the clock and, while a pet is alive, runs these
//! steps in order:
//!
//! 1. **Vitals** -- drain or refill food, stamina, then water.
//! 2. **Distress** -- update the time-without-resource counters in the same
//!    order, reading the levels produced by step 1.
//! 3. **Blink** -- advance the cosmetic blink phase of empty vitals.
//! 4. **Health** -- drain health while any vital is dying, otherwise earn
//!    experience.
//! 5. **Death** -- detect health reaching 0, mark the session dead, and
//!    queue the end-of-life bookkeeping.
//!
//! Without a live pet the tick is idle: only the clock moves. Either way
//! the tick ends with a snapshot.

use tamagotchi_types::{Job, PetSnapshot};
use tracing::{debug, info};

use crate::clock::{ClockError, checked_delta};
use crate::health::{self, HealthStep};
use crate::lifecycle::DeathEvent;
use crate::session::Session;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated milliseconds the tick covered (0 for an idle tick).
    pub dt_ms: f64,
    /// Health decay or experience gain, if a pet was simulated.
    pub health: Option<HealthStep>,
    /// The death detected this tick, if any.
    pub death: Option<DeathEvent>,
    /// Jobs the tick queued for the background worker.
    pub jobs: Vec<Job>,
    /// The session as it stands after the tick.
    pub snapshot: PetSnapshot,
}

/// Execute one tick against the session.
pub fn run_tick(session: &mut Session) -> Result<TickSummary, TickError> {
    let tick = session.clock.advance()?;

    if session.lifecycle.is_alive()
        && let Some(pet) = session.pet.as_mut()
    {
        let dt_ms = checked_delta(session.clock.delta_ms());

        session.vitals.advance(dt_ms, &session.vitals_config);
        session
            .vitals
            .blink(dt_ms, session.health_config.blink_period_ms);

        let any_dying = session.vitals.any_dying();
        let step = health::step(
            pet,
            any_dying,
            dt_ms,
            &session.health_config,
            &mut session.xp_timer_ms,
        );
        if step.xp_awarded > 0 {
            debug!(tick, xp = pet.xp, "Experience awarded");
        }

        let death = session.lifecycle.check_death(pet);
        let mut jobs = Vec::new();
        if let Some(ref event) = death {
            info!(tick, name = %event.name, final_xp = event.final_xp, "Pet has died");
            jobs.push(Job::Bury {
                tag: session.tag(),
                name: event.name.clone(),
                xp: event.final_xp,
            });
        }

        return Ok(TickSummary {
            tick,
            dt_ms,
            health: Some(step),
            death,
            jobs,
            snapshot: session.snapshot(),
        });
    }

    Ok(TickSummary {
        tick,
        dt_ms: 0.0,
        health: None,
        death: None,
        jobs: Vec::new(),
        snapshot: session.snapshot(),
    })
}
