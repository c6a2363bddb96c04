//! Session clock: tick counter, tick cadence, and time scale.
//!
//! The clock is the single source of truth for how much simulated time a
//! tick covers. The wall-clock cadence is fixed (250ms by default); the
//! simulated time per tick is that period multiplied by the simulation
//! speed, so doubling the speed halves every real-time duration in the
//! game without changing how often the tick runs.

use std::time::Duration;

use tracing::warn;

use crate::config::ClockConfig;

/// Speed used whenever a requested speed is unusable.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid clock configuration (e.g. zero tick period).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Clock tracking the session's tick count and time scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClock {
    /// Number of ticks executed so far.
    tick: u64,

    /// Real time between ticks.
    period: Duration,

    /// Time-scale multiplier, always finite and positive.
    speed: f64,
}

impl SessionClock {
    /// Create a clock from configuration.
    ///
    /// An unusable configured speed falls back to [`DEFAULT_SPEED`].
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the tick period is zero.
    pub fn new(config: &ClockConfig) -> Result<Self, ClockError> {
        if config.tick_period_ms == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "tick_period_ms must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            period: Duration::from_millis(config.tick_period_ms),
            speed: sanitize_speed(config.simulation_speed),
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Real time between ticks.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Current time-scale multiplier.
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Change the time-scale multiplier. Returns the speed actually applied.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.speed = sanitize_speed(speed);
        self.speed
    }

    /// Simulated milliseconds covered by one tick: `period × speed`.
    pub fn delta_ms(&self) -> f64 {
        self.period.as_secs_f64() * 1_000.0 * self.speed
    }
}

/// Accept a finite, positive speed; anything else becomes [`DEFAULT_SPEED`].
pub fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        warn!(requested = speed, "rejecting non-positive simulation speed, using 1.0");
        DEFAULT_SPEED
    }
}

/// Precondition guard for elapsed simulated time.
///
/// A negative or non-finite delta is a programming error; debug builds
/// stop on it, release builds treat it as no time passing.
pub fn checked_delta(dt_ms: f64) -> f64 {
    debug_assert!(
        dt_ms.is_finite() && dt_ms >= 0.0,
        "elapsed time must be finite and non-negative, got {dt_ms}"
    );
    if dt_ms.is_finite() && dt_ms > 0.0 { dt_ms } else { 0.0 }
}
