//! Cosmetic blink timer for empty vitals.
//!
//! One timer is shared by all vitals. Each time it completes a period,
//! every empty vital flips its alternate-icon phase. Nothing in the
//! simulation reads the phase.

/// Shared blink timer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Blinker {
    timer_ms: f64,
}

impl Blinker {
    /// A timer with no accumulated time.
    pub const fn new() -> Self {
        Self { timer_ms: 0.0 }
    }

    /// Accumulate `dt_ms` and report whether a blink period completed.
    ///
    /// The timer restarts from zero on each flip. A non-positive period
    /// flips on every tick.
    pub fn step(&mut self, dt_ms: f64, period_ms: f64) -> bool {
        self.timer_ms += dt_ms.max(0.0);
        if self.timer_ms >= period_ms {
            self.timer_ms = 0.0;
            true
        } else {
            false
        }
    }

    /// Forget accumulated time.
    pub const fn reset(&mut self) {
        self.timer_ms = 0.0;
    }
}

/// Next blink phase for one vital.
///
/// The phase is only ever set while the level is 0.
pub fn next_phase(current: bool, level: f64, flip: bool) -> bool {
    if level > 0.0 {
        false
    } else if flip {
        !current
    } else {
        current
    }
}
