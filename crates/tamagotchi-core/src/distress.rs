//! Sustained-exhaustion detection for a single vital.
//!
//! A vital that sits at 0 accumulates time without the resource. Once that
//! time reaches the grace period the pet is dying of it. Any level above 0
//! clears the counter. The dying flag is a projection of the counter, so
//! the two cannot disagree.

use serde::{Deserialize, Serialize};

/// Distress state of one vital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Distress {
    /// The vital is above 0.
    #[default]
    Sated,
    /// The vital is empty but still within its grace period.
    Starving {
        /// Simulated time spent at 0.
        elapsed_ms: f64,
    },
    /// The vital has been empty for at least its grace period.
    Dying {
        /// Simulated time spent at 0.
        elapsed_ms: f64,
    },
}

impl Distress {
    /// Fold one tick into the distress state.
    ///
    /// Must be called with the level produced by this tick's drain/refill
    /// step, not the level from before it.
    #[must_use]
    pub fn update(self, level: f64, dt_ms: f64, grace_ms: f64) -> Self {
        if level > 0.0 {
            return Self::Sated;
        }
        let elapsed_ms = self.elapsed_ms() + dt_ms.max(0.0);
        if elapsed_ms >= grace_ms {
            Self::Dying { elapsed_ms }
        } else {
            Self::Starving { elapsed_ms }
        }
    }

    /// Time the vital has spent at 0 since it was last above 0.
    pub const fn elapsed_ms(self) -> f64 {
        match self {
            Self::Sated => 0.0,
            Self::Starving { elapsed_ms } | Self::Dying { elapsed_ms } => elapsed_ms,
        }
    }

    /// Whether the pet is dying of this vital.
    pub const fn is_dying(self) -> bool {
        matches!(self, Self::Dying { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: f64 = 600_000.0;

    #[test]
    fn positive_level_is_sated() {
        let state = Distress::Dying { elapsed_ms: 900_000.0 }.update(0.5, 250.0, GRACE);
        assert_eq!(state, Distress::Sated);
        assert!(state.elapsed_ms().abs() < f64::EPSILON);
    }

    #[test]
    fn empty_level_accumulates() {
        let state = Distress::Sated.update(0.0, 250.0, GRACE);
        assert_eq!(state, Distress::Starving { elapsed_ms: 250.0 });
        let state = state.update(0.0, 250.0, GRACE);
        assert!((state.elapsed_ms() - 500.0).abs() < f64::EPSILON);
        assert!(!state.is_dying());
    }

    #[test]
    fn dying_exactly_at_grace() {
        let mut state = Distress::Sated;
        for _ in 0..2_399 {
            state = state.update(0.0, 250.0, GRACE);
        }
        assert!(!state.is_dying(), "dying before grace elapsed");
        state = state.update(0.0, 250.0, GRACE);
        assert!(state.is_dying());
        assert!((state.elapsed_ms() - GRACE).abs() < f64::EPSILON);
    }

    #[test]
    fn dying_matches_counter() {
        let mut state = Distress::Sated;
        for step in 0..5_000_u32 {
            let level = if step % 1_000 < 700 { 0.0 } else { 10.0 };
            state = state.update(level, 250.0, GRACE);
            assert_eq!(state.is_dying(), state.elapsed_ms() >= GRACE);
        }
    }

    #[test]
    fn zero_grace_dies_on_first_empty_tick() {
        assert!(Distress::Sated.update(0.0, 250.0, 0.0).is_dying());
    }
}
