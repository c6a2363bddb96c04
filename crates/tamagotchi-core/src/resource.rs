//! Drain and refill arithmetic for a single vital.
//!
//! A vital moves linearly between 0 and 100: it refills over `refill_ms`
//! while the replenishing action is engaged and drains over `deplete_ms`
//! otherwise. Results are clamped to `[0, 100]` and snap to a bound when
//! they land within [`tamagotchi_types::SNAP_EPSILON`] of it, so a vital
//! driven for exactly its nominal duration in whole ticks ends on the
//! bound rather than a rounding error away from it.

use tamagotchi_types::{Activity, MAX_LEVEL, clamp_level, snap_level};

use crate::config::VitalConfig;

/// Advance a vital level by `dt_ms` of simulated time.
///
/// A zero or negative duration in the configuration moves the level
/// straight to the corresponding bound.
pub fn advance(level: f64, activity: Activity, dt_ms: f64, config: &VitalConfig) -> f64 {
    let level = clamp_level(level);
    if dt_ms <= 0.0 {
        return level;
    }
    match activity {
        Activity::Replenishing => {
            if config.refill_ms <= 0.0 {
                return MAX_LEVEL;
            }
            snap_level(level + MAX_LEVEL * dt_ms / config.refill_ms)
        }
        Activity::Idle => {
            if config.deplete_ms <= 0.0 {
                return 0.0;
            }
            snap_level(level - MAX_LEVEL * dt_ms / config.deplete_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOD: VitalConfig = VitalConfig {
        deplete_ms: 10_800_000.0,
        refill_ms: 900_000.0,
        grace_ms: 600_000.0,
    };

    fn run(mut level: f64, activity: Activity, ticks: u32, dt: f64) -> f64 {
        for _ in 0..ticks {
            level = advance(level, activity, dt, &FOOD);
        }
        level
    }

    #[test]
    fn idle_vital_drains() {
        let level = advance(100.0, Activity::Idle, 108_000.0, &FOOD);
        assert!((level - 99.0).abs() < 1e-9);
    }

    #[test]
    fn replenishing_vital_refills() {
        let level = advance(50.0, Activity::Replenishing, 9_000.0, &FOOD);
        assert!((level - 51.0).abs() < 1e-9);
    }

    #[test]
    fn food_empties_after_deplete_time_in_ticks() {
        // 10_800_000ms / 250ms per tick
        let level = run(100.0, Activity::Idle, 43_200, 250.0);
        assert!(level.abs() < f64::EPSILON);
    }

    #[test]
    fn food_not_yet_empty_one_tick_early() {
        let level = run(100.0, Activity::Idle, 43_199, 250.0);
        assert!(level > 0.0);
    }

    #[test]
    fn food_fills_after_refill_time_in_ticks() {
        let level = run(0.0, Activity::Replenishing, 3_600, 250.0);
        assert!((level - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn doubled_speed_halves_drain_time() {
        let level = run(100.0, Activity::Idle, 21_600, 500.0);
        assert!(level.abs() < f64::EPSILON);
    }

    #[test]
    fn level_stays_within_bounds() {
        let mut level = 100.0;
        let mut activity = Activity::Replenishing;
        for step in 0..2_000_u32 {
            if step % 37 == 0 {
                activity = activity.toggled();
            }
            level = advance(level, activity, f64::from(step % 5) * 40_000.0, &FOOD);
            assert!((0.0..=MAX_LEVEL).contains(&level), "level {level} out of range");
        }
    }

    #[test]
    fn zero_durations_jump_to_bounds() {
        let instant = VitalConfig {
            deplete_ms: 0.0,
            refill_ms: -5.0,
            grace_ms: 0.0,
        };
        assert!(advance(70.0, Activity::Idle, 250.0, &instant).abs() < f64::EPSILON);
        assert!((advance(70.0, Activity::Replenishing, 250.0, &instant) - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_delta_leaves_level_alone() {
        assert!((advance(42.0, Activity::Idle, 0.0, &FOOD) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert!((advance(140.0, Activity::Replenishing, 250.0, &FOOD) - MAX_LEVEL).abs() < f64::EPSILON);
        assert!(advance(f64::NAN, Activity::Idle, 250.0, &FOOD).abs() < f64::EPSILON);
    }
}
