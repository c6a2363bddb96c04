//! Health decay and experience award.
//!
//! While any vital is dying, health drains linearly over `time_to_die_ms`.
//! Several dying vitals do not stack. While nothing is dying, distress-free
//! time accumulates in an experience timer that awards one point per
//! `time_for_point_ms`, carrying the remainder into the next tick. A tick
//! either drains health or earns experience, never both.

use tamagotchi_types::{MAX_LEVEL, Pet, snap_level};

use crate::config::HealthConfig;

/// What one health step did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthStep {
    /// Health removed this tick.
    pub health_lost: f64,
    /// Experience points awarded this tick.
    pub xp_awarded: u64,
}

/// Apply one tick of health decay or experience gain to the pet.
///
/// `xp_timer_ms` is the session's experience timer. It is left untouched
/// while the pet is dying.
pub fn step(
    pet: &mut Pet,
    any_dying: bool,
    dt_ms: f64,
    config: &HealthConfig,
    xp_timer_ms: &mut f64,
) -> HealthStep {
    if any_dying {
        let before = pet.health;
        pet.health = if config.time_to_die_ms <= 0.0 {
            0.0
        } else {
            snap_level(pet.health - MAX_LEVEL * dt_ms / config.time_to_die_ms)
        };
        return HealthStep {
            health_lost: before - pet.health,
            xp_awarded: 0,
        };
    }

    *xp_timer_ms += dt_ms;
    let points = if config.time_for_point_ms <= 0.0 {
        *xp_timer_ms = 0.0;
        1
    } else {
        let whole = (*xp_timer_ms / config.time_for_point_ms).floor();
        *xp_timer_ms -= whole * config.time_for_point_ms;
        whole_points(whole)
    };
    pet.xp = pet.xp.saturating_add(points);
    HealthStep {
        health_lost: 0.0,
        xp_awarded: points,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_points(whole: f64) -> u64 {
    // Float-to-int casts saturate, so huge ticks award u64::MAX at most.
    if whole > 0.0 { whole as u64 } else { 0 }
}
