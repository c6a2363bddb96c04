//! Core entity structs: the pet, its remote record, per-tick snapshots,
//! UI notices, and the credential set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{LifecyclePhase, Theme, Vital};
use crate::ids::PetId;

/// Upper bound of every vital level and of health.
pub const MAX_LEVEL: f64 = 100.0;

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

/// The pet owned by the current session.
///
/// Vital levels live in the session's per-vital state, not here; the pet
/// only carries identity, experience, and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    /// Session-local identity used to tag background work.
    pub id: PetId,
    /// Name chosen by the user at creation.
    pub name: String,
    /// Experience points. Saturates at `u64::MAX`.
    pub xp: u64,
    /// Health in `[0, 100]`. The pet dies when it reaches 0.
    pub health: f64,
}

impl Pet {
    /// A freshly hatched pet: full health, no experience.
    pub fn hatch(name: impl Into<String>) -> Self {
        Self {
            id: PetId::new(),
            name: name.into(),
            xp: 0,
            health: MAX_LEVEL,
        }
    }
}

/// The pet as stored by the persistence service.
///
/// Field names follow the service's JSON (`PetName`, `XP`, ...). Missing
/// vital levels default to full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PetRecord {
    /// Pet name.
    pub pet_name: String,
    /// Experience points.
    #[serde(rename = "XP", default)]
    pub xp: i64,
    /// Health level.
    #[serde(default = "full_level")]
    pub health: f64,
    /// Food level.
    #[serde(default = "full_level")]
    pub food: f64,
    /// Water level.
    #[serde(default = "full_level")]
    pub water: f64,
    /// Stamina level.
    #[serde(default = "full_level")]
    pub stamina: f64,
}

impl PetRecord {
    /// A record for a newly created pet with every stat full.
    pub fn new(pet_name: impl Into<String>) -> Self {
        Self {
            pet_name: pet_name.into(),
            xp: 0,
            health: MAX_LEVEL,
            food: MAX_LEVEL,
            water: MAX_LEVEL,
            stamina: MAX_LEVEL,
        }
    }

    /// Build a session pet from this record with a fresh session id.
    ///
    /// Negative experience is treated as 0 and health is clamped to
    /// `[0, 100]` (NaN becomes 0).
    pub fn to_pet(&self) -> Pet {
        Pet {
            id: PetId::new(),
            name: self.pet_name.clone(),
            xp: u64::try_from(self.xp).unwrap_or(0),
            health: clamp_level(self.health),
        }
    }
}

/// Clamp a level into `[0, 100]`, mapping NaN to 0.
pub fn clamp_level(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_LEVEL)
}

/// Distance from a bound within which a level is treated as on the bound.
pub const SNAP_EPSILON: f64 = 1e-6;

/// Clamp into `[0, 100]` and pull values within [`SNAP_EPSILON`] of a
/// bound onto it. Used for every level the tick drives toward a bound,
/// vitals and health alike.
pub fn snap_level(value: f64) -> f64 {
    let value = clamp_level(value);
    if value < SNAP_EPSILON {
        0.0
    } else if MAX_LEVEL - value < SNAP_EPSILON {
        MAX_LEVEL
    } else {
        value
    }
}

/// Experience as the signed integer used by the persistence service.
/// Saturates at `i64::MAX`.
pub fn xp_to_wire(xp: u64) -> i64 {
    i64::try_from(xp).unwrap_or(i64::MAX)
}

const fn full_level() -> f64 {
    MAX_LEVEL
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Observable state of a single vital at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSnapshot {
    /// Which vital this is.
    pub vital: Vital,
    /// Level in `[0, 100]`.
    pub level: f64,
    /// Whether the replenishing action is engaged.
    pub active: bool,
    /// Whether the vital has been empty for longer than its grace period.
    pub dying: bool,
    /// Cosmetic alternate-icon phase, only ever set while the level is 0.
    pub blink: bool,
}

/// Immutable view of the session emitted once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSnapshot {
    /// Tick counter at the time of the snapshot.
    pub tick: u64,
    /// Lifecycle phase.
    pub phase: LifecyclePhase,
    /// Pet name, if a pet exists.
    pub pet_name: Option<String>,
    /// Health in `[0, 100]` (0 when there is no pet).
    pub health: f64,
    /// Experience points (0 when there is no pet).
    pub xp: u64,
    /// Vital snapshots in tick order (empty when there is no live pet).
    pub vitals: Vec<VitalSnapshot>,
    /// Selected background theme.
    pub theme: Theme,
    /// Current simulation speed multiplier.
    pub simulation_speed: f64,
}

impl PetSnapshot {
    /// Whether the snapshot shows a live pet.
    pub const fn is_alive(&self) -> bool {
        self.phase.is_simulating()
    }

    /// Look up the snapshot of one vital.
    pub fn vital(&self, vital: Vital) -> Option<&VitalSnapshot> {
        self.vitals.iter().find(|v| v.vital == vital)
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Something the UI should surface to the user outside the regular
/// per-tick snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The pet died. Terminal for that pet.
    PetDied {
        /// Name of the pet.
        name: String,
        /// Experience at death.
        final_xp: u64,
        /// High score recorded before this pet died. `None` when it could
        /// not be read; the stored score is left alone in that case.
        prior_high_score: Option<i64>,
    },
    /// A stored pet was loaded for the signed-in account.
    PetLoaded {
        /// Name of the pet.
        name: String,
    },
    /// The account has no pet; a restart will create one.
    NoPet,
    /// A restart needs a name for the new pet.
    NameRequested,
    /// A new pet was created.
    PetCreated {
        /// Name of the new pet.
        name: String,
    },
    /// Creating the pet failed or was cancelled.
    CreationFailed {
        /// Human-readable reason.
        reason: String,
    },
    /// No credentials are available; the user has to sign in.
    SignInRequired,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// The credentials used to talk to the persistence service.
///
/// A token set is always replaced as a whole, never edited in place, so
/// readers can never observe an id token from one refresh paired with the
/// refresh token of another.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token presented to the persistence service.
    pub id_token: String,
    /// Token used to obtain the next token set.
    pub refresh_token: String,
    /// When this set was issued.
    #[serde(default = "Utc::now")]
    pub issued_at: DateTime<Utc>,
}

impl TokenSet {
    /// Create a token set issued now.
    pub fn new(id_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            issued_at: Utc::now(),
        }
    }
}

impl core::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSet")
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hatched_pet_is_healthy() {
        let pet = Pet::hatch("Mochi");
        assert_eq!(pet.name, "Mochi");
        assert_eq!(pet.xp, 0);
        assert!((pet.health - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn record_uses_service_field_names() {
        let json = r#"{"PetName":"Mochi","XP":12,"Health":55.5,"Food":10.0,"Water":20.0,"Stamina":30.0}"#;
        let record: PetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pet_name, "Mochi");
        assert_eq!(record.xp, 12);
        assert!((record.stamina - 30.0).abs() < f64::EPSILON);

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["XP"], 12);
        assert_eq!(out["PetName"], "Mochi");
    }

    #[test]
    fn record_defaults_missing_levels_to_full() {
        let record: PetRecord = serde_json::from_str(r#"{"PetName":"Mochi"}"#).unwrap();
        assert_eq!(record.xp, 0);
        assert!((record.food - MAX_LEVEL).abs() < f64::EPSILON);
        assert!((record.health - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn record_to_pet_sanitizes_values() {
        let mut record = PetRecord::new("Mochi");
        record.xp = -5;
        record.health = 250.0;
        let pet = record.to_pet();
        assert_eq!(pet.xp, 0);
        assert!((pet.health - MAX_LEVEL).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_level_handles_nan() {
        assert!(clamp_level(f64::NAN).abs() < f64::EPSILON);
        assert!(clamp_level(-3.0).abs() < f64::EPSILON);
        assert!((clamp_level(42.0) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn xp_to_wire_saturates() {
        assert_eq!(xp_to_wire(42), 42);
        assert_eq!(xp_to_wire(u64::MAX), i64::MAX);
    }

    #[test]
    fn snap_level_pulls_near_bounds() {
        assert!(snap_level(5e-7).abs() < f64::EPSILON);
        assert!((snap_level(MAX_LEVEL - 5e-7) - MAX_LEVEL).abs() < f64::EPSILON);
        assert!((snap_level(50.0) - 50.0).abs() < f64::EPSILON);
        assert!(snap_level(-1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn token_debug_is_redacted() {
        let tokens = TokenSet::new("secret-id", "secret-refresh");
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn notice_is_tagged() {
        let notice = Notice::PetCreated {
            name: String::from("Mochi"),
        };
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(value["kind"], "pet_created");
    }
}
