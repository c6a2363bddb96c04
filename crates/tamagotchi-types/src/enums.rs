//! Enumeration types for the Tamagotchi pet simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// A depletable, replenishable vital stat of the pet.
///
/// The declaration order is the order in which the tick processes the
/// vitals: food, then stamina, then water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vital {
    /// Replenished by feeding.
    Food,
    /// Replenished by resting.
    Stamina,
    /// Replenished by drinking.
    Water,
}

impl Vital {
    /// All vitals in tick order.
    pub const ALL: [Self; 3] = [Self::Food, Self::Stamina, Self::Water];

    /// Name of the user action that replenishes this vital.
    pub const fn action(self) -> &'static str {
        match self {
            Self::Food => "feeding",
            Self::Stamina => "resting",
            Self::Water => "drinking",
        }
    }
}

impl core::fmt::Display for Vital {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Food => write!(f, "food"),
            Self::Stamina => write!(f, "stamina"),
            Self::Water => write!(f, "water"),
        }
    }
}

/// What the user has the pet doing for a given vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// No replenishing action engaged; the vital drains.
    #[default]
    Idle,
    /// The replenishing action is engaged; the vital refills.
    Replenishing,
}

impl Activity {
    /// Flip between idle and replenishing.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Idle => Self::Replenishing,
            Self::Replenishing => Self::Idle,
        }
    }

    /// Whether the replenishing action is engaged.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Replenishing)
    }
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// Background theme chosen by the user.
///
/// Stored remotely as an integer. Values the client does not know about
/// fall back to [`Theme::Red`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Black background.
    Black,
    /// Red background (default).
    #[default]
    Red,
    /// Green background.
    Green,
    /// Blue background.
    Blue,
}

impl Theme {
    /// Decode a wire value, falling back to the default theme.
    pub fn from_wire(value: i64) -> Self {
        match value {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Blue,
            _ => Self::default(),
        }
    }

    /// Encode as the integer stored by the persistence service.
    pub const fn to_wire(self) -> i32 {
        match self {
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Blue => 3,
        }
    }

    /// Parse a theme name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Coarse lifecycle phase of the session, as shown to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// No credentials; the user has to sign in.
    SignedOut,
    /// Credentials present, the pet is being fetched.
    Loading,
    /// Signed in but the account has no pet.
    NoPet,
    /// Restart requested; waiting for the user to name the new pet.
    AwaitingName,
    /// A name was supplied and the pet is being created remotely.
    Creating,
    /// The pet is alive and the simulation is running.
    Alive,
    /// The pet died; waiting for a restart.
    Dead,
}

impl LifecyclePhase {
    /// Whether the simulation advances vitals in this phase.
    pub const fn is_simulating(self) -> bool {
        matches!(self, Self::Alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_in_tick_order() {
        assert_eq!(Vital::ALL, [Vital::Food, Vital::Stamina, Vital::Water]);
    }

    #[test]
    fn activity_toggles() {
        assert_eq!(Activity::Idle.toggled(), Activity::Replenishing);
        assert_eq!(Activity::Replenishing.toggled(), Activity::Idle);
        assert!(!Activity::default().is_active());
    }

    #[test]
    fn theme_wire_values_round_trip() {
        for theme in [Theme::Black, Theme::Red, Theme::Green, Theme::Blue] {
            assert_eq!(Theme::from_wire(i64::from(theme.to_wire())), theme);
        }
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        assert_eq!(Theme::from_wire(42), Theme::Red);
        assert_eq!(Theme::from_wire(-1), Theme::Red);
    }

    #[test]
    fn theme_names_parse() {
        assert_eq!(Theme::parse("Blue"), Some(Theme::Blue));
        assert_eq!(Theme::parse("purple"), None);
    }
}
