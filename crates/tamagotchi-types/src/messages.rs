//! Messages crossing the session boundary.
//!
//! - [`Command`] flows from the UI into the session.
//! - [`Job`] flows from the session to the background persistence worker.
//! - [`Outcome`] flows back from the worker to the session.
//!
//! Every job carries a [`JobTag`] naming the session epoch (and pet, where
//! there is one) that issued it. The worker copies the tag onto the
//! outcome, and the session drops outcomes whose epoch has moved on.

use serde::{Deserialize, Serialize};

use crate::enums::{Theme, Vital};
use crate::ids::PetId;
use crate::structs::{PetRecord, TokenSet};

/// Session generation counter.
///
/// Bumped whenever the session's pet entity is replaced or the account
/// changes, which invalidates every job issued before the bump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The following epoch. Wraps at `u64::MAX`, which a session cannot reach.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl core::fmt::Display for Epoch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the session state a job was issued from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobTag {
    /// Session epoch at dispatch time.
    pub epoch: Epoch,
    /// The pet the job concerns, if any.
    pub pet_id: Option<PetId>,
}

/// A command from the UI boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start or stop feeding.
    ToggleFeeding,
    /// Start or stop resting.
    ToggleResting,
    /// Start or stop drinking.
    ToggleDrinking,
    /// Change the time-scale multiplier. Non-positive values fall back to 1.0.
    SetSimulationSpeed(f64),
    /// Restart: reload the pet or create a new one.
    RequestRestart,
    /// Answer to a name request during pet creation.
    NamePet(String),
    /// Abandon a pending pet creation.
    CancelCreation,
    /// Switch to another account using credentials from the login flow.
    RequestAccountSwitch(TokenSet),
    /// Change and persist the background theme.
    SetTheme(Theme),
    /// Persist the pet's experience and health now.
    SaveProgress,
}

impl Command {
    /// The vital a toggle command acts on.
    pub const fn toggled_vital(&self) -> Option<Vital> {
        match self {
            Self::ToggleFeeding => Some(Vital::Food),
            Self::ToggleResting => Some(Vital::Stamina),
            Self::ToggleDrinking => Some(Vital::Water),
            _ => None,
        }
    }
}

/// Work for the background persistence worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Fetch the account's pet and theme with the current credentials.
    Load {
        /// Issuing session state.
        tag: JobTag,
    },
    /// Publish new credentials, then load the pet and theme for them.
    SwitchAccount {
        /// Issuing session state.
        tag: JobTag,
        /// Credentials for the new account.
        tokens: TokenSet,
    },
    /// Reload the pet, or ask for a name if a new one must be created.
    Restart {
        /// Issuing session state.
        tag: JobTag,
        /// Create a new pet even if the service still returns one.
        replace: bool,
    },
    /// Create a pet with the given name.
    Create {
        /// Issuing session state.
        tag: JobTag,
        /// Name supplied by the user.
        name: String,
    },
    /// End-of-life bookkeeping for a dead pet.
    Bury {
        /// Issuing session state.
        tag: JobTag,
        /// Name of the dead pet.
        name: String,
        /// Experience at death.
        xp: u64,
    },
    /// Persist experience and health.
    SaveStats {
        /// Issuing session state.
        tag: JobTag,
        /// Experience to store.
        xp: u64,
        /// Health to store.
        health: f64,
    },
    /// Persist the theme.
    SaveTheme {
        /// Issuing session state.
        tag: JobTag,
        /// Theme to store.
        theme: Theme,
    },
}

impl Job {
    /// The tag of the session state that issued this job.
    pub const fn tag(&self) -> JobTag {
        match self {
            Self::Load { tag }
            | Self::SwitchAccount { tag, .. }
            | Self::Restart { tag, .. }
            | Self::Create { tag, .. }
            | Self::Bury { tag, .. }
            | Self::SaveStats { tag, .. }
            | Self::SaveTheme { tag, .. } => *tag,
        }
    }

    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::SwitchAccount { .. } => "switch_account",
            Self::Restart { .. } => "restart",
            Self::Create { .. } => "create",
            Self::Bury { .. } => "bury",
            Self::SaveStats { .. } => "save_stats",
            Self::SaveTheme { .. } => "save_theme",
        }
    }
}

/// Result of a job, delivered back to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Result of [`Job::Load`] or [`Job::SwitchAccount`].
    Loaded {
        /// Tag copied from the job.
        tag: JobTag,
        /// The stored pet, if the account has one.
        pet: Option<PetRecord>,
        /// The stored theme, or the default when unknown or unavailable.
        theme: Theme,
    },
    /// [`Job::Restart`] found a pet to continue with.
    PetFetched {
        /// Tag copied from the job.
        tag: JobTag,
        /// The stored pet.
        pet: PetRecord,
    },
    /// [`Job::Restart`] needs a name before a pet can be created.
    NameRequired {
        /// Tag copied from the job.
        tag: JobTag,
    },
    /// [`Job::Create`] succeeded.
    Created {
        /// Tag copied from the job.
        tag: JobTag,
        /// The created pet.
        pet: PetRecord,
    },
    /// [`Job::Create`] failed.
    CreationFailed {
        /// Tag copied from the job.
        tag: JobTag,
        /// Human-readable reason.
        reason: String,
    },
    /// [`Job::Bury`] finished.
    Buried {
        /// Tag copied from the job.
        tag: JobTag,
        /// Name of the dead pet.
        name: String,
        /// Experience at death.
        final_xp: u64,
        /// High score before this pet's result was considered, or `None`
        /// if it could not be read.
        prior_high_score: Option<i64>,
    },
}

impl Outcome {
    /// The tag of the job that produced this outcome.
    pub const fn tag(&self) -> JobTag {
        match self {
            Self::Loaded { tag, .. }
            | Self::PetFetched { tag, .. }
            | Self::NameRequired { tag }
            | Self::Created { tag, .. }
            | Self::CreationFailed { tag, .. }
            | Self::Buried { tag, .. } => *tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_advances() {
        let epoch = Epoch::default();
        assert_eq!(epoch.next(), Epoch(1));
        assert!(epoch.next() > epoch);
    }

    #[test]
    fn toggles_map_to_vitals() {
        assert_eq!(Command::ToggleFeeding.toggled_vital(), Some(Vital::Food));
        assert_eq!(Command::ToggleResting.toggled_vital(), Some(Vital::Stamina));
        assert_eq!(Command::ToggleDrinking.toggled_vital(), Some(Vital::Water));
        assert_eq!(Command::SaveProgress.toggled_vital(), None);
    }

    #[test]
    fn job_tag_is_carried() {
        let tag = JobTag {
            epoch: Epoch(7),
            pet_id: Some(PetId::new()),
        };
        let job = Job::Bury {
            tag,
            name: String::from("Mochi"),
            xp: 3,
        };
        assert_eq!(job.tag(), tag);
        assert_eq!(job.kind(), "bury");
    }
}
