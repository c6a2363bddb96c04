//! Pet lifecycle state machine.
//!
//! Phases move as follows:
//!
//! ```text
//! SignedOut --sign_in--> Loading --loaded--> Alive | NoPet
//! Alive --health hits 0--> Dead
//! (any signed-in phase) --restart--> Loading --> Alive | AwaitingName
//! AwaitingName --name--> Creating --created--> Alive
//! AwaitingName --cancel--> NoPet
//! Creating --failed--> NoPet
//! ```
//!
//! The death check fires exactly once per death: it moves the phase to
//! [`LifecyclePhase::Dead`] in the same call that detects it, and only an
//! `Alive` phase can die.

use tamagotchi_types::{LifecyclePhase, Pet};
use tracing::info;

/// Errors raised by invalid lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The action needs a signed-in account.
    #[error("cannot {action} while signed out")]
    SignedOut {
        /// What was attempted.
        action: &'static str,
    },

    /// The action is not valid in the current phase.
    #[error("cannot {action} in phase {phase:?}")]
    WrongPhase {
        /// What was attempted.
        action: &'static str,
        /// The phase at the time.
        phase: LifecyclePhase,
    },
}

/// A death detected by [`Lifecycle::check_death`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathEvent {
    /// Name of the pet that died.
    pub name: String,
    /// Experience at death.
    pub final_xp: u64,
}

/// Lifecycle controller for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    phase: LifecyclePhase,
}

impl Lifecycle {
    /// Start signed out, or loading when credentials are available.
    pub const fn new(signed_in: bool) -> Self {
        Self {
            phase: if signed_in {
                LifecyclePhase::Loading
            } else {
                LifecyclePhase::SignedOut
            },
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Whether an account is signed in.
    pub const fn is_signed_in(&self) -> bool {
        !matches!(self.phase, LifecyclePhase::SignedOut)
    }

    /// Whether a pet is alive and simulating.
    pub const fn is_alive(&self) -> bool {
        self.phase.is_simulating()
    }

    /// Credentials for an account arrived; its pet is being fetched.
    pub fn sign_in(&mut self) {
        self.set(LifecyclePhase::Loading);
    }

    /// A load finished.
    pub fn loaded(&mut self, has_pet: bool) {
        self.set(if has_pet {
            LifecyclePhase::Alive
        } else {
            LifecyclePhase::NoPet
        });
    }

    /// Begin a restart.
    ///
    /// Returns whether the previous pet was dead, which tells the caller
    /// to replace it instead of reloading it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::SignedOut`] when no account is signed in.
    pub fn restart(&mut self) -> Result<bool, LifecycleError> {
        if !self.is_signed_in() {
            return Err(LifecycleError::SignedOut { action: "restart" });
        }
        let was_dead = matches!(self.phase, LifecyclePhase::Dead);
        self.set(LifecyclePhase::Loading);
        Ok(was_dead)
    }

    /// The restart needs a name for a new pet.
    pub fn request_name(&mut self) {
        self.set(LifecyclePhase::AwaitingName);
    }

    /// A name was supplied; creation starts.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::WrongPhase`] unless a name was requested.
    pub fn begin_creation(&mut self) -> Result<(), LifecycleError> {
        self.expect(LifecyclePhase::AwaitingName, "name a pet")?;
        self.set(LifecyclePhase::Creating);
        Ok(())
    }

    /// The user abandoned creation.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::WrongPhase`] unless a name was requested.
    pub fn cancel_creation(&mut self) -> Result<(), LifecycleError> {
        self.expect(LifecyclePhase::AwaitingName, "cancel creation")?;
        self.set(LifecyclePhase::NoPet);
        Ok(())
    }

    /// Creation failed remotely.
    pub fn creation_failed(&mut self) {
        self.set(LifecyclePhase::NoPet);
    }

    /// A pet became the session's live pet.
    pub fn adopt(&mut self) {
        self.set(LifecyclePhase::Alive);
    }

    /// Detect death.
    ///
    /// Returns an event the first time an alive pet is seen with no
    /// health left, and moves the phase to `Dead` so later checks return
    /// `None` until a new pet is adopted.
    pub fn check_death(&mut self, pet: &Pet) -> Option<DeathEvent> {
        if !self.is_alive() || pet.health > 0.0 {
            return None;
        }
        self.set(LifecyclePhase::Dead);
        Some(DeathEvent {
            name: pet.name.clone(),
            final_xp: pet.xp,
        })
    }

    fn expect(&self, phase: LifecyclePhase, action: &'static str) -> Result<(), LifecycleError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(LifecycleError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn set(&mut self, phase: LifecyclePhase) {
        if self.phase != phase {
            info!(from = ?self.phase, to = ?phase, "Lifecycle transition");
            self.phase = phase;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn alive() -> Lifecycle {
        let mut lifecycle = Lifecycle::new(true);
        lifecycle.loaded(true);
        lifecycle
    }

    #[test]
    fn starts_signed_out_without_credentials() {
        assert_eq!(Lifecycle::new(false).phase(), LifecyclePhase::SignedOut);
        assert_eq!(Lifecycle::new(true).phase(), LifecyclePhase::Loading);
    }

    #[test]
    fn load_without_pet_is_no_pet() {
        let mut lifecycle = Lifecycle::new(true);
        lifecycle.loaded(false);
        assert_eq!(lifecycle.phase(), LifecyclePhase::NoPet);
    }

    #[test]
    fn death_fires_once() {
        let mut lifecycle = alive();
        let mut pet = Pet::hatch("Mochi");
        pet.xp = 9;
        assert!(lifecycle.check_death(&pet).is_none());

        pet.health = 0.0;
        let event = lifecycle.check_death(&pet).unwrap();
        assert_eq!(event.name, "Mochi");
        assert_eq!(event.final_xp, 9);
        assert_eq!(lifecycle.phase(), LifecyclePhase::Dead);

        assert!(lifecycle.check_death(&pet).is_none());
    }

    #[test]
    fn restart_after_death_replaces() {
        let mut lifecycle = alive();
        let mut pet = Pet::hatch("Mochi");
        pet.health = 0.0;
        lifecycle.check_death(&pet);
        assert!(lifecycle.restart().unwrap());
        assert_eq!(lifecycle.phase(), LifecyclePhase::Loading);
    }

    #[test]
    fn restart_while_alive_reloads() {
        let mut lifecycle = alive();
        assert!(!lifecycle.restart().unwrap());
    }

    #[test]
    fn restart_without_pet_is_allowed() {
        let mut lifecycle = Lifecycle::new(true);
        lifecycle.loaded(false);
        assert!(lifecycle.restart().is_ok());
    }

    #[test]
    fn restart_signed_out_is_rejected() {
        let mut lifecycle = Lifecycle::new(false);
        assert!(matches!(
            lifecycle.restart(),
            Err(LifecycleError::SignedOut { .. })
        ));
        assert_eq!(lifecycle.phase(), LifecyclePhase::SignedOut);
    }

    #[test]
    fn creation_flow() {
        let mut lifecycle = Lifecycle::new(true);
        lifecycle.loaded(false);
        lifecycle.restart().unwrap();
        lifecycle.request_name();
        lifecycle.begin_creation().unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Creating);
        lifecycle.adopt();
        assert!(lifecycle.is_alive());
    }

    #[test]
    fn naming_requires_a_request() {
        let mut lifecycle = alive();
        assert!(matches!(
            lifecycle.begin_creation(),
            Err(LifecycleError::WrongPhase { .. })
        ));
        assert!(lifecycle.cancel_creation().is_err());
    }

    #[test]
    fn cancel_returns_to_no_pet() {
        let mut lifecycle = Lifecycle::new(true);
        lifecycle.restart().unwrap();
        lifecycle.request_name();
        lifecycle.cancel_creation().unwrap();
        assert_eq!(lifecycle.phase(), LifecyclePhase::NoPet);
    }

    #[test]
    fn dead_pet_in_other_phase_is_ignored() {
        let mut lifecycle = Lifecycle::new(true);
        let mut pet = Pet::hatch("Mochi");
        pet.health = 0.0;
        assert!(lifecycle.check_death(&pet).is_none());
    }
}
