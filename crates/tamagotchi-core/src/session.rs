//! The simulation session: all mutable state for one signed-in user.
//!
//! A [`Session`] owns the clock, the lifecycle, the pet, its vitals, and
//! the experience timer. It reacts to UI [`Command`]s and to worker
//! [`Outcome`]s by mutating itself and returning a [`Reaction`]: jobs for
//! the background worker and notices for the UI. It never performs I/O.
//!
//! Every job is tagged with the current [`Epoch`]. The epoch moves on
//! whenever the pet entity is replaced or the account changes, and
//! outcomes carrying an older epoch are dropped.

use tamagotchi_types::{
    Command, Epoch, Job, JobTag, LifecyclePhase, Notice, Outcome, Pet, PetRecord, PetSnapshot,
    Theme, TokenSet,
};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SessionClock};
use crate::config::{HealthConfig, PetConfig, VitalsConfig};
use crate::lifecycle::{Lifecycle, LifecycleError};
use crate::vitals::Vitals;

/// Side effects requested by the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    /// Work for the background worker, in dispatch order.
    pub jobs: Vec<Job>,
    /// Notices for the UI, in emission order.
    pub notices: Vec<Notice>,
}

impl Reaction {
    /// A reaction with nothing to do.
    pub const fn none() -> Self {
        Self {
            jobs: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// A reaction carrying a single notice.
    pub fn notice(notice: Notice) -> Self {
        Self {
            jobs: Vec::new(),
            notices: vec![notice],
        }
    }

    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.notices.is_empty()
    }
}

/// Session state passed to every tick.
#[derive(Debug)]
pub struct Session {
    pub(crate) clock: SessionClock,
    pub(crate) vitals_config: VitalsConfig,
    pub(crate) health_config: HealthConfig,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) pet: Option<Pet>,
    pub(crate) vitals: Vitals,
    pub(crate) xp_timer_ms: f64,
    pub(crate) theme: Theme,
    pub(crate) epoch: Epoch,
}

impl Session {
    /// Create a session.
    ///
    /// With `signed_in` the session starts loading; otherwise it starts
    /// signed out and idles until an account switch.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] for an unusable clock section.
    pub fn new(config: &PetConfig, signed_in: bool) -> Result<Self, ClockError> {
        Ok(Self {
            clock: SessionClock::new(&config.clock)?,
            vitals_config: config.vitals.clone(),
            health_config: config.health.clone(),
            lifecycle: Lifecycle::new(signed_in),
            pet: None,
            vitals: Vitals::full(),
            xp_timer_ms: 0.0,
            theme: Theme::default(),
            epoch: Epoch::default(),
        })
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// The session's pet, alive or dead.
    pub const fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    /// Per-vital state.
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Current epoch.
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Current theme.
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// The session clock.
    pub const fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Tag for jobs issued now.
    pub fn tag(&self) -> JobTag {
        JobTag {
            epoch: self.epoch,
            pet_id: self.pet.as_ref().map(|pet| pet.id),
        }
    }

    /// Work to start once the runner is up.
    pub fn startup(&self) -> Reaction {
        if self.lifecycle.is_signed_in() {
            Reaction {
                jobs: vec![Job::Load { tag: self.tag() }],
                notices: Vec::new(),
            }
        } else {
            Reaction::notice(Notice::SignInRequired)
        }
    }

    /// Work to finish before the process exits.
    pub fn shutdown(&self) -> Reaction {
        Reaction {
            jobs: self.save_stats_job().into_iter().collect(),
            notices: Vec::new(),
        }
    }

    /// Immutable view of the session.
    pub fn snapshot(&self) -> PetSnapshot {
        let alive = self.lifecycle.is_alive();
        PetSnapshot {
            tick: self.clock.tick(),
            phase: self.phase(),
            pet_name: self.pet.as_ref().map(|pet| pet.name.clone()),
            health: self.pet.as_ref().map_or(0.0, |pet| pet.health),
            xp: self.pet.as_ref().map_or(0, |pet| pet.xp),
            vitals: if alive { self.vitals.snapshot() } else { Vec::new() },
            theme: self.theme,
            simulation_speed: self.clock.speed(),
        }
    }

    /// Apply a UI command.
    pub fn handle_command(&mut self, command: Command) -> Reaction {
        if let Some(vital) = command.toggled_vital() {
            if self.lifecycle.is_alive() {
                let activity = self.vitals.toggle(vital);
                info!(%vital, active = activity.is_active(), "{} toggled", vital.action());
            } else {
                debug!(%vital, phase = ?self.phase(), "Ignoring toggle without a live pet");
            }
            return Reaction::none();
        }

        match command {
            Command::SetSimulationSpeed(speed) => {
                let applied = self.clock.set_speed(speed);
                info!(speed = applied, "Simulation speed changed");
                Reaction::none()
            }
            Command::RequestRestart => self.restart(),
            Command::NamePet(name) => self.name_pet(&name),
            Command::CancelCreation => match self.lifecycle.cancel_creation() {
                Ok(()) => Reaction::notice(Notice::CreationFailed {
                    reason: String::from("creation cancelled"),
                }),
                Err(err) => {
                    warn!(error = %err, "Ignoring cancel");
                    Reaction::none()
                }
            },
            Command::RequestAccountSwitch(tokens) => self.switch_account(tokens),
            Command::SetTheme(theme) => {
                self.theme = theme;
                info!(?theme, "Theme changed");
                if self.lifecycle.is_signed_in() {
                    Reaction {
                        jobs: vec![Job::SaveTheme {
                            tag: self.tag(),
                            theme,
                        }],
                        notices: Vec::new(),
                    }
                } else {
                    Reaction::none()
                }
            }
            Command::SaveProgress => Reaction {
                jobs: self.save_stats_job().into_iter().collect(),
                notices: Vec::new(),
            },
            Command::ToggleFeeding | Command::ToggleResting | Command::ToggleDrinking => {
                Reaction::none()
            }
        }
    }

    /// Apply a worker outcome. Outcomes whose tag does not match the
    /// current epoch and pet are dropped.
    pub fn handle_outcome(&mut self, outcome: Outcome) -> Reaction {
        let tag = outcome.tag();
        let current = self.tag();
        if tag != current {
            debug!(
                outcome_epoch = %tag.epoch,
                session_epoch = %current.epoch,
                outcome_pet = ?tag.pet_id,
                session_pet = ?current.pet_id,
                "Discarding stale outcome"
            );
            return Reaction::none();
        }

        match outcome {
            Outcome::Loaded { pet, theme, .. } => {
                self.theme = theme;
                match pet {
                    Some(record) => self.adopt_record(&record),
                    None => {
                        self.lifecycle.loaded(false);
                        Reaction::notice(Notice::NoPet)
                    }
                }
            }
            Outcome::PetFetched { pet, .. } => self.adopt_record(&pet),
            Outcome::NameRequired { .. } => {
                self.lifecycle.request_name();
                Reaction::notice(Notice::NameRequested)
            }
            Outcome::Created { pet, .. } => {
                let name = pet.pet_name;
                self.adopt(Pet::hatch(name.clone()), Vitals::full());
                info!(name = %name, "Pet created");
                Reaction::notice(Notice::PetCreated { name })
            }
            Outcome::CreationFailed { reason, .. } => {
                warn!(reason = %reason, "Pet creation failed");
                self.lifecycle.creation_failed();
                Reaction::notice(Notice::CreationFailed { reason })
            }
            Outcome::Buried {
                name,
                final_xp,
                prior_high_score,
                ..
            } => {
                info!(name = %name, final_xp, prior_high_score = ?prior_high_score, "Pet buried");
                Reaction::notice(Notice::PetDied {
                    name,
                    final_xp,
                    prior_high_score,
                })
            }
        }
    }

    fn restart(&mut self) -> Reaction {
        let save = self.save_stats_job();
        let replace = match self.lifecycle.restart() {
            Ok(replace) => replace,
            Err(err @ LifecycleError::SignedOut { .. }) => {
                warn!(error = %err, "Restart rejected, please sign in");
                return Reaction::notice(Notice::SignInRequired);
            }
            Err(err) => {
                warn!(error = %err, "Restart rejected");
                return Reaction::none();
            }
        };
        info!(replace, "Restart requested");
        self.clear_pet();
        let mut jobs: Vec<Job> = save.into_iter().collect();
        jobs.push(Job::Restart {
            tag: self.tag(),
            replace,
        });
        Reaction {
            jobs,
            notices: Vec::new(),
        }
    }

    fn name_pet(&mut self, name: &str) -> Reaction {
        let name = name.trim();
        if name.is_empty() {
            if self.phase() == LifecyclePhase::AwaitingName {
                return Reaction::notice(Notice::CreationFailed {
                    reason: String::from("pet name must not be empty"),
                });
            }
            warn!(phase = ?self.phase(), "Ignoring empty pet name");
            return Reaction::none();
        }
        if let Err(err) = self.lifecycle.begin_creation() {
            warn!(error = %err, "Ignoring pet name");
            return Reaction::none();
        }
        info!(name = %name, "Creating pet");
        Reaction {
            jobs: vec![Job::Create {
                tag: self.tag(),
                name: name.to_owned(),
            }],
            notices: Vec::new(),
        }
    }

    fn switch_account(&mut self, tokens: TokenSet) -> Reaction {
        let save = self.save_stats_job();
        info!("Switching account");
        self.clear_pet();
        self.lifecycle.sign_in();
        let mut jobs: Vec<Job> = save.into_iter().collect();
        jobs.push(Job::SwitchAccount {
            tag: self.tag(),
            tokens,
        });
        Reaction {
            jobs,
            notices: Vec::new(),
        }
    }

    fn adopt_record(&mut self, record: &PetRecord) -> Reaction {
        self.adopt(record.to_pet(), Vitals::from_record(record));
        info!(name = %record.pet_name, xp = record.xp, "Pet loaded");
        Reaction::notice(Notice::PetLoaded {
            name: record.pet_name.clone(),
        })
    }

    fn adopt(&mut self, pet: Pet, vitals: Vitals) {
        self.epoch = self.epoch.next();
        self.pet = Some(pet);
        self.vitals = vitals;
        self.xp_timer_ms = 0.0;
        self.lifecycle.adopt();
    }

    /// Drop the current pet and every counter tied to it.
    fn clear_pet(&mut self) {
        self.epoch = self.epoch.next();
        self.pet = None;
        self.vitals.reset_flags();
        self.xp_timer_ms = 0.0;
    }

    fn save_stats_job(&self) -> Option<Job> {
        if !self.lifecycle.is_alive() {
            return None;
        }
        self.pet.as_ref().map(|pet| Job::SaveStats {
            tag: self.tag(),
            xp: pet.xp,
            health: pet.health,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use tamagotchi_types::{Activity, Vital};

    use super::*;

    fn session() -> Session {
        Session::new(&PetConfig::default(), true).unwrap()
    }

    fn alive_session() -> Session {
        let mut session = session();
        let tag = session.tag();
        session.handle_outcome(Outcome::Loaded {
            tag,
            pet: Some(PetRecord::new("Mochi")),
            theme: Theme::Green,
        });
        session
    }

    #[test]
    fn startup_loads_when_signed_in() {
        let reaction = session().startup();
        assert!(matches!(reaction.jobs.as_slice(), [Job::Load { .. }]));
    }

    #[test]
    fn startup_signed_out_asks_for_sign_in() {
        let session = Session::new(&PetConfig::default(), false).unwrap();
        let reaction = session.startup();
        assert!(reaction.jobs.is_empty());
        assert_eq!(reaction.notices, vec![Notice::SignInRequired]);
    }

    #[test]
    fn load_adopts_pet_and_theme() {
        let session = alive_session();
        assert_eq!(session.phase(), LifecyclePhase::Alive);
        assert_eq!(session.theme(), Theme::Green);
        assert_eq!(session.pet().unwrap().name, "Mochi");
        assert_eq!(session.epoch(), Epoch(1));
    }

    #[test]
    fn load_without_pet_is_no_pet() {
        let mut session = session();
        let tag = session.tag();
        let reaction = session.handle_outcome(Outcome::Loaded {
            tag,
            pet: None,
            theme: Theme::Red,
        });
        assert_eq!(session.phase(), LifecyclePhase::NoPet);
        assert_eq!(reaction.notices, vec![Notice::NoPet]);
    }

    #[test]
    fn toggles_ignored_without_pet() {
        let mut session = session();
        session.handle_command(Command::ToggleFeeding);
        assert_eq!(session.vitals().food.activity, Activity::Idle);
    }

    #[test]
    fn toggles_flip_activity() {
        let mut session = alive_session();
        session.handle_command(Command::ToggleResting);
        assert_eq!(session.vitals().get(Vital::Stamina).activity, Activity::Replenishing);
        session.handle_command(Command::ToggleResting);
        assert_eq!(session.vitals().get(Vital::Stamina).activity, Activity::Idle);
    }

    #[test]
    fn restart_while_alive_saves_then_reloads() {
        let mut session = alive_session();
        session.handle_command(Command::ToggleDrinking);
        let reaction = session.handle_command(Command::RequestRestart);
        assert!(matches!(
            reaction.jobs.as_slice(),
            [Job::SaveStats { .. }, Job::Restart { replace: false, .. }]
        ));
        assert_eq!(session.phase(), LifecyclePhase::Loading);
        assert!(!session.vitals().water.activity.is_active());
        assert!(session.pet().is_none());
    }

    #[test]
    fn restart_signed_out_is_rejected() {
        let mut session = Session::new(&PetConfig::default(), false).unwrap();
        let reaction = session.handle_command(Command::RequestRestart);
        assert!(reaction.jobs.is_empty());
        assert_eq!(reaction.notices, vec![Notice::SignInRequired]);
        assert_eq!(session.phase(), LifecyclePhase::SignedOut);
    }

    #[test]
    fn restart_without_pet_routes_to_creation() {
        let mut session = session();
        let tag = session.tag();
        session.handle_outcome(Outcome::Loaded {
            tag,
            pet: None,
            theme: Theme::Red,
        });

        let reaction = session.handle_command(Command::RequestRestart);
        let Some(Job::Restart { tag, .. }) = reaction.jobs.last().cloned() else {
            panic!("expected a restart job, got {reaction:?}");
        };
        let reaction = session.handle_outcome(Outcome::NameRequired { tag });
        assert_eq!(reaction.notices, vec![Notice::NameRequested]);
        assert_eq!(session.phase(), LifecyclePhase::AwaitingName);

        let reaction = session.handle_command(Command::NamePet(String::from("  Pip  ")));
        let Some(Job::Create { tag, name }) = reaction.jobs.first().cloned() else {
            panic!("expected a create job, got {reaction:?}");
        };
        assert_eq!(name, "Pip");
        assert_eq!(session.phase(), LifecyclePhase::Creating);

        let reaction = session.handle_outcome(Outcome::Created {
            tag,
            pet: PetRecord::new("Pip"),
        });
        assert_eq!(reaction.notices, vec![Notice::PetCreated { name: String::from("Pip") }]);
        assert_eq!(session.phase(), LifecyclePhase::Alive);
        let pet = session.pet().unwrap();
        assert_eq!(pet.xp, 0);
        assert!((pet.health - 100.0).abs() < f64::EPSILON);
        assert_eq!(session.vitals(), &Vitals::full());
    }

    #[test]
    fn empty_name_keeps_waiting() {
        let mut session = session();
        session.lifecycle.restart().unwrap();
        session.lifecycle.request_name();
        let reaction = session.handle_command(Command::NamePet(String::from("   ")));
        assert!(reaction.jobs.is_empty());
        assert!(matches!(reaction.notices.as_slice(), [Notice::CreationFailed { .. }]));
        assert_eq!(session.phase(), LifecyclePhase::AwaitingName);
    }

    #[test]
    fn cancel_creation_returns_to_no_pet() {
        let mut session = session();
        session.lifecycle.restart().unwrap();
        session.lifecycle.request_name();
        session.handle_command(Command::CancelCreation);
        assert_eq!(session.phase(), LifecyclePhase::NoPet);
    }

    #[test]
    fn creation_failure_returns_to_no_pet() {
        let mut session = session();
        session.lifecycle.restart().unwrap();
        session.lifecycle.request_name();
        session.handle_command(Command::NamePet(String::from("Pip")));
        let tag = session.tag();
        let reaction = session.handle_outcome(Outcome::CreationFailed {
            tag,
            reason: String::from("service unavailable"),
        });
        assert_eq!(session.phase(), LifecyclePhase::NoPet);
        assert_eq!(reaction.notices.len(), 1);
    }

    #[test]
    fn stale_outcomes_are_discarded() {
        let mut session = alive_session();
        let stale = session.tag();
        session.handle_command(Command::RequestRestart);
        let reaction = session.handle_outcome(Outcome::Buried {
            tag: stale,
            name: String::from("Mochi"),
            final_xp: 4,
            prior_high_score: Some(2),
        });
        assert!(reaction.is_empty());
    }

    #[test]
    fn outcome_for_another_pet_is_discarded() {
        let mut session = alive_session();
        let foreign = JobTag {
            pet_id: Some(tamagotchi_types::PetId::new()),
            ..session.tag()
        };
        let reaction = session.handle_outcome(Outcome::Buried {
            tag: foreign,
            name: String::from("Ghost"),
            final_xp: 4,
            prior_high_score: Some(2),
        });
        assert!(reaction.is_empty());

        let tag = session.tag();
        let reaction = session.handle_outcome(Outcome::Buried {
            tag,
            name: String::from("Mochi"),
            final_xp: 4,
            prior_high_score: None,
        });
        assert_eq!(
            reaction.notices,
            vec![Notice::PetDied {
                name: String::from("Mochi"),
                final_xp: 4,
                prior_high_score: None,
            }]
        );
    }

    #[test]
    fn account_switch_saves_and_reloads() {
        let mut session = alive_session();
        let before = session.epoch();
        let reaction =
            session.handle_command(Command::RequestAccountSwitch(TokenSet::new("id", "refresh")));
        assert!(matches!(
            reaction.jobs.as_slice(),
            [Job::SaveStats { .. }, Job::SwitchAccount { .. }]
        ));
        assert!(session.epoch() > before);
        assert_eq!(session.phase(), LifecyclePhase::Loading);
    }

    #[test]
    fn account_switch_signs_in() {
        let mut session = Session::new(&PetConfig::default(), false).unwrap();
        let reaction =
            session.handle_command(Command::RequestAccountSwitch(TokenSet::new("id", "refresh")));
        assert!(matches!(reaction.jobs.as_slice(), [Job::SwitchAccount { .. }]));
        assert_eq!(session.phase(), LifecyclePhase::Loading);
    }

    #[test]
    fn theme_is_saved_when_signed_in() {
        let mut session = alive_session();
        let reaction = session.handle_command(Command::SetTheme(Theme::Blue));
        assert_eq!(session.theme(), Theme::Blue);
        assert!(matches!(
            reaction.jobs.as_slice(),
            [Job::SaveTheme { theme: Theme::Blue, .. }]
        ));

        let mut signed_out = Session::new(&PetConfig::default(), false).unwrap();
        let reaction = signed_out.handle_command(Command::SetTheme(Theme::Black));
        assert!(reaction.jobs.is_empty());
        assert_eq!(signed_out.theme(), Theme::Black);
    }

    #[test]
    fn save_progress_only_for_live_pet() {
        let mut session = alive_session();
        let reaction = session.handle_command(Command::SaveProgress);
        assert!(matches!(reaction.jobs.as_slice(), [Job::SaveStats { .. }]));
        assert!(session.shutdown().jobs.len() == 1);

        let mut idle = Session::new(&PetConfig::default(), true).unwrap();
        assert!(idle.handle_command(Command::SaveProgress).is_empty());
        assert!(idle.shutdown().is_empty());
    }

    #[test]
    fn speed_change_is_sanitized() {
        let mut session = session();
        session.handle_command(Command::SetSimulationSpeed(-3.0));
        assert!((session.clock().speed() - 1.0).abs() < f64::EPSILON);
        session.handle_command(Command::SetSimulationSpeed(2.0));
        assert!((session.clock().speed() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_without_pet_has_no_vitals() {
        let snapshot = session().snapshot();
        assert!(snapshot.pet_name.is_none());
        assert!(snapshot.vitals.is_empty());
        assert!(!snapshot.is_alive());
    }

    #[test]
    fn snapshot_of_live_pet() {
        let snapshot = alive_session().snapshot();
        assert_eq!(snapshot.pet_name.as_deref(), Some("Mochi"));
        assert_eq!(snapshot.vitals.len(), 3);
        assert_eq!(snapshot.theme, Theme::Green);
    }
}
