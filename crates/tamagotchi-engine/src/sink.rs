//! Snapshot sink that reports the session through the log.

use tamagotchi_core::runner::SnapshotSink;
use tamagotchi_types::{LifecyclePhase, Notice, PetSnapshot, xp_to_wire};
use tracing::{debug, info, warn};

/// Logs a JSON status line per tick and every notice.
#[derive(Debug, Default)]
pub struct LogSink {
    last_phase: Option<LifecyclePhase>,
}

impl LogSink {
    /// Create a sink that has seen nothing yet.
    pub const fn new() -> Self {
        Self { last_phase: None }
    }
}

/// Whether a final experience total set a new high score. Unknown when
/// the prior score could not be read.
fn beats_high_score(final_xp: u64, prior: Option<i64>) -> bool {
    prior.is_some_and(|prior| xp_to_wire(final_xp) > prior)
}

impl SnapshotSink for LogSink {
    fn on_tick(&mut self, snapshot: &PetSnapshot) {
        if self.last_phase != Some(snapshot.phase) {
            info!(tick = snapshot.tick, phase = ?snapshot.phase, "Phase changed");
            self.last_phase = Some(snapshot.phase);
        }
        match serde_json::to_string(snapshot) {
            Ok(json) => debug!(tick = snapshot.tick, status = %json, "Pet status"),
            Err(e) => warn!(tick = snapshot.tick, error = %e, "Failed to serialize status"),
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::PetDied {
                name,
                final_xp,
                prior_high_score,
            } => {
                info!(
                    name = %name,
                    final_xp,
                    prior_high_score = ?prior_high_score,
                    new_high_score = beats_high_score(*final_xp, *prior_high_score),
                    "Your pet has died"
                );
            }
            Notice::PetLoaded { name } => info!(name = %name, "Welcome back"),
            Notice::NoPet => info!("This account has no pet, type `restart` to adopt one"),
            Notice::NameRequested => info!("Type `name <name>` to name your new pet"),
            Notice::PetCreated { name } => info!(name = %name, "Pet created"),
            Notice::CreationFailed { reason } => warn!(reason = %reason, "Pet creation failed"),
            Notice::SignInRequired => {
                warn!("No previous session tokens found, type `login <id_token> <refresh_token>`");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tamagotchi_types::Theme;

    use super::*;

    fn snapshot(phase: LifecyclePhase) -> PetSnapshot {
        PetSnapshot {
            tick: 1,
            phase,
            pet_name: None,
            health: 0.0,
            xp: 0,
            vitals: Vec::new(),
            theme: Theme::Red,
            simulation_speed: 1.0,
        }
    }

    #[test]
    fn remembers_last_phase() {
        let mut sink = LogSink::new();
        sink.on_tick(&snapshot(LifecyclePhase::Loading));
        assert_eq!(sink.last_phase, Some(LifecyclePhase::Loading));
        sink.on_tick(&snapshot(LifecyclePhase::NoPet));
        assert_eq!(sink.last_phase, Some(LifecyclePhase::NoPet));
    }

    #[test]
    fn high_score_needs_a_known_prior() {
        assert!(beats_high_score(9, Some(5)));
        assert!(!beats_high_score(5, Some(5)));
        assert!(!beats_high_score(9, None));
        assert!(beats_high_score(u64::MAX, Some(0)));
    }
}
