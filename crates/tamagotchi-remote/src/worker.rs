//! Background persistence worker.
//!
//! Receives [`Job`]s from the session, performs the remote calls one at a
//! time in arrival order, and sends back an [`Outcome`] where the session
//! needs one. Remote failures never reach the session as errors: each job
//! degrades to the closest sensible outcome (no pet, default theme, no
//! prior high score) and the failure is logged.

use std::sync::Arc;

use tamagotchi_types::{Job, JobTag, Outcome, PetRecord, Theme, TokenSet, xp_to_wire};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::AuthProvider;
use crate::credentials::CredentialCell;
use crate::error::RemoteError;
use crate::refresh::{persist_tokens, refresh_credentials};
use crate::store::PetStore;
use crate::token_store::TokenStore;

/// Performs persistence jobs on behalf of the session.
#[derive(Debug, Clone)]
pub struct PetWorker {
    store: PetStore,
    auth: AuthProvider,
    credentials: CredentialCell,
    token_store: Option<TokenStore>,
}

impl PetWorker {
    /// Create a worker that does not write tokens to disk.
    pub const fn new(store: PetStore, auth: AuthProvider, credentials: CredentialCell) -> Self {
        Self {
            store,
            auth,
            credentials,
            token_store: None,
        }
    }

    /// Write refreshed and switched credentials to the given token file.
    #[must_use]
    pub fn with_token_store(mut self, token_store: TokenStore) -> Self {
        self.token_store = Some(token_store);
        self
    }

    /// Process jobs until the job channel closes.
    ///
    /// Jobs queued before the session exits are still performed, so the
    /// final save goes through even after the session stopped listening
    /// for outcomes.
    pub async fn run(&self, mut jobs: UnboundedReceiver<Job>, outcomes: UnboundedSender<Outcome>) {
        info!(backend = self.store.name(), "Persistence worker started");
        while let Some(job) = jobs.recv().await {
            let kind = job.kind();
            let epoch = job.tag().epoch;
            debug!(job = kind, epoch = %epoch, "Processing job");
            if let Some(outcome) = self.process(job).await
                && outcomes.send(outcome).is_err()
            {
                debug!(job = kind, "Session gone, dropping outcome");
            }
        }
        info!("Job channel closed, persistence worker stopping");
    }

    /// Perform one job and produce its outcome, if it has one.
    pub async fn process(&self, job: Job) -> Option<Outcome> {
        match job {
            Job::Load { tag } => Some(self.load(tag).await),
            Job::SwitchAccount { tag, tokens } => Some(self.switch_account(tag, tokens).await),
            Job::Restart { tag, replace } => Some(self.restart(tag, replace).await),
            Job::Create { tag, name } => Some(self.create(tag, &name).await),
            Job::Bury { tag, name, xp } => Some(self.bury(tag, name, xp).await),
            Job::SaveStats { xp, health, .. } => {
                self.save_stats(xp, health).await;
                None
            }
            Job::SaveTheme { theme, .. } => {
                self.save_theme(theme).await;
                None
            }
        }
    }

    fn tokens(&self) -> Result<Arc<TokenSet>, RemoteError> {
        self.credentials.current().ok_or(RemoteError::NotSignedIn)
    }

    async fn load(&self, tag: JobTag) -> Outcome {
        if let Err(e) =
            refresh_credentials(&self.auth, &self.credentials, self.token_store.as_ref()).await
        {
            warn!(error = %e, "Startup token refresh failed, using stored tokens");
        }
        self.authenticate_and_fetch(tag).await
    }

    async fn switch_account(&self, tag: JobTag, tokens: TokenSet) -> Outcome {
        persist_tokens(&self.credentials, self.token_store.as_ref(), tokens).await;
        info!("Account credentials replaced");
        self.authenticate_and_fetch(tag).await
    }

    async fn authenticate_and_fetch(&self, tag: JobTag) -> Outcome {
        let tokens = match self.tokens() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Cannot load pet");
                return Outcome::Loaded {
                    tag,
                    pet: None,
                    theme: Theme::default(),
                };
            }
        };
        if let Err(e) = self.store.authenticate(&tokens).await {
            warn!(error = %e, "Authentication failed");
        }
        let pet = match self.store.get_pet(&tokens).await {
            Ok(pet) => pet,
            Err(e) => {
                warn!(error = %e, "Failed to fetch pet, continuing without one");
                None
            }
        };
        let theme = match self.store.get_theme(&tokens).await {
            Ok(value) => Theme::from_wire(value),
            Err(e) => {
                warn!(error = %e, "Failed to fetch theme, using default");
                Theme::default()
            }
        };
        Outcome::Loaded { tag, pet, theme }
    }

    async fn restart(&self, tag: JobTag, replace: bool) -> Outcome {
        if replace {
            return Outcome::NameRequired { tag };
        }
        match self.fetch_living_pet().await {
            Ok(Some(pet)) => Outcome::PetFetched { tag, pet },
            Ok(None) => Outcome::NameRequired { tag },
            Err(e) => {
                warn!(error = %e, "Failed to fetch pet on restart");
                Outcome::NameRequired { tag }
            }
        }
    }

    async fn fetch_living_pet(&self) -> Result<Option<PetRecord>, RemoteError> {
        let tokens = self.tokens()?;
        let pet = self.store.get_pet(&tokens).await?;
        Ok(pet.filter(|record| record.health > 0.0))
    }

    async fn create(&self, tag: JobTag, name: &str) -> Outcome {
        let result = match self.tokens() {
            Ok(tokens) => self.store.create_pet(&tokens, name).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(pet) => {
                info!(name = %pet.pet_name, "Pet stored");
                Outcome::Created { tag, pet }
            }
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to create pet");
                Outcome::CreationFailed {
                    tag,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn bury(&self, tag: JobTag, name: String, xp: u64) -> Outcome {
        let prior_high_score = match self.tokens() {
            Ok(tokens) => self.record_death(&tokens, xp).await,
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to record death");
                None
            }
        };
        Outcome::Buried {
            tag,
            name,
            final_xp: xp,
            prior_high_score,
        }
    }

    /// Delete the dead pet and raise the high score if it was beaten.
    ///
    /// Returns the high score from before. When it cannot be read the
    /// result is `None` and the stored score is left alone, so an outage
    /// never lowers it.
    async fn record_death(&self, tokens: &TokenSet, xp: u64) -> Option<i64> {
        let prior = match self.store.get_high_score(tokens).await {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(error = %e, "Failed to fetch high score, leaving it unchanged");
                None
            }
        };
        if let Err(e) = self.store.delete_pet(tokens).await {
            warn!(error = %e, "Failed to delete dead pet");
        }
        let xp = xp_to_wire(xp);
        if let Some(prior) = prior
            && xp > prior
        {
            match self.store.update_high_score(tokens, xp).await {
                Ok(()) => info!(high_score = xp, prior, "New high score"),
                Err(e) => warn!(error = %e, "Failed to update high score"),
            }
        }
        prior
    }

    async fn save_stats(&self, xp: u64, health: f64) {
        let xp = xp_to_wire(xp);
        let result = match self.tokens() {
            Ok(tokens) => self.store.put_pet_stats(&tokens, xp, health).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => debug!(xp, health, "Progress saved"),
            Err(e) => warn!(error = %e, "Failed to save progress"),
        }
    }

    async fn save_theme(&self, theme: Theme) {
        let result = match self.tokens() {
            Ok(tokens) => self.store.put_theme(&tokens, theme.to_wire()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(theme = ?theme, error = %e, "Failed to save theme");
        }
    }
}

/// Run the worker on its own task.
pub fn spawn_worker(
    worker: PetWorker,
    jobs: UnboundedReceiver<Job>,
    outcomes: UnboundedSender<Outcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move { worker.run(jobs, outcomes).await })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tamagotchi_types::Epoch;

    use super::*;
    use crate::memory::MemoryPetStore;

    fn tag() -> JobTag {
        JobTag {
            epoch: Epoch(1),
            pet_id: None,
        }
    }

    fn signed_out_worker() -> PetWorker {
        PetWorker::new(
            PetStore::Memory(MemoryPetStore::new()),
            AuthProvider::Static,
            CredentialCell::new(None),
        )
    }

    #[tokio::test]
    async fn signed_out_load_degrades() {
        let outcome = signed_out_worker().process(Job::Load { tag: tag() }).await;
        assert_eq!(
            outcome,
            Some(Outcome::Loaded {
                tag: tag(),
                pet: None,
                theme: Theme::default(),
            })
        );
    }

    #[tokio::test]
    async fn signed_out_create_fails() {
        let outcome = signed_out_worker()
            .process(Job::Create {
                tag: tag(),
                name: String::from("Mochi"),
            })
            .await;
        assert!(matches!(outcome, Some(Outcome::CreationFailed { .. })));
    }

    #[tokio::test]
    async fn replace_restart_asks_for_name() {
        let outcome = signed_out_worker()
            .process(Job::Restart {
                tag: tag(),
                replace: true,
            })
            .await;
        assert_eq!(outcome, Some(Outcome::NameRequired { tag: tag() }));
    }

    #[tokio::test]
    async fn signed_out_bury_reports_no_high_score() {
        let outcome = signed_out_worker()
            .process(Job::Bury {
                tag: tag(),
                name: String::from("Mochi"),
                xp: 3,
            })
            .await;
        assert_eq!(
            outcome,
            Some(Outcome::Buried {
                tag: tag(),
                name: String::from("Mochi"),
                final_xp: 3,
                prior_high_score: None,
            })
        );
    }

    #[tokio::test]
    async fn saves_produce_no_outcome() {
        let worker = signed_out_worker();
        let save = worker
            .process(Job::SaveStats {
                tag: tag(),
                xp: 3,
                health: 50.0,
            })
            .await;
        assert!(save.is_none());
        let theme = worker
            .process(Job::SaveTheme {
                tag: tag(),
                theme: Theme::Blue,
            })
            .await;
        assert!(theme.is_none());
    }
}
