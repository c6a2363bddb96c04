//! Backend selection for pet persistence.

use tamagotchi_core::config::{BackendKind, RemoteConfig};
use tamagotchi_types::{PetRecord, TokenSet};

use crate::error::RemoteError;
use crate::http::HttpPetStore;
use crate::memory::MemoryPetStore;

// ---------------------------------------------------------------------------
// Unified backend enum (dyn-compatible alternative to async trait)
// ---------------------------------------------------------------------------

/// A persistence backend holding each account's pet, high score, and
/// theme.
///
/// Uses enum dispatch instead of trait objects because async methods
/// are not dyn-compatible in Rust.
#[derive(Debug, Clone)]
pub enum PetStore {
    /// The REST persistence service.
    Http(HttpPetStore),
    /// A process-local store.
    Memory(MemoryPetStore),
}

impl PetStore {
    /// Build the backend selected in the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        match config.backend {
            BackendKind::Http => Ok(Self::Http(HttpPetStore::new(config)?)),
            BackendKind::Memory => Ok(Self::Memory(MemoryPetStore::new())),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::Memory(_) => "memory",
        }
    }

    /// Check that the service accepts the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unauthorized`] if they are rejected, or any
    /// transport error.
    pub async fn authenticate(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        match self {
            Self::Http(store) => store.authenticate(tokens).await,
            Self::Memory(store) => store.authenticate(tokens).await,
        }
    }

    /// Fetch the account's pet, `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn get_pet(&self, tokens: &TokenSet) -> Result<Option<PetRecord>, RemoteError> {
        match self {
            Self::Http(store) => store.get_pet(tokens).await,
            Self::Memory(store) => store.get_pet(tokens).await,
        }
    }

    /// Create a pet for the account, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the service refuses or the call fails.
    pub async fn create_pet(&self, tokens: &TokenSet, name: &str) -> Result<PetRecord, RemoteError> {
        match self {
            Self::Http(store) => store.create_pet(tokens, name).await,
            Self::Memory(store) => store.create_pet(tokens, name).await,
        }
    }

    /// Delete the account's pet.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn delete_pet(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        match self {
            Self::Http(store) => store.delete_pet(tokens).await,
            Self::Memory(store) => store.delete_pet(tokens).await,
        }
    }

    /// Save experience and health of the account's pet.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn put_pet_stats(
        &self,
        tokens: &TokenSet,
        xp: i64,
        health: f64,
    ) -> Result<(), RemoteError> {
        match self {
            Self::Http(store) => store.put_pet_stats(tokens, xp, health).await,
            Self::Memory(store) => store.put_pet_stats(tokens, xp, health).await,
        }
    }

    /// The account's high score.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn get_high_score(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        match self {
            Self::Http(store) => store.get_high_score(tokens).await,
            Self::Memory(store) => store.get_high_score(tokens).await,
        }
    }

    /// Overwrite the account's high score.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn update_high_score(&self, tokens: &TokenSet, score: i64) -> Result<(), RemoteError> {
        match self {
            Self::Http(store) => store.update_high_score(tokens, score).await,
            Self::Memory(store) => store.update_high_score(tokens, score).await,
        }
    }

    /// The account's stored theme wire value.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn get_theme(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        match self {
            Self::Http(store) => store.get_theme(tokens).await,
            Self::Memory(store) => store.get_theme(tokens).await,
        }
    }

    /// Store the account's theme wire value.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the call fails.
    pub async fn put_theme(&self, tokens: &TokenSet, theme: i32) -> Result<(), RemoteError> {
        match self {
            Self::Http(store) => store.put_theme(tokens, theme).await,
            Self::Memory(store) => store.put_theme(tokens, theme).await,
        }
    }
}
