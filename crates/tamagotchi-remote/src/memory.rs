//! Process-local persistence backend.
//!
//! Keeps one account per id token in memory. Used for offline play and as
//! the backend of the worker tests. The store can be switched offline, or
//! made to fail individual calls, to exercise the degraded paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tamagotchi_types::{PetRecord, Theme, TokenSet};
use tokio::sync::Mutex;

use crate::error::RemoteError;

/// Everything the service keeps for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account's pet, if it has one.
    pub pet: Option<PetRecord>,
    /// Highest experience any of the account's pets reached.
    pub high_score: i64,
    /// Stored theme wire value.
    pub theme: i64,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            pet: None,
            high_score: 0,
            theme: i64::from(Theme::default().to_wire()),
        }
    }
}

/// One kind of service call, for failing calls selectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreCall {
    /// Credential check.
    Authenticate,
    /// Pet fetch.
    GetPet,
    /// Pet creation.
    CreatePet,
    /// Pet deletion.
    DeletePet,
    /// Experience and health write.
    PutPetStats,
    /// High score read.
    GetHighScore,
    /// High score write.
    UpdateHighScore,
    /// Theme read.
    GetTheme,
    /// Theme write.
    PutTheme,
}

/// In-memory persistence service. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPetStore {
    accounts: Arc<Mutex<BTreeMap<String, Account>>>,
    offline: Arc<AtomicBool>,
    failing: Arc<Mutex<BTreeSet<StoreCall>>>,
}

impl MemoryPetStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`RemoteError::Unavailable`] (or stop
    /// doing so).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    /// Make one kind of call fail with [`RemoteError::Unavailable`] (or
    /// stop doing so). Other calls are unaffected.
    pub async fn set_failing(&self, call: StoreCall, failing: bool) {
        let mut calls = self.failing.lock().await;
        if failing {
            calls.insert(call);
        } else {
            calls.remove(&call);
        }
    }

    /// Install an account for the given credentials.
    pub async fn insert_account(&self, tokens: &TokenSet, account: Account) {
        self.accounts
            .lock()
            .await
            .insert(tokens.id_token.clone(), account);
    }

    /// A copy of the account for the given credentials.
    pub async fn account(&self, tokens: &TokenSet) -> Option<Account> {
        self.accounts.lock().await.get(&tokens.id_token).cloned()
    }

    /// Run `f` against the caller's account, creating it on first use.
    async fn with_account<T>(
        &self,
        call: StoreCall,
        tokens: &TokenSet,
        f: impl FnOnce(&mut Account) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        if self.offline.load(Ordering::Acquire) || self.failing.lock().await.contains(&call) {
            return Err(RemoteError::Unavailable);
        }
        if tokens.id_token.is_empty() {
            return Err(RemoteError::Unauthorized {
                reason: String::from("empty id token"),
            });
        }
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(tokens.id_token.clone()).or_default();
        f(account)
    }

    pub(crate) async fn authenticate(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        self.with_account(StoreCall::Authenticate, tokens, |_| Ok(())).await
    }

    pub(crate) async fn get_pet(&self, tokens: &TokenSet) -> Result<Option<PetRecord>, RemoteError> {
        self.with_account(StoreCall::GetPet, tokens, |account| Ok(account.pet.clone()))
            .await
    }

    pub(crate) async fn create_pet(
        &self,
        tokens: &TokenSet,
        name: &str,
    ) -> Result<PetRecord, RemoteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RemoteError::Invalid {
                reason: String::from("pet name must not be empty"),
            });
        }
        self.with_account(StoreCall::CreatePet, tokens, |account| {
            let record = PetRecord::new(name);
            account.pet = Some(record.clone());
            Ok(record)
        })
        .await
    }

    pub(crate) async fn delete_pet(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        self.with_account(StoreCall::DeletePet, tokens, |account| {
            account.pet = None;
            Ok(())
        })
        .await
    }

    pub(crate) async fn put_pet_stats(
        &self,
        tokens: &TokenSet,
        xp: i64,
        health: f64,
    ) -> Result<(), RemoteError> {
        self.with_account(StoreCall::PutPetStats, tokens, |account| {
            let Some(pet) = account.pet.as_mut() else {
                return Err(RemoteError::Invalid {
                    reason: String::from("account has no pet"),
                });
            };
            pet.xp = xp;
            pet.health = health;
            Ok(())
        })
        .await
    }

    pub(crate) async fn get_high_score(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        self.with_account(StoreCall::GetHighScore, tokens, |account| Ok(account.high_score))
            .await
    }

    pub(crate) async fn update_high_score(
        &self,
        tokens: &TokenSet,
        score: i64,
    ) -> Result<(), RemoteError> {
        self.with_account(StoreCall::UpdateHighScore, tokens, |account| {
            account.high_score = score;
            Ok(())
        })
        .await
    }

    pub(crate) async fn get_theme(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        self.with_account(StoreCall::GetTheme, tokens, |account| Ok(account.theme)).await
    }

    pub(crate) async fn put_theme(&self, tokens: &TokenSet, theme: i32) -> Result<(), RemoteError> {
        self.with_account(StoreCall::PutTheme, tokens, |account| {
            account.theme = i64::from(theme);
            Ok(())
        })
        .await
    }
}
