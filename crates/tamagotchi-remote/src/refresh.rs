//! Periodic credential refresh.
//!
//! Runs independently of the simulation tick. Each refresh replaces the
//! whole token set in the [`CredentialCell`] and in the token file, unless
//! an account switch published other credentials while the refresh was in
//! flight. The switch wins in that case.

use std::sync::Arc;
use std::time::Duration;

use tamagotchi_types::TokenSet;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::auth::AuthProvider;
use crate::credentials::CredentialCell;
use crate::error::RemoteError;
use crate::token_store::TokenStore;

/// Shortest refresh period the task accepts.
const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Publish a token set and write it to the token file.
///
/// A failed write is logged; the in-memory credentials are updated
/// regardless.
pub async fn persist_tokens(
    credentials: &CredentialCell,
    token_store: Option<&TokenStore>,
    tokens: TokenSet,
) {
    if let Some(store) = token_store
        && let Err(e) = store.save(&tokens).await
    {
        warn!(
            path = %store.path().display(),
            error = %e,
            "Failed to write token file"
        );
    }
    credentials.publish(tokens);
}

/// Refresh the current credentials once.
///
/// Returns `false` without contacting the provider when nobody is signed
/// in, and `false` when the refreshed set was discarded because the
/// credentials changed meanwhile.
///
/// # Errors
///
/// Returns [`RemoteError`] if the provider refuses the refresh. The
/// current credentials are left untouched in that case.
pub async fn refresh_credentials(
    auth: &AuthProvider,
    credentials: &CredentialCell,
    token_store: Option<&TokenStore>,
) -> Result<bool, RemoteError> {
    let Some(current) = credentials.current() else {
        return Ok(false);
    };
    let fresh = auth.refresh_tokens(&current).await?;
    Ok(commit_refresh(credentials, token_store, &current, fresh).await)
}

/// Install a refreshed set if `refreshed_from` is still current, then
/// write it to the token file. A lost swap writes nothing.
async fn commit_refresh(
    credentials: &CredentialCell,
    token_store: Option<&TokenStore>,
    refreshed_from: &Arc<TokenSet>,
    fresh: TokenSet,
) -> bool {
    let file_copy = token_store.map(|_| fresh.clone());
    if !credentials.replace_if_current(refreshed_from, fresh) {
        debug!("Credentials changed during refresh, discarding refreshed set");
        return false;
    }
    if let Some(store) = token_store
        && let Some(tokens) = file_copy
        && let Err(e) = store.save(&tokens).await
    {
        warn!(
            path = %store.path().display(),
            error = %e,
            "Failed to write token file"
        );
    }
    true
}

/// Spawn the refresh task. The first refresh happens one period after
/// the call.
pub fn spawn_refresh(
    auth: AuthProvider,
    credentials: CredentialCell,
    token_store: Option<TokenStore>,
    period: Duration,
) -> JoinHandle<()> {
    let period = period.max(MIN_REFRESH_PERIOD);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        info!(
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Credential refresh task started"
        );
        loop {
            interval.tick().await;
            match refresh_credentials(&auth, &credentials, token_store.as_ref()).await {
                Ok(true) => debug!("Credentials refreshed"),
                Ok(false) => debug!("No credentials refreshed"),
                Err(e) => warn!(error = %e, "Credential refresh failed"),
            }
        }
    })
}
