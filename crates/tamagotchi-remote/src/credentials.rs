//! The shared credential cell.
//!
//! Credentials live in a [`tokio::sync::watch`] channel holding
//! `Option<Arc<TokenSet>>`. Publishing swaps in a whole new `Arc`, and a
//! reader takes one `Arc` per request, so every request uses an id token
//! and refresh token from the same issue.

use std::sync::Arc;

use tamagotchi_types::TokenSet;
use tokio::sync::watch;

/// Current credentials, shared between the worker and the refresh task.
#[derive(Debug, Clone)]
pub struct CredentialCell {
    sender: Arc<watch::Sender<Option<Arc<TokenSet>>>>,
}

impl CredentialCell {
    /// Create a cell holding the given credentials, if any.
    pub fn new(initial: Option<TokenSet>) -> Self {
        let (sender, _) = watch::channel(initial.map(Arc::new));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the credentials as a whole.
    pub fn publish(&self, tokens: TokenSet) {
        self.sender.send_replace(Some(Arc::new(tokens)));
    }

    /// Replace the credentials only if the cell still holds `expected`.
    ///
    /// Returns `false` and leaves the cell alone when another publish
    /// happened since `expected` was read.
    pub fn replace_if_current(&self, expected: &Arc<TokenSet>, tokens: TokenSet) -> bool {
        self.sender.send_if_modified(|held| {
            if held.as_ref().is_some_and(|set| Arc::ptr_eq(set, expected)) {
                *held = Some(Arc::new(tokens));
                true
            } else {
                false
            }
        })
    }

    /// The credentials at this moment.
    pub fn current(&self) -> Option<Arc<TokenSet>> {
        self.sender.borrow().clone()
    }

    /// Whether credentials are present.
    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }
}
