//! On-disk token storage.
//!
//! The token set is kept as a single JSON object. Saving writes a sibling
//! temporary file and renames it over the old one, so the file always
//! holds one complete token set.

use std::path::{Path, PathBuf};

use tamagotchi_types::TokenSet;
use tracing::debug;

use crate::error::TokenStoreError;

/// JSON file holding the current token set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// A store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token set.
    ///
    /// A missing or empty file means no tokens.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] if the file cannot be read or does not
    /// hold a token set.
    pub async fn load(&self) -> Result<Option<TokenSet>, TokenStoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token file");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Replace the stored token set.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError`] if the file cannot be written.
    pub async fn save(&self, tokens: &TokenSet) -> Result<(), TokenStoreError> {
        let json = serde_json::to_vec_pretty(tokens)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Tokens saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
