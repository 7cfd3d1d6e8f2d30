//! Credential persistence across page loads / process restarts.
//!
//! The store holds exactly one opaque bearer token. A `durable` store
//! writes it to `token.json` in the configured storage directory; an
//! `ephemeral` store keeps it in memory only. Either way an in-memory
//! copy is maintained, so a broken storage medium degrades the session
//! to memory-only instead of failing the flow.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Token file name in the storage directory
const TOKEN_FILE: &str = "token.json";

#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage medium could not be read or written. The in-memory
    /// copy is still current; callers log this and carry on.
    #[error("Credential storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// Persisted layout: a single opaque string plus a write timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

pub struct CredentialStore {
    /// `None` means ephemeral: memory only, nothing touches disk
    path: Option<PathBuf>,
    /// In-memory copy, authoritative when storage is degraded
    cached: Option<String>,
    degraded: bool,
}

impl CredentialStore {
    /// Store that survives process restarts, backed by a file in `dir`
    pub fn durable(dir: PathBuf) -> Self {
        Self {
            path: Some(dir.join(TOKEN_FILE)),
            cached: None,
            degraded: false,
        }
    }

    /// Store scoped to this context only; cleared when it ends
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            cached: None,
            degraded: false,
        }
    }

    /// Persist a token. The in-memory copy is updated even when the
    /// storage medium fails, so an `Err` here means degraded, not lost.
    pub fn save(&mut self, token: &str) -> Result<(), StoreError> {
        if token.is_empty() {
            // A token is absent or non-empty; never persist ""
            return Ok(());
        }
        self.cached = Some(token.to_string());

        let Some(ref path) = self.path else {
            return Ok(());
        };
        let result = Self::write_file(path, token);
        if result.is_err() {
            self.degraded = true;
        }
        result
    }

    fn write_file(path: &PathBuf, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents =
            serde_json::to_string_pretty(&stored).map_err(std::io::Error::other)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Retrieve the stored token, if any. A corrupt or unreadable file
    /// is treated as absent; the in-memory copy wins when storage is
    /// degraded.
    pub fn load(&mut self) -> Option<String> {
        if self.degraded {
            return self.cached.clone();
        }

        let Some(ref path) = self.path else {
            return self.cached.clone();
        };

        if !path.exists() {
            return self.cached.clone();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<StoredToken>(&contents) {
                Ok(stored) if !stored.token.is_empty() => {
                    self.cached = Some(stored.token.clone());
                    Some(stored.token)
                }
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "Stored token file is corrupt, treating as absent");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Could not read stored token, degrading to in-memory");
                self.degraded = true;
                self.cached.clone()
            }
        }
    }

    /// Remove the stored token. Idempotent.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.cached = None;
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                self.degraded = true;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Whether the storage medium has failed and the store is running
    /// on its in-memory copy only
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}
