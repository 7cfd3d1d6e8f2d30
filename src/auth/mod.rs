//! Authentication module for managing the session and the persisted
//! credential.
//!
//! This module provides:
//! - `CredentialStore`: durable or ephemeral persistence of one opaque token
//! - `Session` / `SessionState`: the per-context authentication record,
//!   its transitions, and the stale-outcome sequence guard

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, StoreError};
pub use session::{Session, SessionState};
