//! Session state: the per-context record of whether a token is
//! currently believed valid.
//!
//! `SessionState` is the single owner of the `Session`; the credential
//! store is a durability side-channel. A token found in the store at
//! context start is never trusted on presence alone - it is re-verified
//! in the background and only then marked validated.
//!
//! Verification outcomes are tagged with a monotonically increasing
//! sequence number so a stale `Invalid` from a superseded check can
//! never clobber a freshly confirmed login.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::{Outcome, VerifyClient};
use crate::auth::CredentialStore;

/// The client-local authentication record.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Candidate or confirmed token; absent or non-empty, never ""
    pub token: Option<String>,
    /// True only after the authority confirmed the token
    pub validated: bool,
    /// When the authority last confirmed the token
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Opaque identity marker returned by the authority, never parsed
    pub identity: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.validated
    }
}

type Listener = Box<dyn Fn(&Session) + Send>;

/// Owner of the per-context `Session`.
pub struct SessionState {
    session: Session,
    store: CredentialStore,
    listeners: Vec<Listener>,
    /// Sequence number of the newest verification issued
    verify_seq: u64,
}

impl SessionState {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            session: Session::default(),
            store,
            listeners: Vec::new(),
            verify_seq: 0,
        }
    }

    pub fn current(&self) -> &Session {
        &self.session
    }

    /// Register a listener, notified synchronously on every transition
    pub fn subscribe(&mut self, listener: impl Fn(&Session) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.session);
        }
    }

    /// The only path from absent/invalid to authenticated. Always follows
    /// a successful verification in the login flow. Supersedes any
    /// in-flight background verification.
    pub fn set_authenticated(&mut self, token: String, identity: Option<String>) {
        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "Credential storage unavailable, session is in-memory only");
        }
        self.session = Session {
            token: Some(token),
            validated: true,
            last_checked_at: Some(Utc::now()),
            identity,
        };
        self.verify_seq += 1;
        info!("Session authenticated");
        self.notify();
    }

    /// Reset to the empty session and clear the store. Idempotent;
    /// listeners fire only when something actually changed.
    pub fn clear(&mut self) {
        let was_empty = self.session.token.is_none() && !self.session.validated;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not clear credential storage");
        }
        if was_empty {
            return;
        }
        self.session = Session::default();
        // Supersede any in-flight verification of the departing token
        self.verify_seq += 1;
        info!("Session cleared");
        self.notify();
    }

    /// Clear-on-rejection entry point for authenticated calls that later
    /// come back 401.
    pub fn handle_unauthorized(&mut self) {
        info!("Authenticated call rejected by the authority, clearing session");
        self.clear();
    }

    /// Context-start rule: read the store. A stored token becomes the
    /// session's candidate with `validated = false`; the caller must run
    /// the returned verification (token, seq) before the guard will
    /// allow anything.
    pub fn restore(&mut self) -> Option<(String, u64)> {
        let token = self.store.load()?;
        debug!("Found stored token, scheduling background re-validation");
        self.session.token = Some(token.clone());
        self.session.validated = false;
        let seq = self.begin_verify();
        // The candidate token is a transition too: listeners showing
        // "checking stored session" need to hear about it
        self.notify();
        Some((token, seq))
    }

    /// Issue a sequence number for a verification about to start
    pub fn begin_verify(&mut self) -> u64 {
        self.verify_seq += 1;
        self.verify_seq
    }

    /// Apply a verification outcome. Returns false when the outcome was
    /// superseded by a newer verification (or a fresh login) and was
    /// discarded.
    pub fn apply_outcome(&mut self, seq: u64, outcome: &Outcome) -> bool {
        if seq < self.verify_seq {
            debug!(seq, newest = self.verify_seq, "Discarding superseded verification outcome");
            return false;
        }

        match outcome {
            Outcome::Valid(identity) => {
                self.session.validated = true;
                self.session.last_checked_at = Some(Utc::now());
                if identity.is_some() {
                    self.session.identity = identity.clone();
                }
                info!("Stored token re-validated");
                self.notify();
            }
            Outcome::Invalid(_) => {
                info!("Stored token rejected by the authority");
                self.clear();
            }
            Outcome::NetworkError(e) => {
                // Validity unknown: keep prior state, never log out on a
                // transient failure
                warn!(error = %e, "Background re-validation inconclusive, keeping session");
            }
        }
        true
    }

    /// Context-start convenience: restore the stored token and settle
    /// its background re-validation.
    pub async fn initialize(&mut self, client: &VerifyClient) {
        if let Some((token, seq)) = self.restore() {
            let outcome = client.verify(&token).await;
            self.apply_outcome(seq, &outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::Config;

    fn state() -> SessionState {
        SessionState::new(CredentialStore::ephemeral())
    }

    #[test]
    fn test_starts_empty() {
        let state = state();
        assert!(state.current().token.is_none());
        assert!(!state.current().is_authenticated());
        assert!(state.current().last_checked_at.is_none());
    }

    #[test]
    fn test_set_authenticated_persists_and_validates() {
        let mut state = state();
        state.set_authenticated("abc".to_string(), Some("uuid-1".to_string()));

        assert_eq!(state.current().token.as_deref(), Some("abc"));
        assert!(state.current().is_authenticated());
        assert!(state.current().last_checked_at.is_some());
        assert_eq!(state.current().identity.as_deref(), Some("uuid-1"));
        assert_eq!(state.store.load(), Some("abc".to_string()));
    }

    #[test]
    fn test_clear_twice_is_idempotent() {
        let mut state = state();
        state.set_authenticated("abc".to_string(), None);

        state.clear();
        state.clear();

        assert!(state.current().token.is_none());
        assert!(!state.current().is_authenticated());
        assert_eq!(state.store.load(), None);
    }

    #[test]
    fn test_listeners_notified_on_transitions() {
        let mut state = state();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        state.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        state.set_authenticated("abc".to_string(), None);
        state.clear();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        // Clearing an already-empty session is not a transition
        state.clear();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_restore_does_not_trust_stored_presence() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let pending = state.restore();
        assert!(pending.is_some());
        assert_eq!(state.current().token.as_deref(), Some("stored-token"));
        // Presence alone is never authenticated
        assert!(!state.current().is_authenticated());
    }

    #[test]
    fn test_restore_notifies_listeners_of_candidate() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let snapshots = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = snapshots.clone();
        state.subscribe(move |session: &Session| {
            seen.lock().unwrap().push(session.clone());
        });

        state.restore();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].token.as_deref(), Some("stored-token"));
        assert!(!snapshots[0].validated);
    }

    #[test]
    fn test_restore_empty_store_is_noop() {
        let mut state = state();
        assert!(state.restore().is_none());
        assert!(state.current().token.is_none());
    }

    #[test]
    fn test_apply_valid_outcome_validates() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let (_, seq) = state.restore().expect("Expected a pending verification");
        assert!(state.apply_outcome(seq, &Outcome::Valid(Some("uuid-9".to_string()))));
        assert!(state.current().is_authenticated());
        assert_eq!(state.current().identity.as_deref(), Some("uuid-9"));
    }

    #[test]
    fn test_apply_invalid_outcome_clears() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let (_, seq) = state.restore().expect("Expected a pending verification");
        assert!(state.apply_outcome(seq, &Outcome::Invalid(None)));
        assert!(state.current().token.is_none());
        assert!(!state.current().is_authenticated());
        assert_eq!(state.store.load(), None);
    }

    #[test]
    fn test_network_error_keeps_prior_state() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let (_, seq) = state.restore().expect("Expected a pending verification");
        assert!(state.apply_outcome(seq, &Outcome::NetworkError("timed out".to_string())));
        // Ambiguous outcome: candidate token kept for retry, not validated
        assert_eq!(state.current().token.as_deref(), Some("stored-token"));
        assert!(!state.current().is_authenticated());
        assert_eq!(state.store.load(), Some("stored-token".to_string()));
    }

    #[test]
    fn test_stale_invalid_cannot_clobber_fresh_login() {
        let mut store = CredentialStore::ephemeral();
        store.save("old-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        // Background re-validation starts...
        let (_, stale_seq) = state.restore().expect("Expected a pending verification");

        // ...and the user logs in again before it completes
        state.set_authenticated("fresh-token".to_string(), None);

        // The late Invalid for the old check must be discarded
        assert!(!state.apply_outcome(stale_seq, &Outcome::Invalid(None)));
        assert!(state.current().is_authenticated());
        assert_eq!(state.current().token.as_deref(), Some("fresh-token"));
    }

    #[test]
    fn test_late_valid_cannot_resurrect_cleared_session() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let (_, seq) = state.restore().expect("Expected a pending verification");
        state.clear();

        assert!(!state.apply_outcome(seq, &Outcome::Valid(None)));
        assert!(!state.current().is_authenticated());
        assert!(state.current().token.is_none());
    }

    #[test]
    fn test_handle_unauthorized_clears_session() {
        let mut state = state();
        state.set_authenticated("abc".to_string(), None);

        state.handle_unauthorized();
        assert!(!state.current().is_authenticated());
        assert_eq!(state.store.load(), None);
    }

    #[tokio::test]
    async fn test_initialize_with_unreachable_authority_keeps_candidate() {
        let mut store = CredentialStore::ephemeral();
        store.save("stored-token").expect("Failed to seed store");
        let mut state = SessionState::new(store);

        let config = Config::new("http://127.0.0.1:9/v1/uuid");
        let client = VerifyClient::new(&config).expect("Failed to build client");

        state.initialize(&client).await;

        // Connection refused: validity unknown, token kept, not validated
        assert_eq!(state.current().token.as_deref(), Some("stored-token"));
        assert!(!state.current().is_authenticated());
    }
}
