//! Login flow: the canonical submission state machine behind every UI
//! binding.
//!
//! `Idle → Submitting → { Accepted, Rejected, Failed }`. A rejected
//! credential and an unreachable authority surface distinct messages -
//! conflating the two hides network trouble behind "bad token".
//!
//! The flow is split into `begin` (local validation + double-submit
//! guard) and `finish` (outcome handling) so UI adapters can drive the
//! network call themselves; `submit` composes the two.

use tracing::{debug, info, warn};

use crate::api::{Outcome, VerifyClient};
use crate::auth::SessionState;

/// User-facing copy for a definitively rejected credential
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid token - please try again";

/// User-facing copy for an unreachable authority. Deliberately distinct
/// from the invalid-credential copy.
pub const AUTHORITY_UNREACHABLE_MESSAGE: &str =
    "Could not reach the verification authority - check your connection and retry";

/// Phase of the current login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPhase {
    /// Waiting for user input
    Idle,
    /// A verification round trip is in flight
    Submitting,
    /// The authority accepted the token; navigate to `next`
    Accepted { next: String },
    /// The authority rejected the token; the user must re-enter
    Rejected { message: String },
    /// The authority could not be reached; validity unknown
    Failed { message: String },
}

/// What `begin` decided to do with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Input accepted: run exactly one verification with this token
    Verify(String),
    /// Empty or whitespace-only input, rejected before any network call
    RejectedEmpty,
    /// A submission is already in flight; this one is ignored
    AlreadySubmitting,
}

pub struct LoginFlow {
    phase: LoginPhase,
    /// Target the route guard captured from the original navigation
    requested_target: Option<String>,
    /// Fallback target when no original navigation was captured
    landing_path: String,
}

impl LoginFlow {
    pub fn new(landing_path: impl Into<String>) -> Self {
        Self {
            phase: LoginPhase::Idle,
            requested_target: None,
            landing_path: landing_path.into(),
        }
    }

    pub fn phase(&self) -> &LoginPhase {
        &self.phase
    }

    /// Wire in the original target from a guard redirect so a successful
    /// login returns the user there.
    pub fn set_requested_target(&mut self, target: Option<String>) {
        self.requested_target = target;
    }

    /// Start a submission. Whitespace-only input is rejected locally with
    /// no phase transition; a submission while one is in flight is
    /// ignored. Any other phase (including a terminal one from a prior
    /// attempt) starts a fresh attempt.
    pub fn begin(&mut self, token: &str) -> SubmitAction {
        if matches!(self.phase, LoginPhase::Submitting) {
            debug!("Submission already in flight, ignoring resubmit");
            return SubmitAction::AlreadySubmitting;
        }

        let token = token.trim();
        if token.is_empty() {
            debug!("Empty token input rejected before any network call");
            return SubmitAction::RejectedEmpty;
        }

        self.phase = LoginPhase::Submitting;
        SubmitAction::Verify(token.to_string())
    }

    /// Settle the attempt with the verification outcome.
    pub fn finish(
        &mut self,
        token: String,
        outcome: Outcome,
        state: &mut SessionState,
    ) -> &LoginPhase {
        match outcome {
            Outcome::Valid(identity) => {
                state.set_authenticated(token, identity);
                let next = self
                    .requested_target
                    .take()
                    .unwrap_or_else(|| self.landing_path.clone());
                info!(next = %next, "Login accepted");
                self.phase = LoginPhase::Accepted { next };
            }
            Outcome::Invalid(message) => {
                // No session existed on this path; nothing to clear
                info!("Login rejected by the authority");
                self.phase = LoginPhase::Rejected {
                    message: message.unwrap_or_else(|| INVALID_CREDENTIAL_MESSAGE.to_string()),
                };
            }
            Outcome::NetworkError(e) => {
                warn!(error = %e, "Login could not reach the verification authority");
                self.phase = LoginPhase::Failed {
                    message: AUTHORITY_UNREACHABLE_MESSAGE.to_string(),
                };
            }
        }
        &self.phase
    }

    /// Full submission: local checks, one verification round trip,
    /// outcome handling.
    pub async fn submit(
        &mut self,
        token: &str,
        client: &VerifyClient,
        state: &mut SessionState,
    ) -> &LoginPhase {
        match self.begin(token) {
            SubmitAction::Verify(token) => {
                let outcome = client.authenticate(&token).await;
                self.finish(token, outcome, state)
            }
            SubmitAction::RejectedEmpty | SubmitAction::AlreadySubmitting => &self.phase,
        }
    }
}
