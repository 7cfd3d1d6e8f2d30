//! Route guard: the check performed before granting access to a
//! protected view.
//!
//! The decision is a pure function of the current session, evaluated at
//! navigation time and never cached - background re-validation can flip
//! the answer between navigations.

use crate::auth::SessionState;

/// Outcome of a guarded navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        /// Login entry point to send the user to
        to: String,
        /// The target originally requested, so the login flow can return
        /// there after success
        original: Option<String>,
    },
}

pub struct RouteGuard {
    login_path: String,
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    /// Allow iff the session is validated; otherwise redirect to the
    /// login entry point, carrying the requested target.
    pub fn can_enter(&self, state: &SessionState, target: &str) -> GuardDecision {
        if state.current().is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect {
                to: self.login_path.clone(),
                original: Some(target.to_string()),
            }
        }
    }
}
