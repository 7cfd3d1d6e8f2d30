//! tokengate - client-side bearer-token session lifecycle.
//!
//! One canonical protocol behind every UI binding: a user-supplied
//! opaque token is confirmed against a remote verification authority,
//! persisted for the browsing context, and consulted by a route guard
//! before any protected view renders.
//!
//! The pieces, leaf-first:
//! - [`auth::CredentialStore`] persists the token across restarts
//!   (or keeps it in memory only)
//! - [`api::VerifyClient`] performs the single verification round trip
//! - [`auth::SessionState`] owns the per-context session and re-verifies
//!   a stored token before trusting it
//! - [`guard::RouteGuard`] decides allow-or-redirect per navigation
//! - [`login::LoginFlow`] drives submission: local validation,
//!   double-submit guard, distinct rejected/unreachable outcomes
//!
//! UI bindings are adapters over these types and live outside this crate.
//!
//! ```no_run
//! use tokengate::{Config, CredentialStore, LoginFlow, RouteGuard, SessionState, VerifyClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::new("https://auth.example.com/v1/uuid");
//! let client = VerifyClient::new(&config)?;
//! let mut state = SessionState::new(CredentialStore::ephemeral());
//!
//! // Context start: a stored token is re-verified, never trusted blindly
//! state.initialize(&client).await;
//!
//! let guard = RouteGuard::new(&config.login_path);
//! if let tokengate::GuardDecision::Redirect { original, .. } = guard.can_enter(&state, "/") {
//!     let mut flow = LoginFlow::new(&config.landing_path);
//!     flow.set_requested_target(original);
//!     flow.submit("user-entered-token", &client, &mut state).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod login;

pub use api::{ApiError, Outcome, VerifyClient};
pub use auth::{CredentialStore, Session, SessionState, StoreError};
pub use config::{Config, Persistence};
pub use guard::{GuardDecision, RouteGuard};
pub use login::{LoginFlow, LoginPhase, SubmitAction};
