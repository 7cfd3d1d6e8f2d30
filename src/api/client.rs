//! HTTP client for the remote verification authority.
//!
//! This module provides the `VerifyClient` for confirming candidate
//! tokens against the configured verification endpoint, and for the
//! alternate form-encoded login-submission endpoint some deployments
//! expose instead.

use std::time::Duration;

use anyhow::Result;
use reqwest::{redirect, Client, StatusCode};
use tracing::{debug, warn};

use crate::config::Config;

use super::ApiError;

/// Result of presenting a candidate token to the verification authority.
///
/// `Invalid` and `NetworkError` are deliberately distinct: an `Invalid`
/// token is definitively rejected and must be cleared, while a
/// `NetworkError` means validity is unknown and an existing session is
/// kept (see `SessionState::apply_outcome`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The authority accepted the token. Carries an opaque identity
    /// marker from the response body when one was present; never parsed.
    Valid(Option<String>),
    /// The authority explicitly rejected the token (401). Carries the
    /// response body as a user-facing message when the endpoint sent one.
    Invalid(Option<String>),
    /// Connection failure, timeout, 5xx, or any other status: validity
    /// is unknown.
    NetworkError(String),
}

impl Outcome {
    /// Classify an HTTP response from the authority.
    /// 2xx is valid, 401 is invalid, everything else is a network/server
    /// problem that leaves validity unknown.
    pub fn from_status(status: StatusCode, body: Option<String>) -> Self {
        let body = body
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        if status.is_success() {
            Outcome::Valid(body)
        } else if status == StatusCode::UNAUTHORIZED {
            Outcome::Invalid(body)
        } else {
            Outcome::NetworkError(format!("Unexpected status {}", status))
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }
}

/// Client for the verification authority.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct VerifyClient {
    client: Client,
    /// Separate client for login submission: redirects are never
    /// followed there, so the server's 302-means-accepted answer is
    /// observed directly and the call stays a single round trip.
    login_client: Client,
    verify_url: String,
    login_url: Option<String>,
}

impl VerifyClient {
    /// Create a client with the configured endpoints and timeout.
    /// Timeouts classify as `NetworkError` when requests run over.
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;
        let login_client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            login_client,
            verify_url: config.verify_url.clone(),
            login_url: config.login_url.clone(),
        })
    }

    /// Confirm a candidate token with one round trip:
    /// `GET <verify_url>` with `Authorization: Bearer <token>`.
    pub async fn verify(&self, token: &str) -> Outcome {
        let response = self
            .client
            .get(&self.verify_url)
            .bearer_auth(token)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.ok();
                let outcome = Outcome::from_status(status, body);
                debug!(status = %status, valid = outcome.is_valid(), "Verification response");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Could not reach verification authority");
                Outcome::NetworkError(e.to_string())
            }
        }
    }

    /// Submit a token to the alternate login endpoint:
    /// `POST <login_url>` with a form-encoded body. 200/302 means the
    /// server accepted the credential (the 302 is observed, not
    /// followed); a 401 body is the user-facing rejection message.
    pub async fn post_login(&self, token: &str) -> Outcome {
        let Some(ref login_url) = self.login_url else {
            return Outcome::NetworkError("No login endpoint configured".to_string());
        };

        let response = self
            .login_client
            .post(login_url)
            .form(&[("token", token)])
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.ok();
                if status.is_success() || status == StatusCode::FOUND {
                    Outcome::Valid(None)
                } else if status == StatusCode::UNAUTHORIZED {
                    Outcome::Invalid(body.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()))
                } else {
                    warn!(status = %status, "Unexpected login response");
                    Outcome::NetworkError(format!("Unexpected status {}", status))
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not reach login endpoint");
                Outcome::NetworkError(e.to_string())
            }
        }
    }

    /// Confirm a token via whichever submission path is configured:
    /// the login endpoint when present, otherwise the bearer GET.
    pub async fn authenticate(&self, token: &str) -> Outcome {
        if self.login_url.is_some() {
            self.post_login(token).await
        } else {
            self.verify(token).await
        }
    }

    /// Perform an authenticated GET after login. A 401 surfaces as
    /// `ApiError::Unauthorized` so the caller can clear the session.
    pub async fn authenticated_get(&self, url: &str, token: &str) -> Result<String, ApiError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
