//! HTTP client module for the verification authority.
//!
//! This module provides the `VerifyClient` for confirming candidate
//! bearer tokens, and the classified `Outcome` the rest of the crate
//! consumes instead of raw HTTP results.

pub mod client;
pub mod error;

pub use client::{Outcome, VerifyClient};
pub use error::ApiError;
