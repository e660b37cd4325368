// src/auth/mod.rs
//! Portal Session Negotiation
//!
//! This module drives the portal's token-gated handshake: fetch the landing
//! state for an anti-forgery token, log in with it, then activate the
//! session with the second token extracted from the login response.

pub mod lookup;
pub mod negotiator;

pub use lookup::{DocumentRoot, LookupAttempt, FETCH_ATTEMPTS, LOGIN_ATTEMPTS};
pub use negotiator::Negotiator;
