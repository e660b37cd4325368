// src/error.rs
//! Classified Handshake Failures
//!
//! Every way a portal run can abort maps onto exactly one variant here, so
//! callers always know which step died and why.

use serde_json::Value;
use thiserror::Error;

/// The handshake step a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Initial GET that yields the first anti-forgery token.
    Fetch,
    /// Credentialed login POST.
    Login,
    /// Session-activation POST.
    Connect,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Fetch => write!(f, "fetch"),
            Step::Login => write!(f, "login"),
            Step::Connect => write!(f, "connect"),
        }
    }
}

/// Terminal failure of a portal run.
#[derive(Debug, Error)]
pub enum PortalError {
    /// A required credential was not supplied. Checked before any request
    /// goes out.
    #[error("missing credential {0} (pass the flag or set the environment variable)")]
    MissingCredential(&'static str),

    /// Network-level failure or non-success HTTP status.
    #[error("transport failure during {step}: {source}")]
    Transport {
        step: Step,
        #[source]
        source: rquest::Error,
    },

    /// Response body was not well-formed JSON.
    #[error("unparseable {step} response: {source}")]
    Parse {
        step: Step,
        #[source]
        source: serde_json::Error,
    },

    /// Every lookup attempt for the step ran dry. The response document is
    /// retained so the caller can dump it for diagnosis.
    #[error("no token found in {step} response")]
    TokenNotFound { step: Step, response: Value },
}

impl PortalError {
    /// Short classification label for log lines and the exit banner.
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::MissingCredential(_) => "precondition",
            PortalError::Transport { .. } => "transport",
            PortalError::Parse { .. } => "parse",
            PortalError::TokenNotFound { .. } => "token-not-found",
        }
    }
}
