// src/auth/negotiator.rs
//! Three-Step Portal Handshake
//!
//! Drives the fetch → login → connect sequence against the portal's
//! authentication endpoint, threading the anti-forgery token extracted from
//! each response into the next request. Steps are strictly sequential; a
//! failure at any step terminates the run with a classified error.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rquest::{header, Client, RequestBuilder};
use rquest_util::Emulation;
use serde_json::Value;

use crate::auth::lookup::{run_attempts, LookupAttempt, FETCH_ATTEMPTS, LOGIN_ATTEMPTS};
use crate::config::{Credentials, PortalConfig};
use crate::error::{PortalError, Step};
use crate::locator::CSRF_FIELD;

/// Protocol marker carried by every step.
const AUTH_MARKER: &str = "auth1";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything except ASCII alphanumerics and `-` `.` `_` `~` escapes, so a
/// secret containing `&` or `=` cannot be misread as form structure.
const SECRET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Executes the portal handshake. One instance per run; independent runs
/// with distinct credentials can proceed in parallel, nothing is shared.
pub struct Negotiator {
    client: Client,
    config: PortalConfig,
    credentials: Credentials,
}

impl Negotiator {
    /// Build a negotiator with its own emulating HTTP client carrying the
    /// portal's fixed header set.
    pub fn new(config: PortalConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .emulation(Emulation::Chrome126)
            .default_headers(config.headers()?)
            .timeout(config.timeout)
            .build()
            .context("failed to build portal HTTP client")?;

        Ok(Negotiator {
            client,
            config,
            credentials,
        })
    }

    /// Run the full handshake and return the terminal connect response.
    pub async fn run(&self) -> Result<Value, PortalError> {
        let fetch_token = self.fetch_token().await?;
        let login_token = self.login(&fetch_token).await?;
        self.connect(&login_token).await
    }

    /// Step 1: read-only fetch of the portal's landing state, yielding the
    /// token the login request must carry.
    pub async fn fetch_token(&self) -> Result<String, PortalError> {
        info!("Fetching initial portal state from {}", self.config.endpoint);

        let request = self
            .client
            .get(self.config.endpoint.as_str())
            .query(&[("auth", AUTH_MARKER)])
            .header(header::CONTENT_TYPE, "application/json");

        let document = self.execute(Step::Fetch, request).await?;
        self.extract_token(Step::Fetch, document, FETCH_ATTEMPTS)
    }

    /// Step 2: credentialed login carrying the fetch token, yielding the
    /// token the connect request must carry.
    pub async fn login(&self, fetch_token: &str) -> Result<String, PortalError> {
        info!("Posting login credentials for {}", self.credentials.jio_id);

        let request = self
            .client
            .post(self.config.endpoint.as_str())
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(login_body(&self.credentials, fetch_token));

        let document = self.execute(Step::Login, request).await?;
        self.extract_token(Step::Login, document, LOGIN_ATTEMPTS)
    }

    /// Step 3: session activation carrying the login token. The parsed
    /// response document, whatever it contains, is the run result.
    pub async fn connect(&self, login_token: &str) -> Result<Value, PortalError> {
        info!("Activating session for account {}", self.credentials.account);

        let request = self
            .client
            .post(self.config.endpoint.as_str())
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(connect_body(&self.credentials, login_token));

        self.execute(Step::Connect, request).await
    }

    /// Send one request and parse its body as a response document,
    /// classifying transport and parse failures against `step`.
    async fn execute(&self, step: Step, request: RequestBuilder) -> Result<Value, PortalError> {
        let response = request
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| PortalError::Transport { step, source })?;

        debug!("{} response status {}", step, response.status());

        let body = response
            .text()
            .await
            .map_err(|source| PortalError::Transport { step, source })?;

        serde_json::from_str(&body).map_err(|source| PortalError::Parse { step, source })
    }

    /// Run the step's lookup table over `document`. The document moves into
    /// the error on exhaustion so the caller can dump it.
    fn extract_token(
        &self,
        step: Step,
        document: Value,
        attempts: &[LookupAttempt],
    ) -> Result<String, PortalError> {
        let located = run_attempts(&document, attempts).map(|(value, field)| {
            if field == CSRF_FIELD {
                debug!("{} token located ({} chars)", step, value.len());
            } else {
                info!("{} token surfaced under alternate field '{}'", step, field);
            }
            value.to_string()
        });

        located.ok_or_else(|| {
            warn!("Lookup table exhausted for {} response", step);
            PortalError::TokenNotFound {
                step,
                response: document,
            }
        })
    }
}

/// Step-2 form body. Only the secret is percent-encoded; the portal expects
/// the remaining values verbatim.
fn login_body(credentials: &Credentials, fetch_token: &str) -> String {
    let password = utf8_percent_encode(&credentials.password, SECRET_ENCODE_SET);
    format!(
        "jioId={}&password={}&terms=true&csrf_token={}&auth={}&action=login",
        credentials.jio_id, password, fetch_token, AUTH_MARKER
    )
}

/// Step-3 form body.
fn connect_body(credentials: &Credentials, login_token: &str) -> String {
    format!(
        "account={}&csrf_token={}&auth={}&action=connect",
        credentials.account, login_token, AUTH_MARKER
    )
}
