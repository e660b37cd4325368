// src/config.rs
//! Portal & Credential Configuration
//!
//! The portal's endpoint, fixed header set, and session cookie values live
//! here as explicit configuration rather than literals inside the request
//! code, so tests and other deployments can point the handshake elsewhere.

use anyhow::{Context, Result};
use rquest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

use crate::error::PortalError;

/// Live portal authentication endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://jionet2.jio.in:8443/portal/auth/login";

/// Cookie values the portal's load balancer expects on every request.
pub const DEFAULT_COOKIE: &str = "ROUTEID=balancer.node1; route=c84631e43c097b078a5a00b708d0a736; PHPSESSID=bsjfs70f4k1racpud57f1hodm2; NSC_kjpofu2.kjp.jo_WT*8443=ffffffff099cd98045525d5f4f58455e445a4a4229c5";

/// Browser identity presented to the portal's bot checks.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where and how to talk to the portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Authentication endpoint all three steps target.
    pub endpoint: Url,

    /// Session cookie string sent with every request.
    pub cookie: String,

    /// User-agent string sent with every request.
    pub user_agent: String,

    /// Per-request timeout applied by the transport.
    pub timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            cookie: DEFAULT_COOKIE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PortalConfig {
    /// Referer the portal expects: the endpoint's origin.
    pub fn referer(&self) -> String {
        format!("{}/", self.endpoint.origin().ascii_serialization())
    }

    /// Fixed header set shared by all three handshake requests. Content-type
    /// varies per step and is set on the request itself; the host header is
    /// derived from the endpoint by the client.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,hi;q=0.8"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&self.cookie)
                .context("session cookie is not a valid header value")?,
        );
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(&self.referer())
                .context("endpoint origin is not a valid referer")?,
        );
        headers.insert(
            "sec-ch-ua",
            HeaderValue::from_static(
                "\"Not)A;Brand\";v=\"8\", \"Chromium\";v=\"138\", \"Google Chrome\";v=\"138\"",
            ),
        );
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Linux\""));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .context("user-agent is not a valid header value")?,
        );
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        Ok(headers)
    }
}

/// Identity presented to the portal. Opaque strings, immutable for the
/// duration of a run.
#[derive(Clone)]
pub struct Credentials {
    pub jio_id: String,
    pub password: String,
    pub account: String,
}

impl Credentials {
    /// Resolve credentials from explicit values (CLI flags) with environment
    /// variable fallback. Any credential still missing is a fatal
    /// precondition failure.
    pub fn resolve(
        jio_id: Option<String>,
        password: Option<String>,
        account: Option<String>,
    ) -> Result<Self, PortalError> {
        Ok(Credentials {
            jio_id: pick(jio_id, env_var("JIO_ID"), "JIO_ID")?,
            password: pick(password, env_var("PASSWORD"), "PASSWORD")?,
            account: pick(account, env_var("ACCOUNT"), "ACCOUNT")?,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn pick(
    explicit: Option<String>,
    fallback: Option<String>,
    key: &'static str,
) -> Result<String, PortalError> {
    explicit
        .filter(|v| !v.is_empty())
        .or(fallback)
        .ok_or(PortalError::MissingCredential(key))
}
