// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration.
//!
//! [`ClientConfig`] gathers the connection parameters (base URL, bearer
//! token, TLS verification) together with the defaults that govern lazy
//! handles and service registration.

use std::time::Duration;

use url::Url;

use crate::error::{AdamaError, Result};

/// Version addressed by a service handle when none is given.
pub const DEFAULT_VERSION: &str = "0.1";

/// How long a blocking registration waits for the service to come up.
pub const REGISTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between readiness checks while waiting for a registration.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Per-request HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the platform base URL.
pub const ENV_URL: &str = "ADAMA_URL";
/// Environment variable holding the bearer token.
pub const ENV_TOKEN: &str = "ADAMA_TOKEN";
/// Environment variable toggling TLS verification (`0`/`false` disables).
pub const ENV_VERIFY: &str = "ADAMA_VERIFY";

/// Connection and behaviour settings for an [`Adama`](crate::Adama) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `https://adama.example.org/community/v0.3`.
    pub base_url: String,
    /// Bearer token sent with every API call.
    pub token: Option<String>,
    /// Verify server certificates.
    pub verify_tls: bool,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Default deadline for blocking registrations.
    pub register_timeout: Duration,
    /// Sleep between registration readiness checks.
    pub poll_interval: Duration,
    /// Version used by handles created without one.
    pub default_version: String,
}

impl ClientConfig {
    /// Create a configuration for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`AdamaError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| AdamaError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            verify_tls: true,
            request_timeout: REQUEST_TIMEOUT,
            register_timeout: REGISTER_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            default_version: DEFAULT_VERSION.to_string(),
        })
    }

    /// Build a configuration from `ADAMA_URL`, `ADAMA_TOKEN`, and `ADAMA_VERIFY`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| AdamaError::InvalidUrl(format!("{ENV_URL} is not set")))?;
        Ok(Self::new(&url)?.with_env_credentials())
    }

    /// Take the token and TLS setting from `ADAMA_TOKEN` and `ADAMA_VERIFY`
    /// when they are set.
    pub fn with_env_credentials(mut self) -> Self {
        if let Some(token) = std::env::var(ENV_TOKEN).ok().filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Ok(verify) = std::env::var(ENV_VERIFY) {
            self.verify_tls = parse_flag(&verify);
        }
        self
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Enable or disable certificate verification.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Override the default registration deadline.
    pub fn with_register_timeout(mut self, timeout: Duration) -> Self {
        self.register_timeout = timeout;
        self
    }

    /// Override the registration polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
