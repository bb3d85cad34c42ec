// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP configuration and session construction for the Atome API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::Error;
use crate::protocol::{API_BASE_URI, RandomUserAgent, UserAgentProvider};
use crate::types::LinkyNumber;

// ============================================================================
// ClientConfig
// ============================================================================

/// Configuration for an [`AtomeClient`](crate::AtomeClient).
///
/// Defaults target the production API with no request timeout, the first
/// subscription and a random browser User-Agent.
///
/// # Examples
///
/// ```
/// use keyatome::protocol::{ClientConfig, FixedUserAgent};
/// use keyatome::types::LinkyNumber;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_linky_number(LinkyNumber::new(2).unwrap())
///     .with_user_agent(FixedUserAgent::new("my-app/1.0"));
///
/// assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
/// assert_eq!(config.linky_number().index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Option<Duration>,
    linky_number: LinkyNumber,
    user_agent: Arc<dyn UserAgentProvider>,
}

impl ClientConfig {
    /// Timeout used by the command-line tool.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: API_BASE_URI.to_string(),
            timeout: None,
            linky_number: LinkyNumber::default(),
            user_agent: Arc::new(RandomUserAgent),
        }
    }

    /// Overrides the API base URL.
    ///
    /// Trailing slashes are removed.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Selects which subscription to bind to at login.
    #[must_use]
    pub fn with_linky_number(mut self, linky_number: LinkyNumber) -> Self {
        self.linky_number = linky_number;
        self
    }

    /// Sets the User-Agent provider used when a session is created.
    #[must_use]
    pub fn with_user_agent(mut self, provider: impl UserAgentProvider + 'static) -> Self {
        self.user_agent = Arc::new(provider);
        self
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the selected subscription.
    #[must_use]
    pub fn linky_number(&self) -> LinkyNumber {
        self.linky_number
    }

    /// Returns the User-Agent provider.
    #[must_use]
    pub fn user_agent(&self) -> &dyn UserAgentProvider {
        self.user_agent.as_ref()
    }

    /// Builds a new HTTP session.
    ///
    /// The session keeps cookies between requests, which is how the API
    /// tracks a logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if the HTTP client cannot be created.
    pub fn build_session(&self) -> Result<Client, Error> {
        let user_agent = self.user_agent.user_agent();
        tracing::debug!(user_agent = %user_agent, "Creating HTTP session");

        Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .build()
            .map_err(Error::Session)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
