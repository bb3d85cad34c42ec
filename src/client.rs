// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Atome API client.

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AuthenticationError, Error, ParseError, Result};
use crate::protocol::{ClientConfig, Endpoints, MAX_RETRIES};
use crate::response::LoginResponse;
use crate::types::{Identity, LinkyNumber, Period};

/// Body of the login request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    plain_password: &'a str,
}

/// Client for one Atome account.
///
/// The client owns a cookie-bearing HTTP session and the identity obtained
/// at login. Data requests re-authenticate transparently when the server
/// reports an expired session (HTTP 403), up to [`MAX_RETRIES`] times.
///
/// All operations take `&mut self`: a client issues one request at a time.
///
/// # Examples
///
/// ```no_run
/// use keyatome::{AtomeClient, Period};
///
/// # async fn example() -> keyatome::Result<()> {
/// let mut client = AtomeClient::new("someone@example.com", "secret");
/// client.login().await?;
///
/// let live = client.get_live().await?;
/// println!("last reading: {}", live["last"]);
///
/// let today = client.get_consumption(Period::Day).await?;
/// println!("total today: {}", today["total"]);
///
/// client.close_session();
/// # Ok(())
/// # }
/// ```
pub struct AtomeClient {
    username: String,
    password: String,
    config: ClientConfig,
    session: Option<Client>,
    identity: Option<Identity>,
}

impl AtomeClient {
    /// Creates a client with the default configuration.
    ///
    /// No request is sent until [`login`](Self::login) is called.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::with_config(username, password, ClientConfig::default())
    }

    /// Creates a client with a custom configuration.
    #[must_use]
    pub fn with_config(
        username: impl Into<String>,
        password: impl Into<String>,
        config: ClientConfig,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            config,
            session: None,
            identity: None,
        }
    }

    /// Uses a pre-built HTTP session instead of creating one at login.
    ///
    /// The session should keep cookies (`cookie_store(true)`), otherwise every
    /// data request will hit an expired session and log in again.
    #[must_use]
    pub fn with_session(mut self, session: Client) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns the account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the selected subscription.
    #[must_use]
    pub fn linky_number(&self) -> LinkyNumber {
        self.config.linky_number()
    }

    /// Returns the per-request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout()
    }

    /// Returns the identity obtained at the last successful login.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the account id, once logged in.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(Identity::user_id)
    }

    /// Returns the subscription reference, once logged in.
    #[must_use]
    pub fn user_reference(&self) -> Option<&str> {
        self.identity.as_ref().map(Identity::user_reference)
    }

    /// Returns whether an HTTP session is currently open.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Logs in and binds the client to the selected subscription.
    ///
    /// Creates the HTTP session first if none is open. On success the new
    /// identity is stored and the decoded user profile is returned; on
    /// failure the previous identity is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::Session`] if the HTTP session cannot be created
    /// - [`Error::Authentication`] if the request fails or is rejected
    /// - [`Error::Protocol`] if the response lacks `id` or the selected
    ///   subscription
    pub async fn login(&mut self) -> Result<LoginResponse> {
        let session = self.ensure_session()?;
        let url = Endpoints::new(self.config.base_url()).login();
        let payload = LoginRequest {
            email: &self.username,
            plain_password: &self.password,
        };

        tracing::debug!(url = %url, username = %self.username, "Logging in to Atome API");

        let mut request = session
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload);
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Can not login to API");
            AuthenticationError::Transport(e)
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(AuthenticationError::Transport)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Login rejected");
            return Err(AuthenticationError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let decoded = serde_json::from_str::<LoginResponse>(&body)
            .map_err(ParseError::from)
            .and_then(|login| {
                let identity = login.identity(self.config.linky_number())?;
                Ok((login, identity))
            });
        let (login, identity) = decoded.map_err(|e| {
            tracing::debug!(
                status = status.as_u16(),
                body = %body,
                error = %e,
                "Impossible to decode login response"
            );
            Error::protocol(status.as_u16(), body.as_str(), e)
        })?;

        tracing::info!(
            user_id = %identity.user_id(),
            linky_number = %self.config.linky_number(),
            "Logged in to Atome API"
        );

        self.identity = Some(identity);
        Ok(login)
    }

    /// Fetches the live measurement of the bound subscription.
    ///
    /// # Errors
    ///
    /// - [`Error::NotLoggedIn`] if [`login`](Self::login) never succeeded
    /// - any error of the retrieval loop, see [`get_consumption`](Self::get_consumption)
    pub async fn get_live(&mut self) -> Result<Value> {
        let identity = self.identity.as_ref().ok_or(Error::NotLoggedIn)?;
        let url = Endpoints::new(self.config.base_url()).live(identity);
        self.fetch(&url).await
    }

    /// Fetches the consumption of the bound subscription over `period`.
    ///
    /// The decoded JSON is returned verbatim.
    ///
    /// # Errors
    ///
    /// - [`Error::NotLoggedIn`] if [`login`](Self::login) never succeeded
    /// - [`Error::Network`] if the API cannot be reached
    /// - [`Error::RetryExhausted`] if the session keeps expiring
    /// - [`Error::EmptyResponse`] if the body is empty
    /// - [`Error::Protocol`] if the body is not JSON or the status is unexpected
    /// - any error of [`login`](Self::login) raised while re-authenticating
    pub async fn get_consumption(&mut self, period: Period) -> Result<Value> {
        let identity = self.identity.as_ref().ok_or(Error::NotLoggedIn)?;
        let url = Endpoints::new(self.config.base_url()).consumption(identity, period);
        self.fetch(&url).await
    }

    /// Closes the HTTP session.
    ///
    /// The identity is kept. The next request opens a fresh session, which
    /// the server sees as expired, so the client logs in again on its own.
    pub fn close_session(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("Closed HTTP session");
        }
    }

    fn ensure_session(&mut self) -> Result<Client> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }
        let session = self.config.build_session()?;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// GETs `url` and decodes the JSON body, logging in again on HTTP 403.
    async fn fetch(&mut self, url: &str) -> Result<Value> {
        let mut retries = 0;

        loop {
            if retries > MAX_RETRIES {
                tracing::warn!(retries, "Can't gather proper data, max retries exceeded");
                return Err(Error::RetryExhausted { attempts: retries });
            }

            let session = self.ensure_session()?;
            let mut request = session.get(url);
            if let Some(timeout) = self.config.timeout() {
                request = request.timeout(timeout);
            }

            tracing::debug!(url = %url, retries, "Requesting Atome data");

            let response = request.send().await.map_err(Error::Network)?;
            let status = response.status();

            if status == StatusCode::FORBIDDEN {
                tracing::info!(retries, "Got 403, logging in again");
                self.login().await?;
                retries += 1;
                continue;
            }

            let body = response.text().await.map_err(Error::Network)?;
            tracing::debug!(status = status.as_u16(), body = %body, "Received Atome data");

            if !status.is_success() {
                return Err(Error::protocol(
                    status.as_u16(),
                    body,
                    ParseError::UnexpectedStatus(status.as_u16()),
                ));
            }

            if body.trim().is_empty() {
                return Err(Error::EmptyResponse {
                    status: status.as_u16(),
                });
            }

            return serde_json::from_str(&body).map_err(|e| {
                tracing::debug!(error = %e, body = %body, "Impossible to decode response");
                Error::protocol(status.as_u16(), body.as_str(), e)
            });
        }
    }
}

impl fmt::Debug for AtomeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomeClient")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("config", &self.config)
            .field("has_session", &self.session.is_some())
            .field("identity", &self.identity)
            .finish()
    }
}
