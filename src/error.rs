// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `keyatome` library.
//!
//! Every failure surfaces as a variant of [`Error`]: argument validation,
//! transport failures, rejected logins, undecodable responses and the
//! bounded re-login loop giving up.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    Value(#[from] ValueError),

    /// The HTTP session could not be built.
    #[error("failed to create HTTP session: {0}")]
    Session(#[source] reqwest::Error),

    /// The API could not be reached.
    #[error("could not access Atome API: {0}")]
    Network(#[source] reqwest::Error),

    /// Logging in to the API failed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    /// The response body is not valid JSON or lacks the expected shape.
    #[error("unexpected response (HTTP {status}): {source}")]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },

    /// The server answered with an empty body.
    #[error("empty response from server (HTTP {status})")]
    EmptyResponse {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The session kept expiring after repeated re-logins.
    #[error("max retries exceeded after {attempts} re-login attempts")]
    RetryExhausted {
        /// Number of re-logins performed before giving up.
        attempts: u32,
    },

    /// A data request was made before a successful login.
    #[error("not logged in")]
    NotLoggedIn,
}

impl Error {
    /// Builds a [`Error::Protocol`] from a response status and body.
    pub(crate) fn protocol(
        status: u16,
        body: impl Into<String>,
        source: impl Into<ParseError>,
    ) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
            source: source.into(),
        }
    }

    /// Returns the HTTP status attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Protocol { status, .. } | Self::EmptyResponse { status } => Some(*status),
            Self::Authentication(AuthenticationError::Rejected { status, .. }) => Some(*status),
            Self::Network(err) | Self::Session(err) => {
                err.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }
}

/// Errors related to caller-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Period outside `day`, `week`, `month` and `year`.
    #[error("period '{0}' out of range, expected one of 'day', 'week', 'month' or 'year'")]
    InvalidPeriod(String),

    /// Linky numbers start at 1.
    #[error("linky number {0} is invalid, numbering starts at 1")]
    InvalidLinkyNumber(usize),

    /// The linky number is not a positive integer.
    #[error("linky number '{0}' is not a number")]
    UnparsableLinkyNumber(String),
}

/// Errors related to decoding Atome responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The account id is neither a string nor a number.
    #[error("field `id` has unsupported type: {0}")]
    UnsupportedId(String),

    /// The account has fewer subscriptions than the selected linky number.
    #[error("linky number {linky} out of range, account has {available} subscription(s)")]
    SubscriptionOutOfRange {
        /// The selected linky number.
        linky: usize,
        /// Number of subscriptions in the login response.
        available: usize,
    },

    /// The server answered with a status other than success or 403.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

/// Errors raised by the login request itself.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The login endpoint could not be reached.
    #[error("can not login to API: {0}")]
    Transport(#[source] reqwest::Error),

    /// The login endpoint refused the credentials.
    #[error("login rejected with HTTP {status}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
