// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP plumbing for the Atome API.
//!
//! This module holds the fixed endpoint layout, the client configuration and
//! the User-Agent providers used when a session is created.
//!
//! # Endpoints
//!
//! | Purpose | Method | Path |
//! |---|---|---|
//! | Login | POST | `/api/user/login.json` |
//! | Live | GET | `/api/subscription/{id}/{ref}/measure/live.json` |
//! | Consumption | GET | `/api/subscription/{id}/{ref}/consumption.json?period=so{d,w,m,y}` |

mod http;
mod user_agent;

pub use http::ClientConfig;
pub use user_agent::{FixedUserAgent, RandomUserAgent, UserAgentProvider};

use crate::types::{Identity, Period};

/// Production API root.
pub const API_BASE_URI: &str = "https://esoftlink.esoftthings.com";
/// Login endpoint path.
pub const API_ENDPOINT_LOGIN: &str = "/api/user/login.json";
/// Prefix of every subscription-scoped endpoint.
pub const API_ENDPOINT_SUBSCRIPTION: &str = "/api/subscription";
/// Live measurement endpoint, relative to a subscription.
pub const API_ENDPOINT_LIVE: &str = "/measure/live.json";
/// Consumption endpoint, relative to a subscription.
pub const API_ENDPOINT_CONSUMPTION: &str = "/consumption.json";
/// Name of the session cookie set by the login endpoint.
pub const COOKIE_NAME: &str = "PHPSESSID";
/// Re-logins allowed for one data request before giving up.
pub const MAX_RETRIES: u32 = 3;

/// Builds endpoint URLs against a base URL.
///
/// # Examples
///
/// ```
/// use keyatome::protocol::Endpoints;
/// use keyatome::types::{Identity, Period};
///
/// let endpoints = Endpoints::new("https://esoftlink.esoftthings.com");
/// let identity = Identity::new("12345", "101234567");
///
/// assert_eq!(
///     endpoints.consumption(&identity, Period::Month),
///     "https://esoftlink.esoftthings.com/api/subscription/12345/101234567/consumption.json?period=som"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Endpoints<'a> {
    base_url: &'a str,
}

impl<'a> Endpoints<'a> {
    /// Creates an endpoint builder for `base_url` (without trailing slash).
    #[must_use]
    pub fn new(base_url: &'a str) -> Self {
        Self { base_url }
    }

    /// Login URL.
    #[must_use]
    pub fn login(&self) -> String {
        format!("{}{API_ENDPOINT_LOGIN}", self.base_url)
    }

    /// Live measurement URL for `identity`.
    #[must_use]
    pub fn live(&self, identity: &Identity) -> String {
        format!("{}{API_ENDPOINT_LIVE}", self.subscription(identity))
    }

    /// Consumption URL for `identity` over `period`.
    #[must_use]
    pub fn consumption(&self, identity: &Identity, period: Period) -> String {
        format!(
            "{}{API_ENDPOINT_CONSUMPTION}?period={}",
            self.subscription(identity),
            period.query_code()
        )
    }

    fn subscription(&self, identity: &Identity) -> String {
        format!(
            "{}{API_ENDPOINT_SUBSCRIPTION}/{}/{}",
            self.base_url,
            urlencoding::encode(identity.user_id()),
            urlencoding::encode(identity.user_reference())
        )
    }
}
