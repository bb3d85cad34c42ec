// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `keyatome` - A Rust client for the Atome Linky energy monitoring API.
//!
//! The Atome dongle reads a Linky smart meter and pushes its measurements to
//! the vendor's cloud. This library logs in to that cloud and reads the data
//! back.
//!
//! # Supported Features
//!
//! - **Login**: email/password authentication bound to one of the account's
//!   subscriptions
//! - **Live data**: instantaneous power reading
//! - **Consumption**: energy used since the start of the day, week, month or
//!   year
//! - **Session recovery**: expired sessions (HTTP 403) trigger a new login,
//!   up to [`protocol::MAX_RETRIES`] times per request
//!
//! # Quick Start
//!
//! ```no_run
//! use keyatome::{AtomeClient, Period};
//!
//! #[tokio::main]
//! async fn main() -> keyatome::Result<()> {
//!     let mut client = AtomeClient::new("someone@example.com", "secret");
//!     client.login().await?;
//!
//!     let live = client.get_live().await?;
//!     println!("{live:#}");
//!
//!     let month = client.get_consumption(Period::Month).await?;
//!     println!("total this month: {}", month["total"]);
//!
//!     client.close_session();
//!     Ok(())
//! }
//! ```
//!
//! ## Selecting a Subscription
//!
//! Accounts with several meters pick one with a one-based [`LinkyNumber`]:
//!
//! ```no_run
//! use keyatome::{AtomeClient, ClientConfig, LinkyNumber};
//! use std::time::Duration;
//!
//! # async fn example() -> keyatome::Result<()> {
//! let config = ClientConfig::new()
//!     .with_linky_number(LinkyNumber::new(2)?)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let mut client = AtomeClient::with_config("someone@example.com", "secret", config);
//! let profile = client.login().await?;
//! println!("{} subscription(s) on this account", profile.subscriptions.len());
//! println!("bound to {:?}", client.user_reference());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
pub mod protocol;
pub mod response;
pub mod types;

pub use client::AtomeClient;
pub use error::{AuthenticationError, Error, ParseError, Result, ValueError};
pub use protocol::{ClientConfig, FixedUserAgent, RandomUserAgent, UserAgentProvider};
pub use response::{LoginResponse, Subscription};
pub use types::{Identity, LinkyNumber, Period};
