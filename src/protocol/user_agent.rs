// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-Agent selection for new sessions.

use std::fmt;

use rand::seq::IndexedRandom;

/// Supplies the `User-Agent` header of each new HTTP session.
///
/// The provider is asked once per session, so a randomizing provider gives
/// every session its own browser identity.
pub trait UserAgentProvider: fmt::Debug + Send + Sync {
    /// Returns the `User-Agent` value for a new session.
    fn user_agent(&self) -> String;
}

/// Picks a desktop browser User-Agent at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgent;

impl RandomUserAgent {
    /// Browser strings the provider picks from.
    pub const AGENTS: &'static [&'static str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.51",
    ];
}

impl UserAgentProvider for RandomUserAgent {
    fn user_agent(&self) -> String {
        Self::AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Self::AGENTS[0])
            .to_string()
    }
}

/// Always returns the same User-Agent.
///
/// # Examples
///
/// ```
/// use keyatome::protocol::{FixedUserAgent, UserAgentProvider};
///
/// let provider = FixedUserAgent::new("keyatome-tests");
/// assert_eq!(provider.user_agent(), "keyatome-tests");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedUserAgent(String);

impl FixedUserAgent {
    /// Creates a provider returning `user_agent`.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self(user_agent.into())
    }
}

impl UserAgentProvider for FixedUserAgent {
    fn user_agent(&self) -> String {
        self.0.clone()
    }
}
