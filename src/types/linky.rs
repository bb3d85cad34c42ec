// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription selection and account identity.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::error::ValueError;

/// Selects one of the subscriptions attached to an account.
///
/// An account may have several Linky meters. The login response lists their
/// subscriptions in order; `LinkyNumber` picks one of them, counting from 1.
///
/// # Examples
///
/// ```
/// use keyatome::types::LinkyNumber;
///
/// let first = LinkyNumber::default();
/// assert_eq!(first.value(), 1);
/// assert_eq!(first.index(), 0);
///
/// let second = LinkyNumber::new(2).unwrap();
/// assert_eq!(second.index(), 1);
///
/// assert!(LinkyNumber::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkyNumber(NonZeroUsize);

impl LinkyNumber {
    /// The first subscription.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Creates a new linky number.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidLinkyNumber` if `number` is 0.
    pub fn new(number: usize) -> Result<Self, ValueError> {
        NonZeroUsize::new(number)
            .map(Self)
            .ok_or(ValueError::InvalidLinkyNumber(number))
    }

    /// Returns the one-based number.
    #[must_use]
    pub const fn value(&self) -> usize {
        self.0.get()
    }

    /// Returns the zero-based position in the login response's subscriptions.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0.get() - 1
    }
}

impl Default for LinkyNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for LinkyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkyNumber {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<usize>()
            .map_err(|_| ValueError::UnparsableLinkyNumber(s.to_string()))?;
        Self::new(number)
    }
}

impl TryFrom<usize> for LinkyNumber {
    type Error = ValueError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The account and subscription a client is bound to after login.
///
/// Both parts come from the same login response, so they are always set
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    user_id: String,
    user_reference: String,
}

impl Identity {
    /// Creates an identity from a user id and a subscription reference.
    #[must_use]
    pub fn new(user_id: impl Into<String>, user_reference: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_reference: user_reference.into(),
        }
    }

    /// Returns the account id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the subscription reference.
    #[must_use]
    pub fn user_reference(&self) -> &str {
        &self.user_reference
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.user_reference)
    }
}
