// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login response parsing.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::types::{Identity, LinkyNumber};

/// Body returned by the login endpoint.
///
/// The fields needed to address the data endpoints are decoded; the rest of
/// the user profile is kept in [`extra`](Self::extra).
///
/// # Examples
///
/// ```
/// use keyatome::response::LoginResponse;
/// use keyatome::types::LinkyNumber;
///
/// let json = r#"{
///     "id": 12345,
///     "email": "someone@example.com",
///     "subscriptions": [{ "reference": "101234567" }]
/// }"#;
/// let response: LoginResponse = serde_json::from_str(json).unwrap();
/// let identity = response.identity(LinkyNumber::default()).unwrap();
/// assert_eq!(identity.user_id(), "12345");
/// assert_eq!(identity.user_reference(), "101234567");
/// assert_eq!(response.extra["email"], "someone@example.com");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Account id. The API has sent it both as a number and as a string.
    pub id: Value,

    /// Subscriptions attached to the account, in API order.
    pub subscriptions: Vec<Subscription>,

    /// Remaining profile fields, as sent by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One subscription (meter contract) attached to an account.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    /// Opaque reference used in data endpoint paths.
    pub reference: String,

    /// Remaining subscription fields, as sent by the API.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginResponse {
    /// Returns the account id as a string.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnsupportedId` if the id is neither a string nor
    /// a number.
    pub fn user_id(&self) -> Result<String, ParseError> {
        match &self.id {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(ParseError::UnsupportedId(other.to_string())),
        }
    }

    /// Resolves the identity for the selected subscription.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnsupportedId` if the id is unusable, or
    /// `ParseError::SubscriptionOutOfRange` if the account has fewer
    /// subscriptions than `linky`.
    pub fn identity(&self, linky: LinkyNumber) -> Result<Identity, ParseError> {
        let user_id = self.user_id()?;
        let subscription = self.subscriptions.get(linky.index()).ok_or(
            ParseError::SubscriptionOutOfRange {
                linky: linky.value(),
                available: self.subscriptions.len(),
            },
        )?;
        Ok(Identity::new(user_id, subscription.reference.clone()))
    }
}
