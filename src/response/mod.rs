// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for Atome JSON responses.
//!
//! Only the login response has a fixed shape the client depends on. Live and
//! consumption data are returned to the caller as untyped
//! [`serde_json::Value`]s.

mod login;

pub use login::{LoginResponse, Subscription};
