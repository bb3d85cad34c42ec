// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for the Atome API.
//!
//! Each type is validated at construction time, so a client never builds a
//! request from an out-of-range value.
//!
//! # Types
//!
//! - [`Period`] - Consumption aggregation period (day/week/month/year)
//! - [`LinkyNumber`] - One-based subscription selector
//! - [`Identity`] - User id and subscription reference obtained at login

mod linky;
mod period;

pub use linky::{Identity, LinkyNumber};
pub use period::Period;
