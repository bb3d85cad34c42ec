// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumption periods.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Aggregation period for consumption queries.
///
/// The API keys each period by a "start-of" code: `so` followed by the
/// first letter of the period name.
///
/// # Examples
///
/// ```
/// use keyatome::types::Period;
///
/// let period: Period = "week".parse().unwrap();
/// assert_eq!(period, Period::Week);
/// assert_eq!(period.query_code(), "sow");
///
/// assert!("decade".parse::<Period>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    /// Since the start of the current day.
    #[default]
    Day,
    /// Since the start of the current week.
    Week,
    /// Since the start of the current month.
    Month,
    /// Since the start of the current year.
    Year,
}

impl Period {
    /// All periods, shortest first.
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Returns the lowercase period name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Returns the value sent as the `period` query parameter.
    #[must_use]
    pub const fn query_code(&self) -> &'static str {
        match self {
            Self::Day => "sod",
            Self::Week => "sow",
            Self::Month => "som",
            Self::Year => "soy",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ValueError::InvalidPeriod(s.to_string())),
        }
    }
}
