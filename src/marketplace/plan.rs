//! Listing duration/price tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PLAN_MONTH_MS;

/// The enumerated listing duration tier selected at creation or extension.
///
/// The wire form (store records and HTTP bodies) is the digit string the
/// plan picker uses: `"1"`, `"3"`, `"6"`, `"12"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    #[serde(rename = "1")]
    OneMonth,
    #[serde(rename = "3")]
    ThreeMonths,
    #[serde(rename = "6")]
    SixMonths,
    #[serde(rename = "12")]
    TwelveMonths,
}

impl Plan {
    pub const fn months(self) -> u64 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::TwelveMonths => 12,
        }
    }

    /// Expiry extension granted by this plan, in milliseconds.
    /// A plan month is a fixed 30 days.
    pub const fn duration_ms(self) -> u64 {
        self.months() * PLAN_MONTH_MS
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::OneMonth => "1",
            Self::ThreeMonths => "3",
            Self::SixMonths => "6",
            Self::TwelveMonths => "12",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::OneMonth),
            "3" => Some(Self::ThreeMonths),
            "6" => Some(Self::SixMonths),
            "12" => Some(Self::TwelveMonths),
            _ => None,
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unknown plan '{s}'"))
    }
}
