//! Monetary amounts in minor units of the single checkout currency.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlazaError, PlazaResult};

/// An amount of money, stored as an integer count of minor units (cents).
///
/// The gateway wire format is a two-decimal string (`"10.00"`); the store
/// record format is the raw minor-unit integer. Keeping amounts integral
/// avoids float drift when the same value round-trips through both.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Hash,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a gateway decimal string (`"10"`, `"10.5"`, `"10.00"`).
    ///
    /// At most two fraction digits are accepted; the gateway never sends
    /// finer precision and silently truncating would lose money.
    pub fn parse_decimal(s: &str) -> PlazaResult<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PlazaError::Validation(format!("invalid amount '{s}'")));
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PlazaError::Validation(format!("invalid amount '{s}'")));
        }
        let whole: u64 = whole
            .parse()
            .map_err(|_| PlazaError::Validation(format!("amount '{s}' out of range")))?;
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };
        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .map(Self)
            .ok_or_else(|| PlazaError::Validation(format!("amount '{s}' out of range")))
    }
}

impl fmt::Display for Money {
    /// Formats as the exact two-decimal string the gateway expects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = PlazaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}
