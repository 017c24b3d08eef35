use std::{
    fmt::Display,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

const CENTS_PER_UNIT: i64 = 100;

//--------------------------------------        Price          ---------------------------------------------------------
/// An asking or offered price, stored as a whole number of cents.
///
/// Listings are posted with free-text prices, so [`Price::from_str`] is deliberately forgiving: currency symbols,
/// thousands separators and surrounding whitespace are ignored. Anything else, including a minus sign, is rejected and
/// the listing is treated as having no price.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Price(i64);

op!(binary Price, Add, add);
op!(binary Price, Sub, sub);
op!(unary Price, Neg, neg);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot interpret '{0}' as a price")]
pub struct PriceParseError(String);

impl Price {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * CENTS_PER_UNIT)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// The price in whole currency units, as a float. Used by the scoring arithmetic.
    pub fn as_units(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub fn is_free(&self) -> bool {
        self.0 <= 0
    }
}

impl From<i64> for Price {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / CENTS_PER_UNIT as u64, abs % CENTS_PER_UNIT as u64)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PriceParseError(s.to_string());
        let cleaned: String = s.trim().chars().filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' ')).collect();
        if cleaned.is_empty() {
            return Err(err());
        }
        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) || frac.len() > 2 {
            return Err(err());
        }
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| err())? };
        let frac = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse::<i64>().map_err(|_| err())?,
        };
        let cents = whole.checked_mul(CENTS_PER_UNIT).and_then(|w| w.checked_add(frac)).ok_or_else(err)?;
        Ok(Self(cents))
    }
}
