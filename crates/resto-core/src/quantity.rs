//! # Quantity Module
//!
//! Ingredient quantities (stock levels, recipe requirements) in thousandths
//! of the ingredient's unit of measure.
//!
//! Recipes need fractions ("0.25 kg rice", "1.5 eggs") but comparisons
//! against stock must be exact, so the same integer approach as [`Money`]
//! applies: `Quantity::from_milli(250)` is a quarter of a unit.
//!
//! [`Money`]: crate::money::Money

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Milli-units per whole unit.
pub const MILLI_PER_UNIT: i64 = 1000;

/// An ingredient quantity in thousandths of its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Whole units, e.g. `from_units(2)` for two eggs.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

/// Prints the shortest decimal form: `1500` → `1.5`, `2000` → `2`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLI_PER_UNIT as u64;
        let frac = abs % MILLI_PER_UNIT as u64;

        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }

        let frac = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
    }
}

/// Parses decimal text with at most three fractional digits.
///
/// ```rust
/// use resto_core::quantity::Quantity;
///
/// assert_eq!("0.25".parse::<Quantity>().unwrap().milli(), 250);
/// assert_eq!("3".parse::<Quantity>().unwrap().milli(), 3000);
/// assert!("1.2345".parse::<Quantity>().is_err());
/// ```
impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ValidationError::invalid_format("quantity", "expected a decimal number");

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 3 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "quantity",
                "at most three decimal places",
            ));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac_milli: i64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<3}", frac).parse().map_err(|_| invalid())?
        };

        let milli = whole
            .checked_mul(MILLI_PER_UNIT)
            .and_then(|w| w.checked_add(frac_milli))
            .ok_or_else(invalid)?;

        Ok(Quantity(if negative { -milli } else { milli }))
    }
}
