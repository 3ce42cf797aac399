//! # Money Module
//!
//! Provides the `Money` type for prices and totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Product prices arrive from the UI as peso numbers:                     │
//! │    precio: 12500.5  →  held as 1250050 centavos                         │
//! │                                                                         │
//! │  Line totals and purchase totals are integer sums, so                   │
//! │  3 × $4.200,10 is exactly $12.600,30 and never $12.600,299999.          │
//! │                                                                         │
//! │  On the way back out the value is written as pesos again (12500.5),     │
//! │  so stored arrays keep the layout the dashboards write.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order totals use [`Money::checked_mul`] and [`Money::checked_add`].
//! The operator impls saturate instead of panicking; they back display
//! totals over stored data that was never validated here.
//!
//! ## Usage
//! ```rust
//! use syspharma_core::money::Money;
//!
//! let precio = Money::from_centavos(1_250_000); // $12.500,00
//! let linea = precio * 3;
//! assert_eq!(linea.centavos(), 3_750_000);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (1/100 of a peso).
///
/// Serializes as a plain JSON number of pesos: `12500` or `12500.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

/// Largest peso amount accepted from a fractional JSON number.
///
/// Past 2^53 an `f64` no longer holds whole centavos exactly.
const MAX_FRACTIONAL_CENTAVOS: f64 = 9_007_199_254_740_992.0;

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from whole pesos.
    ///
    /// ```rust
    /// use syspharma_core::money::Money;
    ///
    /// assert_eq!(Money::from_pesos(8_900).centavos(), 890_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion (truncated toward zero).
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the bounds.
    ///
    /// ```rust
    /// use syspharma_core::money::Money;
    ///
    /// let unit = Money::from_pesos(4_200);
    /// assert_eq!(unit.multiply_quantity(3), Money::from_pesos(12_600));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit in an `i64` of centavos.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

struct PesosVisitor;

impl<'de> Visitor<'de> for PesosVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in pesos")
    }

    fn visit_i64<E: de::Error>(self, pesos: i64) -> Result<Money, E> {
        pesos
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount out of range: {}", pesos)))
    }

    fn visit_u64<E: de::Error>(self, pesos: u64) -> Result<Money, E> {
        let pesos = i64::try_from(pesos)
            .map_err(|_| E::custom(format!("amount out of range: {}", pesos)))?;
        self.visit_i64(pesos)
    }

    fn visit_f64<E: de::Error>(self, pesos: f64) -> Result<Money, E> {
        let centavos = (pesos * 100.0).round();
        if !centavos.is_finite() || centavos.abs() > MAX_FRACTIONAL_CENTAVOS {
            return Err(E::custom(format!("amount out of range: {}", pesos)));
        }
        Ok(Money(centavos as i64))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PesosVisitor)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Colombian-style display: `.` groups thousands, `,` separates centavos.
///
/// For logs and seed output; the front end formats for its own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.pesos().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}${},{:02}", sign, grouped, self.centavos_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
