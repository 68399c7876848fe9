//! Money amounts backed by rust_decimal.
//!
//! Amounts are kept lossless internally and rounded to cents only when a
//! derived value (tax, monthly equivalents) has to be presented.

use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use thiserror::Error;

/// Lossless decimal money type.
///
/// Serializes to a JSON number; deserializes from a JSON number or a
/// numeric string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Format without exponent notation and without trailing zeros.
    ///
    /// This is the form persisted in TEXT columns.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn from_i64(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Round to two decimal places, half away from zero.
    pub fn round_cents(&self) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self` percent of `base`, i.e. `base * self / 100`.
    pub fn percent_of(&self, base: Decimal) -> Self {
        Decimal(base.0.saturating_mul(self.0) / RustDecimal::ONE_HUNDRED)
    }

    /// Largest magnitude accepted on input for any amount or quantity.
    pub fn max_amount() -> Self {
        Decimal(RustDecimal::from(MAX_AMOUNT))
    }

    /// True if `|self| <= max_amount()`.
    pub fn is_within_limit(&self) -> bool {
        self.0.abs() <= RustDecimal::from(MAX_AMOUNT)
    }

    pub fn get(&self) -> RustDecimal {
        self.0
    }

    pub fn checked_add(self, rhs: Decimal) -> Result<Decimal, AmountOverflow> {
        self.0.checked_add(rhs.0).map(Decimal).ok_or(AmountOverflow)
    }

    pub fn checked_sub(self, rhs: Decimal) -> Result<Decimal, AmountOverflow> {
        self.0.checked_sub(rhs.0).map(Decimal).ok_or(AmountOverflow)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Result<Decimal, AmountOverflow> {
        self.0.checked_mul(rhs.0).map(Decimal).ok_or(AmountOverflow)
    }
}

const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// An arithmetic result fell outside the representable decimal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount out of range")]
pub struct AmountOverflow;

/// Serde adapter that writes a `Decimal` as a JSON string so stored
/// documents keep every digit. Reads accept a string or a number.
pub mod text {
    use super::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::str::serialize(&value.0, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        Decimal::deserialize(deserializer)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

// Operators saturate so figures derived from stored rows never panic a read.
// Inputs are bounded by `max_amount()`, so saturation is unreachable for
// validated data.

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0.saturating_mul(rhs.0))
    }
}

/// Panics on a zero divisor; callers divide by a positive month count.
impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, d| acc + *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_canonical_string_drops_trailing_zeros() {
        assert_eq!(d("1200.50").to_canonical_string(), "1200.5");
        assert_eq!(d("100.00").to_canonical_string(), "100");
        assert_eq!(d("0").to_canonical_string(), "0");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(d(" 42.5 "), d("42.5"));
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(d("10.005").round_cents(), d("10.01"));
        assert_eq!(d("10.004").round_cents(), d("10"));
        assert_eq!(d("-2.345").round_cents(), d("-2.35"));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(d("8.25").percent_of(d("200")), d("16.5"));
        assert!(Decimal::zero().percent_of(d("999")).is_zero());
    }

    #[test]
    fn test_sum_of_amounts() {
        let amounts = vec![d("10.10"), d("20.20"), d("0.70")];
        let total: Decimal = amounts.iter().sum();
        assert_eq!(total, d("31"));
        let empty: Vec<Decimal> = Vec::new();
        assert!(empty.into_iter().sum::<Decimal>().is_zero());
    }

    #[test]
    fn test_json_accepts_number_and_string() {
        let from_number: Decimal = serde_json::from_str("1500.25").unwrap();
        let from_string: Decimal = serde_json::from_str("\"1500.25\"").unwrap();
        assert_eq!(from_number, d("1500.25"));
        assert_eq!(from_string, d("1500.25"));
    }

    #[test]
    fn test_json_serializes_as_number() {
        let json = serde_json::to_value(d("99.99")).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "99.99");
    }

    #[test]
    fn test_is_negative() {
        assert!(d("-0.01").is_negative());
        assert!(!d("0").is_negative());
        assert!(!d("5").is_negative());
    }

    #[test]
    fn test_operators_saturate_instead_of_panicking() {
        let huge = d("50000000000000000000000000000");
        let total: Decimal = vec![huge, huge].into_iter().sum();
        assert_eq!(total.get(), RustDecimal::MAX);
        assert_eq!((huge * huge).get(), RustDecimal::MAX);
        assert_eq!((Decimal::zero() - huge - huge).get(), RustDecimal::MIN);
        assert_eq!(
            d("10").percent_of(huge * huge),
            Decimal::new(RustDecimal::MAX / RustDecimal::ONE_HUNDRED)
        );
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let huge = d("50000000000000000000000000000");
        assert_eq!(huge.checked_add(huge), Err(AmountOverflow));
        assert_eq!(huge.checked_mul(d("2")), Err(AmountOverflow));
        assert_eq!(d("1.5").checked_mul(d("2")), Ok(d("3")));
        assert_eq!(d("1").checked_sub(d("3")), Ok(d("-2")));
    }

    #[test]
    fn test_amount_limit() {
        assert!(Decimal::max_amount().is_within_limit());
        assert!(d("-1000000000000000").is_within_limit());
        assert!(!d("1000000000000000.01").is_within_limit());
        assert!(!d("100000000000000000000").is_within_limit());
    }

    #[test]
    fn test_text_adapter_keeps_every_digit() {
        #[derive(Serialize, Deserialize)]
        struct Stored {
            #[serde(with = "text")]
            price: Decimal,
        }

        let price = d("12345678901234567.89");
        let json = serde_json::to_string(&Stored { price }).unwrap();
        assert_eq!(json, r#"{"price":"12345678901234567.89"}"#);
        let back: Stored = serde_json::from_str(&json).unwrap();
        assert_eq!(back.price, price);

        let legacy: Stored = serde_json::from_str(r#"{"price":12.5}"#).unwrap();
        assert_eq!(legacy.price, d("12.5"));
    }
}
