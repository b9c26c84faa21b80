//! Currency-safe monetary value types.
//!
//! This module defines [`CurrencyCode`] and [`Money`]. All monetary
//! arithmetic in the engine goes through `Money`, which refuses to mix
//! currencies and keeps full decimal precision until a display value is
//! explicitly requested.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An ISO 4217 currency code (three ASCII uppercase letters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, validating the three-uppercase-letter shape.
    pub fn new(code: impl Into<String>) -> EngineResult<Self> {
        let code = code.into();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(EngineError::Validation {
                field: "currency".to_string(),
                message: format!("'{}' is not a valid ISO 4217 code", code),
            })
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable monetary amount in a single currency.
///
/// Arithmetic between two `Money` values requires equal currencies and
/// fails with [`EngineError::CurrencyMismatch`] otherwise. Every operation
/// returns a new value; nothing is mutated in place.
///
/// # Example
///
/// ```
/// use pricing_engine::models::{CurrencyCode, Money};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let eur = CurrencyCode::new("EUR").unwrap();
/// let a = Money::new(Decimal::from_str("800.00").unwrap(), eur.clone());
/// let b = Money::new(Decimal::from_str("190.00").unwrap(), eur);
/// let sum = a.add(&b).unwrap();
/// assert_eq!(sum.amount(), Decimal::from_str("990.00").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount, kept at full decimal precision.
    amount: Decimal,
    /// The ISO 4217 currency of the amount.
    currency: CurrencyCode,
}

impl Money {
    /// Creates a monetary value.
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero value in the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns the amount at full precision.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Fails with `CurrencyMismatch` unless `other` shares this currency.
    pub fn ensure_same_currency(&self, other: &Money) -> EngineResult<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(EngineError::CurrencyMismatch {
                expected: self.currency.to_string(),
                found: other.currency.to_string(),
            })
        }
    }

    /// Adds two values of the same currency.
    pub fn add(&self, other: &Money) -> EngineResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency.clone()))
    }

    /// Subtracts a value of the same currency.
    pub fn sub(&self, other: &Money) -> EngineResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, self.currency.clone()))
    }

    /// Multiplies the amount by a scalar factor.
    pub fn mul(&self, factor: Decimal) -> Money {
        Money::new(self.amount * factor, self.currency.clone())
    }

    /// Returns `percentage`% of this value (e.g. `5` yields a twentieth).
    pub fn percentage(&self, percentage: Decimal) -> Money {
        Money::new(
            self.amount * percentage / Decimal::ONE_HUNDRED,
            self.currency.clone(),
        )
    }

    /// Returns the negation of this value.
    pub fn negate(&self) -> Money {
        Money::new(-self.amount, self.currency.clone())
    }

    /// Returns the display value, rounded half-up to two decimal places.
    ///
    /// Rounding happens only here, never mid-calculation, so rounding error
    /// cannot compound across rule chains.
    pub fn rounded(&self) -> Money {
        Money::new(
            self.amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            self.currency.clone(),
        )
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn eur(s: &str) -> Money {
        Money::new(dec(s), CurrencyCode::new("EUR").unwrap())
    }

    fn gbp(s: &str) -> Money {
        Money::new(dec(s), CurrencyCode::new("GBP").unwrap())
    }

    #[test]
    fn test_currency_code_accepts_uppercase_triples() {
        assert!(CurrencyCode::new("EUR").is_ok());
        assert!(CurrencyCode::new("GBP").is_ok());
        assert!(CurrencyCode::new("SEK").is_ok());
    }

    #[test]
    fn test_currency_code_rejects_invalid_shapes() {
        assert!(CurrencyCode::new("eur").is_err());
        assert!(CurrencyCode::new("EURO").is_err());
        assert!(CurrencyCode::new("E1").is_err());
        assert!(CurrencyCode::new("").is_err());
    }

    #[test]
    fn test_add_same_currency() {
        let sum = eur("800.00").add(&eur("190.00")).unwrap();
        assert_eq!(sum, eur("990.00"));
    }

    #[test]
    fn test_add_mixed_currency_fails() {
        let result = eur("800.00").add(&gbp("50.00"));
        match result.unwrap_err() {
            EngineError::CurrencyMismatch { expected, found } => {
                assert_eq!(expected, "EUR");
                assert_eq!(found, "GBP");
            }
            other => panic!("Expected CurrencyMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_sub_mixed_currency_fails() {
        assert!(eur("10.00").sub(&gbp("1.00")).is_err());
    }

    #[test]
    fn test_mul_scales_amount() {
        assert_eq!(eur("800").mul(dec("1.25")), eur("1000.00"));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(eur("2290").percentage(dec("5")).amount(), dec("114.5"));
    }

    #[test]
    fn test_negate() {
        let discount = eur("114.50").negate();
        assert!(discount.is_negative());
        assert_eq!(discount.amount(), dec("-114.50"));
    }

    #[test]
    fn test_rounded_half_up() {
        assert_eq!(eur("10.005").rounded(), eur("10.01"));
        assert_eq!(eur("10.004").rounded(), eur("10.00"));
        assert_eq!(eur("-10.005").rounded(), eur("-10.01"));
    }

    #[test]
    fn test_full_precision_retained_until_rounding() {
        let third = eur("100").mul(dec("1") / dec("3"));
        // Mid-calculation values keep all digits rust_decimal carries.
        assert_ne!(third.amount(), dec("33.33"));
        assert_eq!(third.rounded(), eur("33.33"));
    }

    #[test]
    fn test_money_serialization_round_trip() {
        let value = eur("1190.00");
        let json = serde_json::to_string(&value).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
