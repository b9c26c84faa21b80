//! Country model and related value types.
//!
//! Countries are loaded read-only from the country repository per
//! calculation and never mutated by the core.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::money::CurrencyCode;

/// An ISO 3166-1 alpha-2 country code (two ASCII uppercase letters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a country code, validating the two-uppercase-letter shape.
    pub fn new(code: impl Into<String>) -> EngineResult<Self> {
        let code = code.into();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(EngineError::Validation {
                field: "country_code".to_string(),
                message: format!("'{}' is not a valid ISO 3166-1 alpha-2 code", code),
            })
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A VAT rate expressed as a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// Creates a VAT rate, rejecting percentages outside `[0, 100]`.
    pub fn new(percentage: Decimal) -> EngineResult<Self> {
        if percentage >= Decimal::ZERO && percentage <= Decimal::ONE_HUNDRED {
            Ok(Self(percentage))
        } else {
            Err(EngineError::Validation {
                field: "vat_rate".to_string(),
                message: format!("{} is outside [0, 100]", percentage),
            })
        }
    }

    /// Returns the percentage.
    pub fn percentage(&self) -> Decimal {
        self.0
    }
}

/// How often filings are submitted for a country.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilingFrequency {
    /// Twelve filings per year.
    Monthly,
    /// Four filings per year.
    Quarterly,
    /// One filing per year.
    Annually,
}

impl FilingFrequency {
    /// Returns the number of filings per year, for expression bindings.
    pub fn filings_per_year(&self) -> Decimal {
        match self {
            FilingFrequency::Monthly => Decimal::from(12),
            FilingFrequency::Quarterly => Decimal::from(4),
            FilingFrequency::Annually => Decimal::ONE,
        }
    }

    /// Returns the canonical name used in rule conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingFrequency::Monthly => "Monthly",
            FilingFrequency::Quarterly => "Quarterly",
            FilingFrequency::Annually => "Annually",
        }
    }
}

impl fmt::Display for FilingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A country supported by the filing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// The ISO country code.
    pub code: CountryCode,
    /// The human-readable country name.
    pub name: String,
    /// The standard VAT rate for this country.
    pub standard_vat_rate: VatRate,
    /// The country's local currency.
    pub currency: CurrencyCode,
    /// The filing frequencies this country supports.
    pub supported_filing_frequencies: BTreeSet<FilingFrequency>,
    /// Whether the country is currently open for new filings.
    pub is_active: bool,
}

impl Country {
    /// Returns true if this country supports the given filing frequency.
    pub fn supports_frequency(&self, frequency: FilingFrequency) -> bool {
        self.supported_filing_frequencies.contains(&frequency)
    }
}
