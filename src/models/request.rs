//! The pricing request model.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::country::{CountryCode, FilingFrequency};
use crate::models::money::CurrencyCode;

/// A request for a cost estimate.
///
/// Immutable once constructed. The country and additional-service sets are
/// `BTreeSet`s, so their iteration order is the normalized ascending order
/// used for deterministic output and cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    /// The countries to file in; must be non-empty.
    pub country_codes: BTreeSet<CountryCode>,
    /// The filing service being priced.
    pub service_id: String,
    /// Number of transactions (invoices) per filing period.
    pub transaction_volume: u32,
    /// How often filings are submitted.
    pub filing_frequency: FilingFrequency,
    /// Optional add-on services.
    #[serde(default)]
    pub additional_service_ids: BTreeSet<String>,
    /// The date the estimate is valid for; selects which rules are in force.
    pub as_of_date: NaiveDate,
    /// The currency of the estimate. Conversion from country-local
    /// currencies is an upstream collaborator concern.
    pub currency: CurrencyCode,
}

impl PricingRequest {
    /// Structural validation that needs no repository access.
    ///
    /// Repository-backed checks (country/service resolution, frequency
    /// support) happen in the pricing engine.
    pub fn validate(&self) -> EngineResult<()> {
        if self.country_codes.is_empty() {
            return Err(EngineError::Validation {
                field: "country_codes".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.service_id.is_empty() {
            return Err(EngineError::Validation {
                field: "service_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
