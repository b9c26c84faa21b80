//! Request types for the pricing API.
//!
//! This module defines the JSON request structure for the `/calculate`
//! and `/explain` endpoints and its conversion into the domain request.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{CountryCode, CurrencyCode, FilingFrequency, PricingRequest};

/// Request body for the `/calculate` and `/explain` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// ISO country codes to file in.
    pub country_codes: Vec<String>,
    /// The filing service to price.
    pub service_id: String,
    /// Transactions (invoices) per filing period.
    pub transaction_volume: u32,
    /// How often filings are submitted.
    pub filing_frequency: FilingFrequency,
    /// Optional add-on service ids.
    #[serde(default)]
    pub additional_service_ids: Vec<String>,
    /// The date the estimate is valid for; defaults to today.
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
    /// The ISO 4217 currency of the estimate.
    pub currency: String,
}

impl TryFrom<CalculationRequest> for PricingRequest {
    type Error = crate::error::EngineError;

    fn try_from(request: CalculationRequest) -> EngineResult<PricingRequest> {
        let country_codes = request
            .country_codes
            .into_iter()
            .map(CountryCode::new)
            .collect::<EngineResult<_>>()?;

        Ok(PricingRequest {
            country_codes,
            service_id: request.service_id,
            transaction_volume: request.transaction_volume,
            filing_frequency: request.filing_frequency,
            additional_service_ids: request.additional_service_ids.into_iter().collect(),
            as_of_date: request
                .as_of_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            currency: CurrencyCode::new(request.currency)?,
        })
    }
}
