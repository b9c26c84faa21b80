//! Domain models for the Pricing Calculation Core.
//!
//! This module contains the immutable value types (money, country codes,
//! VAT rates), the rule model and its snapshots, the request type, and the
//! result types produced by a calculation.

mod country;
mod money;
mod request;
mod result;
mod rule;
mod service;

pub use country::{Country, CountryCode, FilingFrequency, VatRate};
pub use money::{CurrencyCode, Money};
pub use request::PricingRequest;
pub use result::{CountryCalculationResult, DiscountLine, PricingResult, RuleAdjustment};
pub use rule::{
    ConditionOperator, ParameterValue, Rule, RuleCondition, RuleSnapshot, RuleType,
};
pub use service::{AdditionalService, FilingService};
