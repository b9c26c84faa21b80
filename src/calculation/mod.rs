//! Calculation logic for the Pricing Calculation Core.
//!
//! This module contains the calculation building blocks: volume-tier
//! scaling of the base price, per-country rule evaluation,
//! additional-service resolution, discount computation, and the
//! [`PricingEngine`] that orchestrates a full calculation.

mod additional_services;
mod discounts;
mod pricing;
mod rule_engine;
mod volume_tier;

pub use additional_services::{AdditionalServiceCosts, resolve_additional_services};
pub use discounts::{
    MULTI_COUNTRY_DISCOUNT_NAME, VOLUME_DISCOUNT_NAME, compute_discounts,
};
pub use pricing::PricingEngine;
pub use rule_engine::{CountryRuleOutcome, RuleParameters, evaluate_country_rules};
pub use volume_tier::{VolumeScaledBase, scale_base_price};
