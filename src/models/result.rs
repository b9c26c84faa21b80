//! Pricing result models.
//!
//! This module contains the [`PricingResult`] type and its associated
//! structures that capture all outputs of a calculation: per-country
//! breakdowns, additional-service costs, discount lines, and the total.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::country::CountryCode;
use crate::models::money::{CurrencyCode, Money};

/// A single rule's contribution to a country's subtotal.
///
/// The ordered adjustment list doubles as the per-rule trace used by the
/// `Explain` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAdjustment {
    /// The rule that produced this adjustment.
    pub rule_id: String,
    /// The monetary delta (may be negative).
    pub delta: Money,
    /// Human-readable description of the adjustment.
    pub description: String,
}

/// The calculation breakdown for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCalculationResult {
    /// The country this breakdown belongs to.
    pub country_code: CountryCode,
    /// The volume-scaled base cost before rule adjustments.
    pub base_cost: Money,
    /// Rule adjustments in evaluation order.
    pub rule_adjustments: Vec<RuleAdjustment>,
    /// Base cost plus all adjustments.
    pub subtotal: Money,
}

/// A discount applied against the pre-discount total.
///
/// Discounts are stored as negative amounts so the result total is a
/// plain sum over all line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountLine {
    /// The discount name (e.g. "multi_country").
    pub name: String,
    /// The negative discount amount.
    pub amount: Money,
}

/// The complete, immutable result of one pricing calculation.
///
/// Constructed only through [`PricingResult::new`], which enforces that
/// every component shares the result currency and computes the total as
/// the exact sum of its parts. A `PricingResult` is a value object, safe
/// to cache and share across readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// The grand total: country subtotals + additional services + discounts.
    pub total_cost: Money,
    /// Per-country breakdowns, keyed by ascending country code.
    pub country_results: BTreeMap<CountryCode, CountryCalculationResult>,
    /// Additional-service costs, charged once per request.
    pub additional_service_costs: BTreeMap<String, Money>,
    /// Discount lines (negative amounts) in application order.
    pub discounts: Vec<DiscountLine>,
    /// The currency every amount in this result is denominated in.
    pub currency: CurrencyCode,
    /// The rule-snapshot version the calculation ran against.
    pub rule_set_version: String,
    /// When the calculation was performed.
    pub computed_at: DateTime<Utc>,
}

impl PricingResult {
    /// Assembles a result, verifying currency consistency and computing
    /// the total.
    ///
    /// Fails with `CurrencyMismatch` if any country subtotal, adjustment,
    /// additional-service cost, or discount is denominated in a currency
    /// other than `currency`. The returned total is the exact sum of all
    /// line items, so the conservation property holds by construction.
    pub fn new(
        currency: CurrencyCode,
        country_results: BTreeMap<CountryCode, CountryCalculationResult>,
        additional_service_costs: BTreeMap<String, Money>,
        discounts: Vec<DiscountLine>,
        rule_set_version: impl Into<String>,
    ) -> EngineResult<Self> {
        let mut total = Money::zero(currency.clone());

        for country in country_results.values() {
            total.ensure_same_currency(&country.base_cost)?;
            for adjustment in &country.rule_adjustments {
                total.ensure_same_currency(&adjustment.delta)?;
            }
            total = total.add(&country.subtotal)?;
        }
        for cost in additional_service_costs.values() {
            total = total.add(cost)?;
        }
        for discount in &discounts {
            total = total.add(&discount.amount)?;
        }

        Ok(Self {
            total_cost: total,
            country_results,
            additional_service_costs,
            discounts,
            currency,
            rule_set_version: rule_set_version.into(),
            computed_at: Utc::now(),
        })
    }

    /// Returns the display form of this result: every amount rounded
    /// half-up to two decimal places.
    ///
    /// Each line item is rounded individually and the subtotals and total
    /// are re-derived from the rounded parts, so the displayed total is
    /// still the exact sum of the displayed lines. Full precision lives
    /// only in the unrounded result; this is the single rounding boundary.
    pub fn rounded(&self) -> Self {
        let mut total = Decimal::ZERO;

        let country_results: BTreeMap<_, _> = self
            .country_results
            .iter()
            .map(|(code, country)| {
                let rule_adjustments: Vec<RuleAdjustment> = country
                    .rule_adjustments
                    .iter()
                    .map(|adjustment| RuleAdjustment {
                        rule_id: adjustment.rule_id.clone(),
                        delta: adjustment.delta.rounded(),
                        description: adjustment.description.clone(),
                    })
                    .collect();
                let base_cost = country.base_cost.rounded();
                let subtotal_amount = base_cost.amount()
                    + rule_adjustments
                        .iter()
                        .map(|adjustment| adjustment.delta.amount())
                        .sum::<Decimal>();
                total += subtotal_amount;
                (
                    code.clone(),
                    CountryCalculationResult {
                        country_code: country.country_code.clone(),
                        base_cost,
                        rule_adjustments,
                        subtotal: Money::new(subtotal_amount, self.currency.clone()),
                    },
                )
            })
            .collect();

        let additional_service_costs: BTreeMap<String, Money> = self
            .additional_service_costs
            .iter()
            .map(|(id, cost)| {
                let rounded = cost.rounded();
                total += rounded.amount();
                (id.clone(), rounded)
            })
            .collect();

        let discounts: Vec<DiscountLine> = self
            .discounts
            .iter()
            .map(|discount| {
                let amount = discount.amount.rounded();
                total += amount.amount();
                DiscountLine {
                    name: discount.name.clone(),
                    amount,
                }
            })
            .collect();

        Self {
            total_cost: Money::new(total, self.currency.clone()),
            country_results,
            additional_service_costs,
            discounts,
            currency: self.currency.clone(),
            rule_set_version: self.rule_set_version.clone(),
            computed_at: self.computed_at,
        }
    }
}
