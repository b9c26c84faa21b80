//! The pricing engine: orchestration of a full calculation.
//!
//! `Calculate` validates the request, freezes one rule snapshot, scales
//! the base price by volume tier, evaluates each country's rules, adds
//! additional services, applies discounts, and assembles the result.
//! Either a complete, internally consistent [`PricingResult`] is produced
//! or an error is returned; there are no partial results.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::cache::{CacheKey, ResultCache};
use crate::calculation::additional_services::resolve_additional_services;
use crate::calculation::rule_engine::{RuleParameters, evaluate_country_rules};
use crate::calculation::volume_tier::scale_base_price;
use crate::config::PricingConfig;
use crate::error::{EngineError, EngineResult};
use crate::expression::ExpressionEvaluator;
use crate::models::{
    Country, CountryCalculationResult, CountryCode, FilingService, Money, PricingRequest,
    PricingResult,
};
use crate::repository::{
    AdditionalServiceRepository, CountryRepository, RuleRepository, ServiceRepository,
};

use super::discounts::compute_discounts;

/// The pricing calculation engine.
///
/// Stateless between calls apart from its expression parse cache and the
/// optional result cache, both of which are safe for concurrent use.
pub struct PricingEngine {
    countries: Arc<dyn CountryRepository>,
    services: Arc<dyn ServiceRepository>,
    additional_services: Arc<dyn AdditionalServiceRepository>,
    rules: Arc<dyn RuleRepository>,
    config: PricingConfig,
    evaluator: ExpressionEvaluator,
    cache: Option<ResultCache>,
}

impl PricingEngine {
    /// Creates an engine without a result cache (always computes).
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        services: Arc<dyn ServiceRepository>,
        additional_services: Arc<dyn AdditionalServiceRepository>,
        rules: Arc<dyn RuleRepository>,
        config: PricingConfig,
    ) -> Self {
        Self {
            countries,
            services,
            additional_services,
            rules,
            config,
            evaluator: ExpressionEvaluator::new(),
            cache: None,
        }
    }

    /// Attaches a result cache.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the attached result cache, if any.
    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    /// Calculates a complete cost estimate for the request.
    pub fn calculate(&self, request: &PricingRequest) -> EngineResult<PricingResult> {
        self.run(request, true)
    }

    /// Recomputes the estimate, bypassing the result cache, so the
    /// per-rule adjustment trace reflects the live rule set. The result
    /// is otherwise identical to [`calculate`](Self::calculate).
    pub fn explain(&self, request: &PricingRequest) -> EngineResult<PricingResult> {
        self.run(request, false)
    }

    fn run(&self, request: &PricingRequest, use_cache: bool) -> EngineResult<PricingResult> {
        request.validate()?;

        let countries = self.resolve_countries(request)?;
        let service = self.resolve_service(request)?;

        // One snapshot for the whole calculation; concurrent rule edits
        // cannot affect an in-flight request.
        let snapshot = self
            .rules
            .snapshot(&request.country_codes, request.as_of_date)?;

        let key = CacheKey::for_request(request, snapshot.version());
        if use_cache {
            if let Some(cache) = &self.cache {
                if let Some(hit) = cache.get(&key) {
                    debug!(version = snapshot.version(), "result cache hit");
                    return Ok((*hit).clone());
                }
            }
        }

        let additional = resolve_additional_services(
            &request.additional_service_ids,
            self.additional_services.as_ref(),
            &request.currency,
        )?;
        let country_count = countries.len();
        let additional_share = additional
            .total
            .mul(Decimal::ONE / Decimal::from(country_count as u64));

        let scaled = scale_base_price(&service, request.transaction_volume, &self.config);

        let mut country_results = BTreeMap::new();
        let mut subtotal_sum = Money::zero(request.currency.clone());
        for (code, country) in &countries {
            let params = RuleParameters {
                base_price: scaled.price.clone(),
                transaction_volume: request.transaction_volume,
                filing_frequency: request.filing_frequency,
                service_type: service.name.clone(),
                complexity_level: service.complexity_level,
                additional_service_share: additional_share.clone(),
                as_of_date: request.as_of_date,
            };
            let outcome = evaluate_country_rules(country, &snapshot, &params, &self.evaluator)?;

            subtotal_sum = subtotal_sum.add(&outcome.subtotal)?;
            country_results.insert(
                code.clone(),
                CountryCalculationResult {
                    country_code: code.clone(),
                    base_cost: scaled.price.clone(),
                    rule_adjustments: outcome.adjustments,
                    subtotal: outcome.subtotal,
                },
            );
        }

        let pre_discount_total = subtotal_sum.add(&additional.total)?;
        let discounts = compute_discounts(
            &pre_discount_total,
            country_count,
            request.transaction_volume,
            &self.config,
        );

        let result = PricingResult::new(
            request.currency.clone(),
            country_results,
            additional.costs,
            discounts,
            snapshot.version(),
        )?;

        if use_cache {
            if let Some(cache) = &self.cache {
                cache.put(key, Arc::new(result.clone()), snapshot.version());
            }
        }

        Ok(result)
    }

    /// Resolves every requested country and checks request-level support.
    fn resolve_countries(
        &self,
        request: &PricingRequest,
    ) -> EngineResult<BTreeMap<CountryCode, Country>> {
        let mut countries = BTreeMap::new();
        for code in &request.country_codes {
            let country = self.countries.get(code, request.as_of_date)?;
            if !country.is_active {
                return Err(EngineError::Validation {
                    field: "country_codes".to_string(),
                    message: format!("country {} is not open for filings", code),
                });
            }
            if !country.supports_frequency(request.filing_frequency) {
                return Err(EngineError::Validation {
                    field: "filing_frequency".to_string(),
                    message: format!(
                        "country {} does not support {} filing",
                        code, request.filing_frequency
                    ),
                });
            }
            countries.insert(code.clone(), country);
        }
        Ok(countries)
    }

    /// Resolves the filing service and checks its price currency.
    fn resolve_service(&self, request: &PricingRequest) -> EngineResult<FilingService> {
        let service = self.services.get(&request.service_id)?;
        if service.base_price.currency() != &request.currency {
            // Currency conversion is an upstream collaborator concern;
            // the core refuses to mix currencies.
            return Err(EngineError::CurrencyMismatch {
                expected: request.currency.to_string(),
                found: service.base_price.currency().to_string(),
            });
        }
        Ok(service)
    }
}
