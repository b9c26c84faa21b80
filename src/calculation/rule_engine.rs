//! Per-country rule selection, ordering, and evaluation.
//!
//! For one country and one immutable [`RuleSnapshot`], this module filters
//! the rules in force at the request date, drops rules whose conditions do
//! not hold, orders the survivors deterministically, and evaluates their
//! expressions in sequence. Each rule's numeric output is published into
//! the bindings under its rule id, so later rules can reference earlier
//! outputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::expression::{Bindings, ExpressionEvaluator};
use crate::models::{
    Country, FilingFrequency, Money, ParameterValue, Rule, RuleAdjustment, RuleSnapshot, RuleType,
};

/// The request parameters bound for rule evaluation in one country.
#[derive(Debug, Clone)]
pub struct RuleParameters {
    /// The volume-scaled base price.
    pub base_price: Money,
    /// Transactions per filing period.
    pub transaction_volume: u32,
    /// Filing frequency of the request.
    pub filing_frequency: FilingFrequency,
    /// The service type name, for rule conditions.
    pub service_type: String,
    /// The service's complexity level.
    pub complexity_level: u8,
    /// This country's share of the request's additional-service costs;
    /// `Complexity` rules scale it.
    pub additional_service_share: Money,
    /// The date rules must be in force on.
    pub as_of_date: NaiveDate,
}

impl RuleParameters {
    /// Parameter values visible to rule conditions.
    fn condition_values(&self) -> HashMap<String, ParameterValue> {
        let mut values = HashMap::new();
        values.insert(
            "serviceType".to_string(),
            ParameterValue::Text(self.service_type.clone()),
        );
        values.insert(
            "filingFrequency".to_string(),
            ParameterValue::Text(self.filing_frequency.as_str().to_string()),
        );
        values.insert(
            "transactionVolume".to_string(),
            ParameterValue::Number(Decimal::from(self.transaction_volume)),
        );
        values.insert(
            "basePrice".to_string(),
            ParameterValue::Number(self.base_price.amount()),
        );
        values.insert(
            "complexityLevel".to_string(),
            ParameterValue::Number(Decimal::from(self.complexity_level)),
        );
        values
    }

    /// Initial numeric bindings for rule expressions.
    fn expression_bindings(&self, country: &Country) -> Bindings {
        let mut bindings = Bindings::new();
        bindings.insert("basePrice".to_string(), self.base_price.amount());
        bindings.insert(
            "transactionVolume".to_string(),
            Decimal::from(self.transaction_volume),
        );
        bindings.insert(
            "filingsPerYear".to_string(),
            self.filing_frequency.filings_per_year(),
        );
        bindings.insert(
            "complexityLevel".to_string(),
            Decimal::from(self.complexity_level),
        );
        bindings.insert(
            "vatRate".to_string(),
            country.standard_vat_rate.percentage(),
        );
        bindings.insert(
            "additionalServiceShare".to_string(),
            self.additional_service_share.amount(),
        );
        bindings
    }
}

/// The outcome of evaluating one country's rules.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRuleOutcome {
    /// Adjustments in evaluation order; this is the per-rule trace.
    pub adjustments: Vec<RuleAdjustment>,
    /// The volume-scaled base price plus all adjustments.
    pub subtotal: Money,
    /// The combined multiplier of every `Complexity` rule that fired
    /// (their product), `1` when none did.
    pub complexity_multiplier: Decimal,
}

/// Evaluates the rules applicable to one country.
///
/// Rules are ordered by `priority` ascending, then by the canonical
/// [`RuleType`] order (Rate, Threshold, Complexity, SpecialRequirement),
/// then by rule id. Rate, Threshold, and SpecialRequirement outputs are
/// monetary deltas; Complexity outputs are multipliers on this country's
/// additional-service share and compose as a product when several fire.
/// The combined surcharge is `(product - 1) x share`, spread across the
/// trace as incremental deltas so the adjustment list still sums to it.
/// Any evaluation failure aborts the country's calculation with
/// `RuleExpression`; a broken rule is never silently skipped.
pub fn evaluate_country_rules(
    country: &Country,
    snapshot: &RuleSnapshot,
    params: &RuleParameters,
    evaluator: &ExpressionEvaluator,
) -> EngineResult<CountryRuleOutcome> {
    let condition_values = params.condition_values();

    let mut applicable: Vec<&Rule> = Vec::new();
    for rule in snapshot.rules() {
        if rule.country_code != country.code || !rule.in_force(params.as_of_date) {
            continue;
        }
        if rule_applies(rule, &condition_values)? {
            applicable.push(rule);
        }
    }

    applicable.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.rule_type.cmp(&b.rule_type))
            .then(a.id.cmp(&b.id))
    });

    let mut bindings = params.expression_bindings(country);
    let mut adjustments = Vec::with_capacity(applicable.len());
    let mut subtotal = params.base_price.clone();
    let mut complexity_multiplier = Decimal::ONE;

    for rule in applicable {
        for name in &rule.parameters {
            if !bindings.contains_key(name) {
                return Err(
                    EngineError::UnboundParameter { name: name.clone() }.for_rule(&rule.id)
                );
            }
        }

        let output = evaluator
            .evaluate(&rule.expression, &bindings)
            .map_err(|e| e.for_rule(&rule.id))?;
        bindings.insert(rule.id.clone(), output);

        let delta = match rule.rule_type {
            RuleType::Complexity => {
                // The delta is the increment the running product gains
                // from this rule, so the trace sums to (product - 1) x share.
                let delta = params
                    .additional_service_share
                    .mul(complexity_multiplier * (output - Decimal::ONE));
                complexity_multiplier *= output;
                delta
            }
            _ => Money::new(output, params.base_price.currency().clone()),
        };

        subtotal = subtotal.add(&delta)?;
        adjustments.push(RuleAdjustment {
            rule_id: rule.id.clone(),
            delta,
            description: rule.description.clone(),
        });
    }

    Ok(CountryRuleOutcome {
        adjustments,
        subtotal,
        complexity_multiplier,
    })
}

/// Returns true if all of the rule's conditions hold.
///
/// A condition referencing an unknown parameter is broken rule content
/// and fails the calculation; a condition that merely does not hold
/// skips the rule.
fn rule_applies(
    rule: &Rule,
    condition_values: &HashMap<String, ParameterValue>,
) -> EngineResult<bool> {
    for condition in &rule.conditions {
        let bound = condition_values.get(&condition.parameter).ok_or_else(|| {
            EngineError::UnboundParameter {
                name: condition.parameter.clone(),
            }
            .for_rule(&rule.id)
        })?;
        if !condition.matches(bound).map_err(|e| e.for_rule(&rule.id))? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConditionOperator, CountryCode, CurrencyCode, RuleCondition, VatRate,
    };
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn eur(s: &str) -> Money {
        Money::new(dec(s), CurrencyCode::new("EUR").unwrap())
    }

    fn create_test_country(code: &str) -> Country {
        Country {
            code: CountryCode::new(code).unwrap(),
            name: code.to_string(),
            standard_vat_rate: VatRate::new(dec("19")).unwrap(),
            currency: CurrencyCode::new("EUR").unwrap(),
            supported_filing_frequencies: [FilingFrequency::Monthly].into_iter().collect(),
            is_active: true,
        }
    }

    fn create_test_rule(id: &str, country: &str, rule_type: RuleType, expression: &str) -> Rule {
        Rule {
            id: id.to_string(),
            country_code: CountryCode::new(country).unwrap(),
            rule_type,
            expression: expression.to_string(),
            parameters: vec![],
            conditions: vec![],
            effective_from: date("2023-01-01"),
            effective_to: None,
            priority: 10,
            is_active: true,
            description: format!("rule {id}"),
        }
    }

    fn create_test_params(base: &str) -> RuleParameters {
        RuleParameters {
            base_price: eur(base),
            transaction_volume: 150,
            filing_frequency: FilingFrequency::Monthly,
            service_type: "StandardFiling".to_string(),
            complexity_level: 2,
            additional_service_share: eur("0"),
            as_of_date: date("2024-03-01"),
        }
    }

    fn snapshot(rules: Vec<Rule>) -> RuleSnapshot {
        RuleSnapshot::new("v1", rules).unwrap()
    }

    /// The concrete DE scenario: base 1000, VAT rule adds 190.
    #[test]
    fn test_standard_vat_rule() {
        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![create_test_rule(
                "de_vat_standard",
                "DE",
                RuleType::Rate,
                "basePrice * 0.19",
            )]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert_eq!(outcome.adjustments.len(), 1);
        assert_eq!(outcome.adjustments[0].rule_id, "de_vat_standard");
        assert_eq!(outcome.adjustments[0].delta, eur("190.00"));
        assert_eq!(outcome.subtotal, eur("1190.00"));
    }

    #[test]
    fn test_other_countries_rules_ignored() {
        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![create_test_rule(
                "gb_surcharge",
                "GB",
                RuleType::SpecialRequirement,
                "+50",
            )]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert!(outcome.adjustments.is_empty());
        assert_eq!(outcome.subtotal, eur("1000"));
    }

    #[test]
    fn test_expired_rule_not_applied() {
        let mut rule = create_test_rule("de_vat", "DE", RuleType::Rate, "basePrice * 0.19");
        rule.effective_from = date("2023-01-01");
        rule.effective_to = Some(date("2023-06-30"));

        let country = create_test_country("DE");
        let evaluator = ExpressionEvaluator::new();
        let snap = snapshot(vec![rule]);

        let mut in_window = create_test_params("1000");
        in_window.as_of_date = date("2023-03-01");
        let outcome = evaluate_country_rules(&country, &snap, &in_window, &evaluator).unwrap();
        assert_eq!(outcome.adjustments.len(), 1);

        let mut after_window = create_test_params("1000");
        after_window.as_of_date = date("2023-07-01");
        let outcome = evaluate_country_rules(&country, &snap, &after_window, &evaluator).unwrap();
        assert!(outcome.adjustments.is_empty());
    }

    #[test]
    fn test_unmatched_condition_skips_rule_silently() {
        let mut rule = create_test_rule("de_express", "DE", RuleType::Rate, "basePrice * 0.05");
        rule.conditions.push(RuleCondition {
            parameter: "serviceType".to_string(),
            operator: ConditionOperator::Eq,
            value: ParameterValue::Text("ExpressFiling".to_string()),
        });

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert!(outcome.adjustments.is_empty());
        assert_eq!(outcome.subtotal, eur("1000"));
    }

    #[test]
    fn test_matched_condition_applies_rule() {
        let mut rule = create_test_rule("de_bulk", "DE", RuleType::Threshold, "25");
        rule.conditions.push(RuleCondition {
            parameter: "transactionVolume".to_string(),
            operator: ConditionOperator::Ge,
            value: ParameterValue::Number(dec("100")),
        });

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert_eq!(outcome.subtotal, eur("1025"));
    }

    #[test]
    fn test_priority_orders_evaluation() {
        let mut early = create_test_rule("b_first", "DE", RuleType::SpecialRequirement, "10");
        early.priority = 1;
        let mut late = create_test_rule("a_second", "DE", RuleType::Rate, "20");
        late.priority = 5;

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![late, early]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        let order: Vec<&str> = outcome
            .adjustments
            .iter()
            .map(|a| a.rule_id.as_str())
            .collect();
        assert_eq!(order, vec!["b_first", "a_second"]);
    }

    /// Equal priority: canonical type order decides, and a Threshold rule
    /// can read the Rate rule's output under its rule id.
    #[test]
    fn test_equal_priority_tie_break_is_canonical_type_order() {
        let rate = create_test_rule("de_vat", "DE", RuleType::Rate, "basePrice * 0.19");
        let threshold = create_test_rule(
            "de_cap",
            "DE",
            RuleType::Threshold,
            "de_vat * 0.1",
        );

        // Same priority; insert the Threshold rule first to prove sorting
        // is what decides, not input order.
        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![threshold, rate]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        let order: Vec<&str> = outcome
            .adjustments
            .iter()
            .map(|a| a.rule_id.as_str())
            .collect();
        assert_eq!(order, vec!["de_vat", "de_cap"]);
        assert_eq!(outcome.adjustments[1].delta, eur("19.000"));
        assert_eq!(outcome.subtotal, eur("1209.000"));
    }

    #[test]
    fn test_equal_priority_same_type_breaks_tie_by_id() {
        let a = create_test_rule("de_a", "DE", RuleType::Rate, "1");
        let b = create_test_rule("de_b", "DE", RuleType::Rate, "2");

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![b, a]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        let order: Vec<&str> = outcome
            .adjustments
            .iter()
            .map(|a| a.rule_id.as_str())
            .collect();
        assert_eq!(order, vec!["de_a", "de_b"]);
    }

    #[test]
    fn test_complexity_rule_scales_additional_share() {
        let rule = create_test_rule("de_complex", "DE", RuleType::Complexity, "1.5");
        let mut params = create_test_params("1000");
        params.additional_service_share = eur("120");

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &params,
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        // (1.5 - 1) * 120 = 60 surcharge on top of the nominal share.
        assert_eq!(outcome.adjustments[0].delta, eur("60.0"));
        assert_eq!(outcome.subtotal, eur("1060.0"));
        assert_eq!(outcome.complexity_multiplier, dec("1.5"));
    }

    /// Several Complexity rules combine as a product, not a sum of
    /// independent surcharges.
    #[test]
    fn test_multiple_complexity_rules_compose_as_product() {
        let double = create_test_rule("de_complex_a", "DE", RuleType::Complexity, "2");
        let triple = create_test_rule("de_complex_b", "DE", RuleType::Complexity, "3");
        let mut params = create_test_params("1000");
        params.additional_service_share = eur("100");

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![triple, double]),
            &params,
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        // Combined multiplier 6: total surcharge (6 - 1) * 100 = 500,
        // traced as incremental deltas 100 and 400.
        assert_eq!(outcome.complexity_multiplier, dec("6"));
        assert_eq!(outcome.adjustments[0].delta, eur("100"));
        assert_eq!(outcome.adjustments[1].delta, eur("400"));
        assert_eq!(outcome.subtotal, eur("1500"));
    }

    #[test]
    fn test_no_complexity_rules_leaves_multiplier_at_one() {
        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![create_test_rule(
                "de_vat",
                "DE",
                RuleType::Rate,
                "basePrice * 0.19",
            )]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert_eq!(outcome.complexity_multiplier, Decimal::ONE);
    }

    #[test]
    fn test_unknown_expression_parameter_aborts_country() {
        let rule = create_test_rule("de_broken", "DE", RuleType::Rate, "nonexistent * 2");

        let result = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        );

        match result.unwrap_err() {
            EngineError::RuleExpression { rule_id, cause } => {
                assert_eq!(rule_id, "de_broken");
                assert!(matches!(
                    *cause,
                    EngineError::UnboundParameter { .. }
                ));
            }
            other => panic!("Expected RuleExpression, got {:?}", other),
        }
    }

    #[test]
    fn test_division_by_zero_aborts_country() {
        let rule = create_test_rule("de_div", "DE", RuleType::Rate, "basePrice / 0");

        let result = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        );

        assert!(matches!(
            result.unwrap_err(),
            EngineError::RuleExpression { .. }
        ));
    }

    #[test]
    fn test_declared_parameter_must_be_bound() {
        let mut rule = create_test_rule("de_declared", "DE", RuleType::Rate, "10");
        rule.parameters.push("notBound".to_string());

        let result = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        );

        assert!(matches!(
            result.unwrap_err(),
            EngineError::RuleExpression { .. }
        ));
    }

    #[test]
    fn test_condition_on_unknown_parameter_is_an_error() {
        let mut rule = create_test_rule("de_cond", "DE", RuleType::Rate, "10");
        rule.conditions.push(RuleCondition {
            parameter: "noSuchParameter".to_string(),
            operator: ConditionOperator::Eq,
            value: ParameterValue::Number(dec("1")),
        });

        let result = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        );

        assert!(matches!(
            result.unwrap_err(),
            EngineError::RuleExpression { .. }
        ));
    }

    #[test]
    fn test_vat_rate_binding_available() {
        let rule = create_test_rule("de_vat_param", "DE", RuleType::Rate, "basePrice * vatRate / 100");

        let outcome = evaluate_country_rules(
            &create_test_country("DE"),
            &snapshot(vec![rule]),
            &create_test_params("1000"),
            &ExpressionEvaluator::new(),
        )
        .unwrap();

        assert_eq!(outcome.subtotal, eur("1190"));
    }
}
