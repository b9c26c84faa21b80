//! Rule model and rule snapshots.
//!
//! A rule is a single country-specific pricing adjustment: a restricted
//! arithmetic expression plus applicability conditions, active over a date
//! window. Rules are versioned externally; the core only ever sees an
//! immutable [`RuleSnapshot`] frozen for the duration of one calculation.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::country::CountryCode;

/// The type of a pricing rule.
///
/// The declaration order is the canonical evaluation order used to break
/// ties between rules of equal priority (`Ord` derives from it). This
/// ordering is load-bearing for reproducibility: a `Threshold` rule may
/// read the output of a same-priority `Rate` rule, so the tie-break must
/// be total and fixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// A percentage-style adjustment (e.g. VAT on the base price).
    Rate,
    /// A volume- or amount-triggered adjustment.
    Threshold,
    /// A multiplier on the country's share of additional-service costs.
    Complexity,
    /// A country-specific surcharge or statutory requirement.
    SpecialRequirement,
}

/// Comparison operator used in rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

/// A request parameter value as seen by rule conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A numeric parameter (volumes, prices, levels).
    Number(Decimal),
    /// A textual parameter (service type, filing frequency).
    Text(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// A single applicability condition on a rule.
///
/// All of a rule's conditions must hold for the rule to apply; a rule
/// whose conditions do not hold is skipped, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// The request parameter the condition inspects.
    pub parameter: String,
    /// The comparison operator.
    pub operator: ConditionOperator,
    /// The value the parameter is compared against.
    pub value: ParameterValue,
}

impl RuleCondition {
    /// Evaluates this condition against a bound parameter value.
    ///
    /// Ordering comparisons between text values are broken rule content
    /// and fail with `TypeMismatch`, as does comparing a number against
    /// text.
    pub fn matches(&self, bound: &ParameterValue) -> EngineResult<bool> {
        match (bound, &self.value) {
            (ParameterValue::Number(a), ParameterValue::Number(b)) => Ok(match self.operator {
                ConditionOperator::Eq => a == b,
                ConditionOperator::Ne => a != b,
                ConditionOperator::Lt => a < b,
                ConditionOperator::Le => a <= b,
                ConditionOperator::Gt => a > b,
                ConditionOperator::Ge => a >= b,
            }),
            (ParameterValue::Text(a), ParameterValue::Text(b)) => match self.operator {
                ConditionOperator::Eq => Ok(a == b),
                ConditionOperator::Ne => Ok(a != b),
                _ => Err(EngineError::TypeMismatch {
                    parameter: self.parameter.clone(),
                    message: "ordering comparison on text values".to_string(),
                }),
            },
            _ => Err(EngineError::TypeMismatch {
                parameter: self.parameter.clone(),
                message: "number compared against text".to_string(),
            }),
        }
    }
}

/// A single country-specific pricing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier; also the name under which this rule's numeric
    /// output is bound for subsequent rules in the same pass.
    pub id: String,
    /// The country this rule belongs to.
    pub country_code: CountryCode,
    /// The rule type; part of the canonical evaluation order.
    pub rule_type: RuleType,
    /// The restricted arithmetic expression evaluated for this rule.
    pub expression: String,
    /// Parameter names the expression declares; each must be bound at
    /// evaluation time.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Applicability conditions; all must hold.
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    /// First date (inclusive) the rule is in force.
    pub effective_from: NaiveDate,
    /// Last date (inclusive) the rule is in force; open-ended when absent.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Evaluation priority; lower evaluates first.
    pub priority: i32,
    /// Whether the rule is enabled at all.
    pub is_active: bool,
    /// Human-readable description carried into the adjustment trace.
    pub description: String,
}

impl Rule {
    /// Returns true if this rule is in force on the given date.
    pub fn in_force(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_from <= date
            && self.effective_to.is_none_or(|to| date <= to)
    }

    /// Validates the rule's validity window.
    fn validate(&self) -> EngineResult<()> {
        if let Some(to) = self.effective_to {
            if self.effective_from > to {
                return Err(EngineError::Validation {
                    field: format!("rule '{}'", self.id),
                    message: format!(
                        "effective_from {} is after effective_to {}",
                        self.effective_from, to
                    ),
                });
            }
        }
        Ok(())
    }
}

/// An immutable, versioned set of rules frozen for one calculation.
///
/// All countries within one calculation read from the same snapshot, which
/// is what makes a calculation atomic with respect to concurrent rule
/// edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    version: String,
    rules: Vec<Rule>,
}

impl RuleSnapshot {
    /// Freezes a set of rules under a version identifier.
    ///
    /// Rejects rules whose validity window is inverted.
    pub fn new(version: impl Into<String>, rules: Vec<Rule>) -> EngineResult<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            version: version.into(),
            rules,
        })
    }

    /// Returns the snapshot version identifier.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the frozen rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}
