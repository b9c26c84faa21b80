//! Error types for the Pricing Calculation Core.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during a pricing calculation.

use std::fmt;

use thiserror::Error;

/// The kind of entity a dangling reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A country code that could not be resolved.
    Country,
    /// A filing service id that could not be resolved.
    Service,
    /// An additional-service id that could not be resolved.
    AdditionalService,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Country => write!(f, "country"),
            ReferenceKind::Service => write!(f, "service"),
            ReferenceKind::AdditionalService => write!(f, "additional_service"),
        }
    }
}

/// The main error type for the Pricing Calculation Core.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use pricing_engine::error::{EngineError, ReferenceKind};
///
/// let error = EngineError::UnknownReference {
///     kind: ReferenceKind::Country,
///     id: "XX".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown country reference: XX");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Invalid configuration '{path}': {message}")]
    ConfigParse {
        /// The path to the file that failed.
        path: String,
        /// A description of the parse or validation error.
        message: String,
    },

    /// A request field was missing, malformed, or unsupported.
    #[error("Invalid request field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A referenced entity does not exist in its repository.
    #[error("Unknown {kind} reference: {id}")]
    UnknownReference {
        /// What kind of entity the id was supposed to name.
        kind: ReferenceKind,
        /// The dangling id.
        id: String,
    },

    /// Arithmetic was attempted between two different currencies.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// The currency the operation expected.
        expected: String,
        /// The currency actually encountered.
        found: String,
    },

    /// A rule expression could not be parsed.
    #[error("Failed to parse expression '{expression}': {message}")]
    ExpressionParse {
        /// The expression source text.
        expression: String,
        /// A description of the syntax error.
        message: String,
    },

    /// An expression referenced a parameter that was not bound.
    #[error("Unbound parameter: {name}")]
    UnboundParameter {
        /// The name of the missing parameter.
        name: String,
    },

    /// An expression divided by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// A rule condition compared incompatible value types.
    #[error("Type mismatch on parameter '{parameter}': {message}")]
    TypeMismatch {
        /// The condition parameter that was compared.
        parameter: String,
        /// A description of the incompatibility.
        message: String,
    },

    /// Evaluation of a rule failed; wraps the underlying cause with the
    /// rule id so administrators can locate the broken rule content.
    #[error("Rule '{rule_id}' failed to evaluate: {cause}")]
    RuleExpression {
        /// The id of the rule whose evaluation failed.
        rule_id: String,
        /// The underlying failure.
        #[source]
        cause: Box<EngineError>,
    },
}

impl EngineError {
    /// Wraps this error with the id of the rule that triggered it.
    pub fn for_rule(self, rule_id: impl Into<String>) -> Self {
        EngineError::RuleExpression {
            rule_id: rule_id.into(),
            cause: Box::new(self),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/pricing.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/pricing.yaml"
        );
    }

    #[test]
    fn test_unknown_reference_displays_kind_and_id() {
        let error = EngineError::UnknownReference {
            kind: ReferenceKind::Country,
            id: "XX".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown country reference: XX");
    }

    #[test]
    fn test_unknown_additional_service_kind() {
        let error = EngineError::UnknownReference {
            kind: ReferenceKind::AdditionalService,
            id: "srv_99".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unknown additional_service reference: srv_99"
        );
    }

    #[test]
    fn test_currency_mismatch_displays_both_currencies() {
        let error = EngineError::CurrencyMismatch {
            expected: "EUR".to_string(),
            found: "GBP".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Currency mismatch: expected EUR, found GBP"
        );
    }

    #[test]
    fn test_rule_expression_wraps_cause() {
        let error = EngineError::DivisionByZero.for_rule("de_vat_standard");
        assert_eq!(
            error.to_string(),
            "Rule 'de_vat_standard' failed to evaluate: Division by zero"
        );
        match error {
            EngineError::RuleExpression { rule_id, cause } => {
                assert_eq!(rule_id, "de_vat_standard");
                assert!(matches!(*cause, EngineError::DivisionByZero));
            }
            other => panic!("Expected RuleExpression, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_parameter_displays_name() {
        let error = EngineError::UnboundParameter {
            name: "basePrice".to_string(),
        };
        assert_eq!(error.to_string(), "Unbound parameter: basePrice");
    }

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::Validation {
            field: "country_codes".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid request field 'country_codes': must not be empty"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_division_by_zero() -> EngineResult<()> {
            Err(EngineError::DivisionByZero)
        }

        fn propagates_error() -> EngineResult<()> {
            returns_division_by_zero()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
