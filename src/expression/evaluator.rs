//! Expression evaluation with a parse-once cache.
//!
//! The same rule expression is evaluated once per rule per country per
//! request, so [`ExpressionEvaluator`] caches parsed ASTs by source text
//! and only walks the tree on subsequent evaluations.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::expression::ast::{BinaryOp, Expr};
use crate::expression::parser;

/// Parameter bindings for one evaluation.
pub type Bindings = HashMap<String, Decimal>;

/// A re-entrant expression evaluator with a concurrent parse cache.
///
/// # Example
///
/// ```
/// use pricing_engine::expression::{Bindings, ExpressionEvaluator};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let evaluator = ExpressionEvaluator::new();
/// let mut bindings = Bindings::new();
/// bindings.insert("basePrice".to_string(), Decimal::from(1000));
///
/// let result = evaluator.evaluate("basePrice * 0.19", &bindings).unwrap();
/// assert_eq!(result, Decimal::from_str("190.00").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct ExpressionEvaluator {
    parsed: DashMap<String, Arc<Expr>>,
}

impl ExpressionEvaluator {
    /// Creates an evaluator with an empty parse cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed AST for an expression, parsing at most once per
    /// distinct source string.
    fn parse_cached(&self, expression: &str) -> EngineResult<Arc<Expr>> {
        if let Some(expr) = self.parsed.get(expression) {
            return Ok(Arc::clone(&expr));
        }
        let expr = Arc::new(parser::parse(expression)?);
        self.parsed
            .insert(expression.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    /// Parses (or fetches the cached parse of) `expression` and evaluates
    /// it against `bindings`.
    pub fn evaluate(&self, expression: &str, bindings: &Bindings) -> EngineResult<Decimal> {
        let expr = self.parse_cached(expression)?;
        eval(&expr, bindings)
    }

    /// Number of distinct expressions currently cached.
    pub fn cached_expressions(&self) -> usize {
        self.parsed.len()
    }
}

fn eval(expr: &Expr, bindings: &Bindings) -> EngineResult<Decimal> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Parameter(name) => {
            bindings
                .get(name)
                .copied()
                .ok_or_else(|| EngineError::UnboundParameter { name: name.clone() })
        }
        Expr::Negate(inner) => Ok(-eval(inner, bindings)?),
        Expr::Binary { op, lhs, rhs } => {
            let left = eval(lhs, bindings)?;
            let right = eval(rhs, bindings)?;
            match op {
                BinaryOp::Add => Ok(left + right),
                BinaryOp::Sub => Ok(left - right),
                BinaryOp::Mul => Ok(left * right),
                BinaryOp::Div => {
                    if right.is_zero() {
                        Err(EngineError::DivisionByZero)
                    } else {
                        Ok(left / right)
                    }
                }
                BinaryOp::Eq => Ok(bool_to_decimal(left == right)),
                BinaryOp::Ne => Ok(bool_to_decimal(left != right)),
                BinaryOp::Lt => Ok(bool_to_decimal(left < right)),
                BinaryOp::Le => Ok(bool_to_decimal(left <= right)),
                BinaryOp::Gt => Ok(bool_to_decimal(left > right)),
                BinaryOp::Ge => Ok(bool_to_decimal(left >= right)),
            }
        }
    }
}

fn bool_to_decimal(value: bool) -> Decimal {
    if value { Decimal::ONE } else { Decimal::ZERO }
}
