//! The restricted expression language used inside pricing rules.
//!
//! Rules carry expressions such as `basePrice * 0.19` or
//! `(transactionVolume > 500) * 25`. The language supports numeric
//! literals, named parameters, `+ - * /`, the comparison operators
//! (yielding 1/0), unary sign, and parentheses. Nothing else: evaluation
//! is pure and deterministic, and the only failure modes are syntax
//! errors, unbound parameters, and division by zero.

mod ast;
mod evaluator;
mod parser;

pub use ast::{BinaryOp, Expr};
pub use evaluator::{Bindings, ExpressionEvaluator};
pub use parser::parse;
