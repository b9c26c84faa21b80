//! Abstract syntax tree for the restricted rule-expression language.

use rust_decimal::Decimal;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==` (yields 1 or 0)
    Eq,
    /// `!=` (yields 1 or 0)
    Ne,
    /// `<` (yields 1 or 0)
    Lt,
    /// `<=` (yields 1 or 0)
    Le,
    /// `>` (yields 1 or 0)
    Gt,
    /// `>=` (yields 1 or 0)
    Ge,
}

/// A parsed expression.
///
/// The grammar is deliberately minimal: literals, parameters, the four
/// arithmetic operators, comparisons, unary negation, and parentheses.
/// No loops, no function calls, no assignment, so evaluation is total
/// apart from unbound parameters and division by zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(Decimal),
    /// A named parameter resolved from the bindings at evaluation time.
    Parameter(String),
    /// Unary negation.
    Negate(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}
