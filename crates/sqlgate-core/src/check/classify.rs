//! Expression classification.
//!
//! Reduces an expression tree to the handful of facts the WHERE clause rules
//! look at. Classification is total: anything it does not recognize simply
//! reports `false` for every fact and leaves the rejection to the rules.

use tracing::trace;

use crate::builder::{Expr, ExprBuilder};

/// Static facts about one filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExprFacts {
    /// The declared result type is boolean.
    pub is_boolean: bool,
    /// The top-level operator binds a value to a column.
    pub is_assignment: bool,
    /// Some node of the tree is an aggregate computation.
    pub references_aggregate: bool,
    /// Number of leaf operands the expression expands to.
    pub leaf_count: usize,
}

/// Classifies an expression.
#[must_use]
pub fn classify(expr: &ExprBuilder) -> ExprFacts {
    classify_expr(expr.expr())
}

/// Classifies a raw expression node.
#[must_use]
pub fn classify_expr(expr: &Expr) -> ExprFacts {
    let facts = ExprFacts {
        is_boolean: expr.value_type().is_boolean(),
        is_assignment: is_assignment(expr),
        references_aggregate: references_aggregate(expr),
        leaf_count: leaf_count(expr),
    };
    trace!(target: "sqlgate::check", expr = %expr, ?facts, "classified expression");
    facts
}

fn is_assignment(expr: &Expr) -> bool {
    match expr {
        Expr::Assign { .. } => true,
        Expr::Paren(inner) => is_assignment(inner),
        _ => false,
    }
}

fn references_aggregate(expr: &Expr) -> bool {
    match expr {
        Expr::Aggregate { .. } => true,
        Expr::Column(column) => column.aggregate,
        other => other.children().into_iter().any(references_aggregate),
    }
}

fn leaf_count(expr: &Expr) -> usize {
    let children = expr.children();
    if children.is_empty() {
        1
    } else {
        children.into_iter().map(leaf_count).sum()
    }
}
