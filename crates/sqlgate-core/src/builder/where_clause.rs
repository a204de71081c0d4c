//! WHERE clause construction shared by all statement builders.

use tracing::debug;

use crate::check::{
    check, classify, gate, ClauseMode, DynamicCapability, ExprFacts, Gated, RuleId,
};

use super::expr::{ExprBuilder, IntoExpr};
use super::value::SqlValue;

/// A checked WHERE clause.
///
/// Only obtainable through [`build_static_clause`] and
/// [`build_dynamic_clause`], so every condition in it has passed the rules.
#[derive(Debug, Clone)]
pub struct WhereClause {
    conditions: Vec<ExprBuilder>,
    capability: DynamicCapability,
}

impl WhereClause {
    /// Returns the conditions, in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[ExprBuilder] {
        &self.conditions
    }

    /// Returns the number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns true when no condition has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns true when the clause accepts further conditions.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.capability.is_supported()
    }

    /// Adds a condition to a dynamic clause.
    ///
    /// The condition is checked with the same rules as the initial ones and
    /// is not added if it fails. Clauses built statically reject every
    /// addition with [`RuleId::DynamicNotSupported`].
    pub fn push<T: IntoExpr>(&mut self, expr: T) -> Result<(), RuleId> {
        let expr = expr.into_expr();
        let facts = [classify(&expr)];
        if let Some(rule) = check(ClauseMode::Dynamic, self.capability, &facts).violation() {
            debug!(target: "sqlgate::check", rule = rule.name(), "rejected dynamic condition");
            return Err(rule);
        }
        self.conditions.push(expr);
        Ok(())
    }

    /// Appends ` WHERE ...` to `sql`; nothing for an empty clause.
    pub fn write_sql(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        if self.conditions.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let wrap = self.conditions.len() > 1;
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            if wrap {
                sql.push('(');
            }
            condition.expr().write_sql(sql, params);
            if wrap {
                sql.push(')');
            }
        }
    }
}

/// A statement that can take a WHERE clause.
pub trait WhereTarget: Sized {
    /// The statement type once the clause is attached.
    type Filtered;

    /// The capability the statement was constructed with.
    fn dynamic_capability(&self) -> DynamicCapability;

    /// Attaches a checked clause.
    fn attach_where(self, clause: WhereClause) -> Self::Filtered;
}

fn build_clause<S, I>(mode: ClauseMode, statement: S, exprs: I) -> Gated<S::Filtered>
where
    S: WhereTarget,
    I: IntoIterator,
    I::Item: IntoExpr,
{
    let capability = statement.dynamic_capability();
    let conditions: Vec<ExprBuilder> = exprs.into_iter().map(IntoExpr::into_expr).collect();
    let facts: Vec<ExprFacts> = conditions.iter().map(classify).collect();
    let verdict = check(mode, capability, &facts);
    let clause = WhereClause {
        conditions,
        capability: match mode {
            ClauseMode::Static => DynamicCapability::Unsupported,
            ClauseMode::Dynamic => capability,
        },
    };
    gate(verdict, statement).map(|statement| statement.attach_where(clause))
}

/// Builds a fixed WHERE clause: at least one condition, all checked now.
pub fn build_static_clause<S, I>(statement: S, exprs: I) -> Gated<S::Filtered>
where
    S: WhereTarget,
    I: IntoIterator,
    I::Item: IntoExpr,
{
    build_clause(ClauseMode::Static, statement, exprs)
}

/// Builds a WHERE clause that can grow later; zero conditions are fine.
///
/// The statement must have been constructed with dynamic clause support.
pub fn build_dynamic_clause<S, I>(statement: S, exprs: I) -> Gated<S::Filtered>
where
    S: WhereTarget,
    I: IntoIterator,
    I::Item: IntoExpr,
{
    build_clause(ClauseMode::Dynamic, statement, exprs)
}
