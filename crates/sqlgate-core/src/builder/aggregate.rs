//! Aggregate functions.
//!
//! Aggregates compute one value over many rows. They can appear in a SELECT
//! list, but a WHERE clause filters individual rows, so the checker rejects
//! any condition with an aggregate anywhere in its tree.

use super::expr::{AggregateFunc, Expr, ExprBuilder, IntoExpr};

fn aggregate<T: IntoExpr>(func: AggregateFunc, arg: T, distinct: bool) -> ExprBuilder {
    ExprBuilder::from_expr(Expr::Aggregate {
        func,
        arg: Box::new(arg.into_expr().into_inner()),
        distinct,
    })
}

/// `COUNT(*)`.
#[must_use]
pub fn count_all() -> ExprBuilder {
    ExprBuilder::from_expr(Expr::Aggregate {
        func: AggregateFunc::Count,
        arg: Box::new(Expr::Wildcard),
        distinct: false,
    })
}

/// `COUNT(expr)`.
#[must_use]
pub fn count<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Count, arg, false)
}

/// `COUNT(DISTINCT expr)`.
#[must_use]
pub fn count_distinct<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Count, arg, true)
}

/// `SUM(expr)`.
#[must_use]
pub fn sum<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Sum, arg, false)
}

/// `AVG(expr)`.
#[must_use]
pub fn avg<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Avg, arg, false)
}

/// `MIN(expr)`.
#[must_use]
pub fn min<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Min, arg, false)
}

/// `MAX(expr)`.
#[must_use]
pub fn max<T: IntoExpr>(arg: T) -> ExprBuilder {
    aggregate(AggregateFunc::Max, arg, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{col, Column};
    use crate::schema::ValueType;

    #[test]
    fn test_count_all() {
        assert_eq!(count_all().sql(), "COUNT(*)");
        assert_eq!(count_all().value_type(), ValueType::Integer);
    }

    #[test]
    fn test_count_distinct() {
        assert_eq!(count_distinct(col("user_id")).sql(), "COUNT(DISTINCT user_id)");
    }

    #[test]
    fn test_aggregate_result_types() {
        let amount = Column::typed("amount", ValueType::Integer);
        assert_eq!(sum(amount.clone()).value_type(), ValueType::Integer);
        assert_eq!(avg(amount.clone()).value_type(), ValueType::Float);
        assert_eq!(max(amount).sql(), "MAX(amount)");
        assert_eq!(min(col("id")).sql(), "MIN(id)");
    }

    #[test]
    fn test_aggregate_comparison() {
        let expr = count(col("alpha")).gt(0);
        assert_eq!(expr.sql(), "COUNT(alpha) > ?");
        assert_eq!(expr.value_type(), ValueType::Boolean);
    }
}
