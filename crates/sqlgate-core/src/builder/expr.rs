//! Expression builder.
//!
//! Expressions are kept as a small tree instead of pre-rendered SQL so the
//! WHERE clause checker can inspect their shape (is this a comparison or an
//! assignment, is there an aggregate somewhere below) before anything is
//! rendered.

use core::fmt;

use crate::schema::ValueType;

use super::value::{SqlValue, ToSqlValue};

/// Creates a column reference with an unknown value type.
///
/// Use [`Column::typed`] or `typed_col` when the column is used as a
/// condition on its own, since an untyped column is not known to be boolean.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        table: None,
        name: String::from(name),
        value_type: ValueType::Unknown,
        aggregate: false,
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Optional table qualifier.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
    /// Declared value type of the column.
    pub value_type: ValueType,
    /// Whether the column is backed by an aggregate computation.
    pub aggregate: bool,
}

impl Column {
    /// Creates a column reference with a declared value type.
    #[must_use]
    pub fn typed(name: &str, value_type: ValueType) -> Self {
        Self {
            value_type,
            ..col(name)
        }
    }

    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(table: &str, name: &str) -> Self {
        Self {
            table: Some(String::from(table)),
            ..col(name)
        }
    }

    /// Sets the declared value type.
    #[must_use]
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Marks the column as backed by an aggregate computation.
    #[must_use]
    pub fn aggregate(mut self) -> Self {
        self.aggregate = true;
        self
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Creates an assignment (`column = value`), as used by `UPDATE ... SET`.
    ///
    /// Assignments are not conditions: passing one to a WHERE clause yields
    /// an invalid statement.
    #[must_use]
    pub fn assign<T: IntoExpr>(self, value: T) -> Assignment {
        Assignment {
            expr: Expr::Assign {
                column: Box::new(Expr::from(self)),
                value: Box::new(value.into_expr().expr),
            },
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).eq(value)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).not_eq(value)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).lt(value)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).lt_eq(value)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).gt(value)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq<T: IntoExpr>(self, value: T) -> ExprBuilder {
        ExprBuilder::from(self).gt_eq(value)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> ExprBuilder {
        ExprBuilder::from(self).is_null()
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> ExprBuilder {
        ExprBuilder::from(self).is_not_null()
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like<T: IntoExpr>(self, pattern: T) -> ExprBuilder {
        ExprBuilder::from(self).like(pattern)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like<T: IntoExpr>(self, pattern: T) -> ExprBuilder {
        ExprBuilder::from(self).not_like(pattern)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between<T: IntoExpr, U: IntoExpr>(self, low: T, high: U) -> ExprBuilder {
        ExprBuilder::from(self).between(low, high)
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between<T: IntoExpr, U: IntoExpr>(self, low: T, high: U) -> ExprBuilder {
        ExprBuilder::from(self).not_between(low, high)
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list<T: IntoExpr>(self, values: Vec<T>) -> ExprBuilder {
        ExprBuilder::from(self).in_list(values)
    }

    /// Creates a NOT IN expression.
    #[must_use]
    pub fn not_in_list<T: IntoExpr>(self, values: Vec<T>) -> ExprBuilder {
        ExprBuilder::from(self).not_in_list(values)
    }

    /// Creates an AND expression with the column as the left operand.
    #[must_use]
    pub fn and<T: IntoExpr>(self, other: T) -> ExprBuilder {
        ExprBuilder::from(self).and(other)
    }

    /// Creates an OR expression with the column as the left operand.
    #[must_use]
    pub fn or<T: IntoExpr>(self, other: T) -> ExprBuilder {
        ExprBuilder::from(self).or(other)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CompareOp {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl LogicalOp {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    /// `COUNT`
    Count,
    /// `SUM`
    Sum,
    /// `AVG`
    Avg,
    /// `MIN`
    Min,
    /// `MAX`
    Max,
}

impl AggregateFunc {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(Column),
    /// Bound parameter.
    Value(SqlValue),
    /// Raw SQL fragment with a declared result type.
    Raw {
        /// SQL text, inserted verbatim.
        sql: String,
        /// Declared result type.
        value_type: ValueType,
    },
    /// `*`, only meaningful as the argument of `COUNT`.
    Wildcard,
    /// Binary comparison.
    Compare {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `[NOT] LIKE`.
    Like {
        /// Matched expression.
        expr: Box<Expr>,
        /// Pattern.
        pattern: Box<Expr>,
        /// Whether this is `NOT LIKE`.
        negated: bool,
    },
    /// `[NOT] BETWEEN low AND high`.
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is `NOT BETWEEN`.
        negated: bool,
    },
    /// `[NOT] IN (...)`.
    InList {
        /// Tested expression.
        expr: Box<Expr>,
        /// Candidate values.
        values: Vec<Expr>,
        /// Whether this is `NOT IN`.
        negated: bool,
    },
    /// `IS [NOT] NULL`.
    IsNull {
        /// Tested expression.
        expr: Box<Expr>,
        /// Whether this is `IS NOT NULL`.
        negated: bool,
    },
    /// `AND` / `OR`.
    Logical {
        /// Left operand.
        left: Box<Expr>,
        /// Combinator.
        op: LogicalOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `NOT expr`.
    Not(Box<Expr>),
    /// Parenthesized expression.
    Paren(Box<Expr>),
    /// `column = value` as a mutation.
    Assign {
        /// Target column.
        column: Box<Expr>,
        /// Assigned value.
        value: Box<Expr>,
    },
    /// Aggregate function call.
    Aggregate {
        /// The function.
        func: AggregateFunc,
        /// The argument.
        arg: Box<Expr>,
        /// Whether the argument is `DISTINCT`.
        distinct: bool,
    },
}

impl Expr {
    /// Returns the declared result type of the expression.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Column(c) => c.value_type,
            Self::Value(v) => v.value_type(),
            Self::Raw { value_type, .. } => *value_type,
            Self::Wildcard | Self::Assign { .. } => ValueType::Unknown,
            Self::Compare { .. }
            | Self::Like { .. }
            | Self::Between { .. }
            | Self::InList { .. }
            | Self::IsNull { .. }
            | Self::Logical { .. }
            | Self::Not(_) => {
                // An assignment is never an operand.
                if self.children().into_iter().any(Self::contains_assign) {
                    ValueType::Unknown
                } else {
                    ValueType::Boolean
                }
            }
            Self::Paren(inner) => inner.value_type(),
            Self::Aggregate { func, arg, .. } => match func {
                AggregateFunc::Count => ValueType::Integer,
                AggregateFunc::Avg => ValueType::Float,
                AggregateFunc::Sum | AggregateFunc::Min | AggregateFunc::Max => arg.value_type(),
            },
        }
    }

    fn contains_assign(&self) -> bool {
        matches!(self, Self::Assign { .. })
            || self.children().into_iter().any(Self::contains_assign)
    }

    /// Returns the direct sub-expressions of this node.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Column(_) | Self::Value(_) | Self::Raw { .. } | Self::Wildcard => vec![],
            Self::Compare { left, right, .. } | Self::Logical { left, right, .. } => {
                vec![&**left, &**right]
            }
            Self::Like { expr, pattern, .. } => vec![&**expr, &**pattern],
            Self::Between {
                expr, low, high, ..
            } => vec![&**expr, &**low, &**high],
            Self::InList { expr, values, .. } => {
                let mut children = vec![&**expr];
                children.extend(values.iter());
                children
            }
            Self::IsNull { expr, .. } | Self::Not(expr) | Self::Paren(expr) => vec![&**expr],
            Self::Assign { column, value } => vec![&**column, &**value],
            Self::Aggregate { arg, .. } => vec![&**arg],
        }
    }

    /// Renders the expression, appending bound parameters in order.
    pub fn write_sql(&self, sql: &mut String, params: &mut Vec<SqlValue>) {
        match self {
            Self::Column(c) => sql.push_str(&c.to_sql()),
            Self::Value(v) => {
                sql.push('?');
                params.push(v.clone());
            }
            Self::Raw { sql: raw, .. } => sql.push_str(raw),
            Self::Wildcard => sql.push('*'),
            Self::Compare { left, op, right } => {
                left.write_sql(sql, params);
                sql.push(' ');
                sql.push_str(op.as_str());
                sql.push(' ');
                right.write_sql(sql, params);
            }
            Self::Like {
                expr,
                pattern,
                negated,
            } => {
                expr.write_sql(sql, params);
                sql.push_str(if *negated { " NOT LIKE " } else { " LIKE " });
                pattern.write_sql(sql, params);
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                expr.write_sql(sql, params);
                sql.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.write_sql(sql, params);
                sql.push_str(" AND ");
                high.write_sql(sql, params);
            }
            Self::InList {
                expr,
                values,
                negated,
            } => {
                expr.write_sql(sql, params);
                sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    value.write_sql(sql, params);
                }
                sql.push(')');
            }
            Self::IsNull { expr, negated } => {
                expr.write_sql(sql, params);
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::Logical { left, op, right } => {
                left.write_sql(sql, params);
                sql.push(' ');
                sql.push_str(op.as_str());
                sql.push(' ');
                right.write_sql(sql, params);
            }
            Self::Not(expr) => {
                sql.push_str("NOT ");
                expr.write_sql(sql, params);
            }
            Self::Paren(expr) => {
                sql.push('(');
                expr.write_sql(sql, params);
                sql.push(')');
            }
            Self::Assign { column, value } => {
                column.write_sql(sql, params);
                sql.push_str(" = ");
                value.write_sql(sql, params);
            }
            Self::Aggregate {
                func,
                arg,
                distinct,
            } => {
                sql.push_str(func.as_str());
                sql.push('(');
                if *distinct {
                    sql.push_str("DISTINCT ");
                }
                arg.write_sql(sql, params);
                sql.push(')');
            }
        }
    }
}

impl From<Column> for Expr {
    fn from(col: Column) -> Self {
        Self::Column(col)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sql = String::new();
        self.write_sql(&mut sql, &mut Vec::new());
        f.write_str(&sql)
    }
}

/// A `column = value` binding for `UPDATE ... SET`.
///
/// Only [`Column::assign`] builds one. It still converts into an expression,
/// so a misplaced assignment reaches the WHERE clause checker and is
/// rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    expr: Expr,
}

impl Assignment {
    /// Returns the `Expr::Assign` node.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consumes the assignment and returns the `Expr::Assign` node.
    #[must_use]
    pub fn into_inner(self) -> Expr {
        self.expr
    }

    /// Returns the SQL representation (`column = ?`).
    #[must_use]
    pub fn sql(&self) -> String {
        self.expr.to_string()
    }
}

/// Conversion into an expression.
///
/// Implemented for expressions, columns, and every literal type, so a WHERE
/// clause accepts anything a caller might pass and leaves the judgement to
/// the checker.
pub trait IntoExpr {
    /// Converts `self` into an expression.
    fn into_expr(self) -> ExprBuilder;
}

impl IntoExpr for ExprBuilder {
    fn into_expr(self) -> ExprBuilder {
        self
    }
}

impl IntoExpr for Assignment {
    fn into_expr(self) -> ExprBuilder {
        ExprBuilder::from_expr(self.expr)
    }
}

impl IntoExpr for Column {
    fn into_expr(self) -> ExprBuilder {
        ExprBuilder::from(self)
    }
}

impl<T: ToSqlValue> IntoExpr for T {
    fn into_expr(self) -> ExprBuilder {
        ExprBuilder::value(self)
    }
}

/// A type-safe expression builder.
#[derive(Debug, Clone)]
pub struct ExprBuilder {
    expr: Expr,
}

impl ExprBuilder {
    /// Wraps an expression node.
    #[must_use]
    pub const fn from_expr(expr: Expr) -> Self {
        Self { expr }
    }

    /// Creates a new expression from raw SQL with an unknown result type.
    ///
    /// **Warning**: Only use this for SQL fragments that don't contain user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::from_expr(Expr::Raw {
            sql: sql.into(),
            value_type: ValueType::Unknown,
        })
    }

    /// Creates a raw SQL fragment declared to be a boolean condition.
    ///
    /// **Warning**: Only use this for SQL fragments that don't contain user input.
    #[must_use]
    pub fn raw_predicate(sql: impl Into<String>) -> Self {
        Self::from_expr(Expr::Raw {
            sql: sql.into(),
            value_type: ValueType::Boolean,
        })
    }

    /// Creates a column reference expression with a declared value type.
    #[must_use]
    pub fn column(name: &str, value_type: ValueType) -> Self {
        Self::from(Column::typed(name, value_type))
    }

    /// Creates an expression from a value (parameterized).
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::from(value.to_sql_value())
    }

    fn compare<T: IntoExpr>(self, op: CompareOp, rhs: T) -> Self {
        Self::from_expr(Expr::Compare {
            left: Box::new(self.expr),
            op,
            right: Box::new(rhs.into_expr().expr),
        })
    }

    fn logical<T: IntoExpr>(self, op: LogicalOp, rhs: T) -> Self {
        Self::from_expr(Expr::Logical {
            left: Box::new(self.expr),
            op,
            right: Box::new(rhs.into_expr().expr),
        })
    }

    fn in_list_impl<T: IntoExpr>(self, values: Vec<T>, negated: bool) -> Self {
        Self::from_expr(Expr::InList {
            expr: Box::new(self.expr),
            values: values.into_iter().map(|v| v.into_expr().expr).collect(),
            negated,
        })
    }

    fn between_impl<T: IntoExpr, U: IntoExpr>(self, low: T, high: U, negated: bool) -> Self {
        Self::from_expr(Expr::Between {
            expr: Box::new(self.expr),
            low: Box::new(low.into_expr().expr),
            high: Box::new(high.into_expr().expr),
            negated,
        })
    }

    fn like_impl<T: IntoExpr>(self, pattern: T, negated: bool) -> Self {
        Self::from_expr(Expr::Like {
            expr: Box::new(self.expr),
            pattern: Box::new(pattern.into_expr().expr),
            negated,
        })
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and<T: IntoExpr>(self, other: T) -> Self {
        self.logical(LogicalOp::And, other)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or<T: IntoExpr>(self, other: T) -> Self {
        self.logical(LogicalOp::Or, other)
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn paren(self) -> Self {
        Self::from_expr(Expr::Paren(Box::new(self.expr)))
    }

    /// Negates the expression with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::from_expr(Expr::Not(Box::new(self.expr)))
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::Eq, value)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::NotEq, value)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::LtEq, value)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq<T: IntoExpr>(self, value: T) -> Self {
        self.compare(CompareOp::GtEq, value)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::from_expr(Expr::IsNull {
            expr: Box::new(self.expr),
            negated: false,
        })
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::from_expr(Expr::IsNull {
            expr: Box::new(self.expr),
            negated: true,
        })
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like<T: IntoExpr>(self, pattern: T) -> Self {
        self.like_impl(pattern, false)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like<T: IntoExpr>(self, pattern: T) -> Self {
        self.like_impl(pattern, true)
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between<T: IntoExpr, U: IntoExpr>(self, low: T, high: U) -> Self {
        self.between_impl(low, high, false)
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between<T: IntoExpr, U: IntoExpr>(self, low: T, high: U) -> Self {
        self.between_impl(low, high, true)
    }

    /// Creates an IN expression.
    #[must_use]
    pub fn in_list<T: IntoExpr>(self, values: Vec<T>) -> Self {
        self.in_list_impl(values, false)
    }

    /// Creates a NOT IN expression.
    #[must_use]
    pub fn not_in_list<T: IntoExpr>(self, values: Vec<T>) -> Self {
        self.in_list_impl(values, true)
    }

    /// Returns the expression tree.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consumes the builder and returns the expression tree.
    #[must_use]
    pub fn into_inner(self) -> Expr {
        self.expr
    }

    /// Returns the declared result type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.expr.value_type()
    }

    /// Renders the SQL string.
    #[must_use]
    pub fn sql(&self) -> String {
        self.expr.to_string()
    }

    /// Collects the bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> Vec<SqlValue> {
        let mut params = vec![];
        self.expr.write_sql(&mut String::new(), &mut params);
        params
    }

    /// Consumes the builder and returns the SQL and parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut params = vec![];
        self.expr.write_sql(&mut sql, &mut params);
        (sql, params)
    }
}

impl From<Column> for ExprBuilder {
    fn from(col: Column) -> Self {
        Self::from_expr(Expr::Column(col))
    }
}

impl From<SqlValue> for ExprBuilder {
    fn from(value: SqlValue) -> Self {
        Self::from_expr(Expr::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_eq() {
        let expr = col("name").eq("Alice");
        assert_eq!(expr.sql(), "name = ?");
        assert_eq!(expr.params().len(), 1);
        assert_eq!(expr.value_type(), ValueType::Boolean);
    }

    #[test]
    fn test_column_comparison() {
        assert_eq!(col("age").gt(18).sql(), "age > ?");
        assert_eq!(col("age").lt_eq(65).sql(), "age <= ?");
        assert_eq!(col("a").eq(col("b")).sql(), "a = b");
    }

    #[test]
    fn test_is_null() {
        let expr = col("deleted_at").is_null();
        assert_eq!(expr.sql(), "deleted_at IS NULL");
        assert!(expr.params().is_empty());
    }

    #[test]
    fn test_between_and_in_list() {
        let expr = col("price").between(10, 100);
        assert_eq!(expr.sql(), "price BETWEEN ? AND ?");
        assert_eq!(expr.params().len(), 2);

        let expr = col("status").not_in_list(vec!["active", "pending"]);
        assert_eq!(expr.sql(), "status NOT IN (?, ?)");
    }

    #[test]
    fn test_and_or() {
        let expr = col("active")
            .eq(true)
            .and(col("age").gt(18).or(col("verified").eq(true)).paren());
        assert_eq!(expr.sql(), "active = ? AND (age > ? OR verified = ?)");
        assert_eq!(
            expr.params(),
            vec![SqlValue::Bool(true), SqlValue::Int(18), SqlValue::Bool(true)]
        );
    }

    #[test]
    fn test_assignment() {
        let expr = col("gamma").assign(true);
        assert_eq!(expr.sql(), "gamma = ?");
        assert!(matches!(expr.expr(), Expr::Assign { .. }));
        assert_eq!(expr.into_expr().value_type(), ValueType::Unknown);
    }

    #[test]
    fn test_assignment_operand_is_not_boolean() {
        let gamma = || Column::typed("gamma", ValueType::Boolean);
        let alpha = || Column::typed("alpha", ValueType::Integer);

        assert_eq!(
            gamma().and(alpha().assign(1)).value_type(),
            ValueType::Unknown
        );
        assert_eq!(
            alpha().assign(true).into_expr().not().value_type(),
            ValueType::Unknown
        );
        assert_eq!(
            gamma()
                .or(alpha().gt(1).and(alpha().assign(2).into_expr().paren()))
                .value_type(),
            ValueType::Unknown
        );
        assert_eq!(gamma().and(alpha().gt(1)).value_type(), ValueType::Boolean);
    }

    #[test]
    fn test_column_with_declared_type() {
        let flag = col("flag").with_type(ValueType::Boolean);
        assert_eq!(flag.value_type, ValueType::Boolean);
        assert_eq!(ExprBuilder::from(flag).value_type(), ValueType::Boolean);

        let score = ExprBuilder::column("score", ValueType::Float);
        assert_eq!(score.value_type(), ValueType::Float);
        assert_eq!(score.gt(1.5).sql(), "score > ?");
    }

    #[test]
    fn test_typed_column_value_type() {
        assert_eq!(
            ExprBuilder::from(Column::typed("gamma", ValueType::Boolean)).value_type(),
            ValueType::Boolean
        );
        assert_eq!(
            ExprBuilder::from(Column::qualified("users", "name")).value_type(),
            ValueType::Unknown
        );
        assert_eq!(ExprBuilder::raw_predicate("1 = 1").value_type(), ValueType::Boolean);
    }

    #[test]
    fn test_qualified_column() {
        let expr = Column::qualified("users", "name").eq("Bob");
        assert_eq!(expr.sql(), "users.name = ?");
    }

    #[test]
    fn test_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let expr = col("name").eq(malicious);
        assert_eq!(expr.sql(), "name = ?");
        assert!(matches!(&expr.params()[0], SqlValue::Text(s) if s == malicious));
    }
}
