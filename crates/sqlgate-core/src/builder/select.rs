//! SELECT statement builder using the typestate pattern.
//!
//! This module provides string-based query building. For queries driven by
//! schema traits, use `TypedSelect` from `builder::typed`.
//!
//! Invalid SQL constructs are caught at compile time; invalid WHERE clauses
//! are caught when the clause is attached.

use std::marker::PhantomData;

use crate::check::{DynamicCapability, Gated, RuleId};
use crate::exec::BuildSql;

use super::expr::IntoExpr;
use super::value::SqlValue;
use super::where_clause::{build_dynamic_clause, build_static_clause, WhereClause, WhereTarget};

// Typestate markers (zero-sized types)

/// Marker: No columns specified yet.
pub struct NoColumns;
/// Marker: Columns have been specified.
pub struct HasColumns;
/// Marker: No FROM clause specified yet.
pub struct NoFrom;
/// Marker: FROM clause has been specified.
pub struct HasFrom;
/// Marker: No WHERE clause attached yet.
pub struct NoWhere;
/// Marker: A checked WHERE clause is attached.
pub struct HasWhere;

#[derive(Default)]
struct SelectParts {
    distinct: bool,
    columns: Vec<String>,
    from: Option<String>,
    capability: DynamicCapability,
    joins: Vec<String>,
    where_clause: Option<WhereClause>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// A SELECT statement builder using string-based column names.
///
/// Uses the typestate pattern to ensure that:
/// - `build()` is only available when both columns and FROM are specified
/// - WHERE is only available after FROM, and at most once
/// - `dynamic_where()` is only accepted on statements from `dynamic_from()`
pub struct Select<Cols, From, Where> {
    parts: SelectParts,
    _state: PhantomData<(Cols, From, Where)>,
}

impl<Cols, From, Where> Select<Cols, From, Where> {
    fn into_state<C, F, W>(self) -> Select<C, F, W> {
        Select {
            parts: self.parts,
            _state: PhantomData,
        }
    }

    /// Returns the capability this statement was constructed with.
    #[must_use]
    pub const fn capability(&self) -> DynamicCapability {
        self.parts.capability
    }
}

impl Select<NoColumns, NoFrom, NoWhere> {
    /// Creates a new SELECT builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parts: SelectParts::default(),
            _state: PhantomData,
        }
    }
}

impl Default for Select<NoColumns, NoFrom, NoWhere> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoColumns -> HasColumns
impl<From, Where> Select<NoColumns, From, Where> {
    /// Specifies the columns to select.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Select<HasColumns, From, Where> {
        self.parts.columns = cols.iter().map(|s| (*s).to_string()).collect();
        self.into_state()
    }

    /// Selects all columns (*).
    #[must_use]
    pub fn all(mut self) -> Select<HasColumns, From, Where> {
        self.parts.columns = vec!["*".to_string()];
        self.into_state()
    }
}

// Transition: NoFrom -> HasFrom
impl<Cols> Select<Cols, NoFrom, NoWhere> {
    /// Specifies the table to select from.
    #[must_use]
    pub fn from(mut self, table: &str) -> Select<Cols, HasFrom, NoWhere> {
        self.parts.from = Some(table.to_string());
        self.parts.capability = DynamicCapability::Unsupported;
        self.into_state()
    }

    /// Specifies the table and enables `dynamic_where()`.
    #[must_use]
    pub fn dynamic_from(mut self, table: &str) -> Select<Cols, HasFrom, NoWhere> {
        self.parts.from = Some(table.to_string());
        self.parts.capability = DynamicCapability::Supported;
        self.into_state()
    }
}

// Methods available after FROM
impl<Cols, Where> Select<Cols, HasFrom, Where> {
    /// Adds an INNER JOIN.
    #[must_use]
    pub fn join(mut self, table: &str, on: &str) -> Self {
        self.parts.joins.push(format!("INNER JOIN {table} ON {on}"));
        self
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(mut self, table: &str, on: &str) -> Self {
        self.parts.joins.push(format!("LEFT JOIN {table} ON {on}"));
        self
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(mut self, table: &str, on: &str) -> Self {
        self.parts.joins.push(format!("RIGHT JOIN {table} ON {on}"));
        self
    }

    /// Adds a CROSS JOIN.
    #[must_use]
    pub fn cross_join(mut self, table: &str) -> Self {
        self.parts.joins.push(format!("CROSS JOIN {table}"));
        self
    }
}

impl<Cols> WhereTarget for Select<Cols, HasFrom, NoWhere> {
    type Filtered = Select<Cols, HasFrom, HasWhere>;

    fn dynamic_capability(&self) -> DynamicCapability {
        self.parts.capability
    }

    fn attach_where(mut self, clause: WhereClause) -> Self::Filtered {
        self.parts.where_clause = Some(clause);
        self.into_state()
    }
}

impl<Cols> Select<Cols, HasFrom, NoWhere> {
    /// Adds a WHERE clause with a single condition.
    pub fn where_clause<T: IntoExpr>(self, expr: T) -> Gated<Select<Cols, HasFrom, HasWhere>> {
        build_static_clause(self, [expr])
    }

    /// Adds a WHERE clause with a fixed list of conditions, joined by AND.
    pub fn where_all<I>(self, exprs: I) -> Gated<Select<Cols, HasFrom, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_static_clause(self, exprs)
    }

    /// Adds a WHERE clause that can be extended later with `add_where()`.
    pub fn dynamic_where<I>(self, exprs: I) -> Gated<Select<Cols, HasFrom, HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_dynamic_clause(self, exprs)
    }
}

impl<Cols> Select<Cols, HasFrom, HasWhere> {
    /// Adds a condition to a dynamic WHERE clause.
    pub fn add_where<T: IntoExpr>(&mut self, expr: T) -> Result<(), RuleId> {
        match self.parts.where_clause.as_mut() {
            Some(clause) => clause.push(expr),
            None => Err(RuleId::DynamicNotSupported),
        }
    }
}

// Methods available with columns
impl<From, Where> Select<HasColumns, From, Where> {
    /// Sets DISTINCT.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.parts.distinct = true;
        self
    }
}

impl<Where> Select<HasColumns, HasFrom, Where> {
    /// Adds a GROUP BY clause.
    #[must_use]
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.parts.group_by = cols.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Adds an ORDER BY clause.
    #[must_use]
    pub fn order_by(mut self, cols: &[&str]) -> Self {
        self.parts.order_by = cols.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Adds an ORDER BY DESC clause.
    #[must_use]
    pub fn order_by_desc(mut self, cols: &[&str]) -> Self {
        self.parts.order_by = cols.iter().map(|s| format!("{s} DESC")).collect();
        self
    }

    /// Adds a LIMIT clause.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.parts.limit = Some(n);
        self
    }

    /// Adds an OFFSET clause.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.parts.offset = Some(n);
        self
    }

    /// Builds the SELECT statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }

    /// Builds the SELECT statement and returns only the SQL string.
    #[must_use]
    pub fn build_sql(self) -> String {
        self.to_sql().0
    }
}

impl<Where> BuildSql for Select<HasColumns, HasFrom, Where> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let parts = &self.parts;
        let mut sql = String::from("SELECT ");
        let mut params = vec![];

        if parts.distinct {
            sql.push_str("DISTINCT ");
        }

        sql.push_str(&parts.columns.join(", "));

        if let Some(ref table) = parts.from {
            sql.push_str(" FROM ");
            sql.push_str(table);
        }

        for join in &parts.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if let Some(ref clause) = parts.where_clause {
            clause.write_sql(&mut sql, &mut params);
        }

        if !parts.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&parts.group_by.join(", "));
        }

        if !parts.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.order_by.join(", "));
        }

        if let Some(n) = parts.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        if let Some(n) = parts.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::aggregate::count_all;
    use crate::builder::expr::{col, Column, ExprBuilder};
    use crate::schema::ValueType;

    #[test]
    fn test_simple_select() {
        let (sql, params) = Select::new()
            .columns(&["id", "name"])
            .from("users")
            .build();

        assert_eq!(sql, "SELECT id, name FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_all_distinct() {
        let (sql, _) = Select::new().all().from("users").build();
        assert_eq!(sql, "SELECT * FROM users");

        let sql = Select::new()
            .columns(&["status"])
            .distinct()
            .from("orders")
            .build_sql();
        assert_eq!(sql, "SELECT DISTINCT status FROM orders");
    }

    #[test]
    fn test_select_with_where() {
        let (sql, params) = Select::new()
            .columns(&["id", "name"])
            .from("users")
            .where_clause(col("active").eq(true))
            .unwrap_valid()
            .build();

        assert_eq!(sql, "SELECT id, name FROM users WHERE active = ?");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_where_before_columns() {
        let sql = Select::new()
            .from("users")
            .where_clause(col("id").gt(10))
            .map(|select| select.columns(&["id"]).order_by(&["id"]))
            .unwrap_valid()
            .build_sql();

        assert_eq!(sql, "SELECT id FROM users WHERE id > ? ORDER BY id");
    }

    #[test]
    fn test_select_with_join() {
        let (sql, _) = Select::new()
            .columns(&["u.id", "o.amount"])
            .from("users u")
            .join("orders o", "u.id = o.user_id")
            .build();

        assert_eq!(
            sql,
            "SELECT u.id, o.amount FROM users u INNER JOIN orders o ON u.id = o.user_id"
        );
    }

    #[test]
    fn test_select_with_right_and_cross_join() {
        let sql = Select::new()
            .all()
            .from("orders o")
            .right_join("users u", "u.id = o.user_id")
            .cross_join("regions")
            .build_sql();

        assert_eq!(
            sql,
            "SELECT * FROM orders o RIGHT JOIN users u ON u.id = o.user_id CROSS JOIN regions"
        );
    }

    #[test]
    fn test_select_with_limit_offset() {
        let (sql, _) = Select::new()
            .columns(&["id"])
            .from("users")
            .limit(10)
            .offset(20)
            .build();

        assert_eq!(sql, "SELECT id FROM users LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_complex_select() {
        let (sql, params) = Select::new()
            .columns(&["u.id", "u.name", "COUNT(o.id) as order_count"])
            .from("users u")
            .left_join("orders o", "u.id = o.user_id")
            .where_clause(
                col("u.active")
                    .eq(true)
                    .and(col("o.status").not_eq("cancelled")),
            )
            .map(|select| {
                select
                    .group_by(&["u.id", "u.name"])
                    .order_by_desc(&["order_count"])
                    .limit(10)
            })
            .unwrap_valid()
            .build();

        assert!(sql.contains("SELECT u.id, u.name, COUNT(o.id) as order_count"));
        assert!(sql.contains("LEFT JOIN orders o ON u.id = o.user_id"));
        assert!(sql.contains("WHERE u.active = ? AND o.status != ?"));
        assert!(sql.contains("GROUP BY u.id, u.name"));
        assert!(sql.contains("ORDER BY order_count DESC"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_aggregate_in_where_is_rejected() {
        let gated = Select::new()
            .columns(&["status"])
            .from("orders")
            .where_clause(count_all().gt(5))
            .map(|select| select.group_by(&["status"]));
        assert_eq!(gated.rule(), Some(RuleId::AggregateNotAllowed));
        assert!(gated.build().is_err());
    }

    #[test]
    fn test_dynamic_select() {
        let mut select = Select::new()
            .all()
            .dynamic_from("users")
            .dynamic_where([Column::typed("active", ValueType::Boolean)])
            .unwrap_valid();
        select.add_where(col("age").gt_eq(18)).unwrap();
        assert_eq!(
            select.add_where(col("age").assign(3)),
            Err(RuleId::AssignmentNotAllowed)
        );

        let (sql, params) = select.build();
        assert_eq!(sql, "SELECT * FROM users WHERE (active) AND (age >= ?)");
        assert_eq!(params, vec![SqlValue::Int(18)]);
    }

    #[test]
    fn test_dynamic_where_on_static_select() {
        let gated = Select::new()
            .all()
            .from("users")
            .dynamic_where(Vec::<ExprBuilder>::new());
        assert_eq!(gated.rule(), Some(RuleId::DynamicNotSupported));
    }

    // This would fail to compile: SELECT without FROM
    // let _ = Select::new().columns(&["id"]).build();

    // This would fail to compile: two WHERE clauses
    // let _ = Select::new().all().from("t").where_clause(a).unwrap_valid().where_clause(b);
}
