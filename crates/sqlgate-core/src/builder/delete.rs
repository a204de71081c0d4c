//! DELETE statement builder using the typestate pattern.
//!
//! This module provides string-based query building. For queries driven by
//! schema traits, use `TypedDelete` from `builder::typed`.

use std::marker::PhantomData;

use crate::check::{DynamicCapability, Gated, RuleId};
use crate::exec::BuildSql;

use super::expr::IntoExpr;
use super::value::SqlValue;
use super::where_clause::{build_dynamic_clause, build_static_clause, WhereClause, WhereTarget};

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;
/// Marker: A checked WHERE clause is attached.
pub struct HasWhere;

/// A DELETE statement builder using string-based table and column names.
///
/// Uses the typestate pattern to ensure that:
/// - `build()` is only available when the table is specified
/// - a WHERE clause is attached at most once, and only after the table
pub struct Delete<State> {
    table: String,
    capability: DynamicCapability,
    where_clause: Option<WhereClause>,
    _state: PhantomData<State>,
}

impl Delete<NoTable> {
    /// Creates a new DELETE builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: String::new(),
            capability: DynamicCapability::Unsupported,
            where_clause: None,
            _state: PhantomData,
        }
    }

    /// Specifies the table to delete from.
    #[must_use]
    pub fn from(self, table: &str) -> Delete<HasTable> {
        Delete {
            table: String::from(table),
            capability: DynamicCapability::Unsupported,
            where_clause: None,
            _state: PhantomData,
        }
    }

    /// Specifies the table and enables `dynamic_where()`.
    #[must_use]
    pub fn dynamic_from(self, table: &str) -> Delete<HasTable> {
        Delete {
            table: String::from(table),
            capability: DynamicCapability::Supported,
            where_clause: None,
            _state: PhantomData,
        }
    }
}

impl Default for Delete<NoTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> Delete<State> {
    /// Returns the capability this statement was constructed with.
    #[must_use]
    pub const fn capability(&self) -> DynamicCapability {
        self.capability
    }
}

impl WhereTarget for Delete<HasTable> {
    type Filtered = Delete<HasWhere>;

    fn dynamic_capability(&self) -> DynamicCapability {
        self.capability
    }

    fn attach_where(self, clause: WhereClause) -> Delete<HasWhere> {
        Delete {
            table: self.table,
            capability: self.capability,
            where_clause: Some(clause),
            _state: PhantomData,
        }
    }
}

// Methods available after FROM
impl Delete<HasTable> {
    /// Adds a WHERE clause with a single condition.
    pub fn where_clause<T: IntoExpr>(self, expr: T) -> Gated<Delete<HasWhere>> {
        build_static_clause(self, [expr])
    }

    /// Adds a WHERE clause with a fixed list of conditions, joined by AND.
    ///
    /// An empty list yields an invalid statement.
    pub fn where_all<I>(self, exprs: I) -> Gated<Delete<HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_static_clause(self, exprs)
    }

    /// Adds a WHERE clause that can be extended later with `add_where()`.
    ///
    /// Only valid on statements created with `dynamic_from()`.
    pub fn dynamic_where<I>(self, exprs: I) -> Gated<Delete<HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_dynamic_clause(self, exprs)
    }

    /// Builds the DELETE statement and returns SQL with parameters.
    ///
    /// **Warning**: Without a WHERE clause this deletes ALL rows.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }
}

impl Delete<HasWhere> {
    /// Adds a condition to a dynamic WHERE clause.
    ///
    /// Rejected conditions are not added.
    pub fn add_where<T: IntoExpr>(&mut self, expr: T) -> Result<(), RuleId> {
        match self.where_clause.as_mut() {
            Some(clause) => clause.push(expr),
            None => Err(RuleId::DynamicNotSupported),
        }
    }

    /// Returns the attached WHERE clause.
    #[must_use]
    pub fn clause(&self) -> Option<&WhereClause> {
        self.where_clause.as_ref()
    }

    /// Builds the DELETE statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }
}

fn render(delete: &Delete<impl Sized>) -> (String, Vec<SqlValue>) {
    let mut sql = String::from("DELETE FROM ");
    let mut params = vec![];
    sql.push_str(&delete.table);
    if let Some(ref clause) = delete.where_clause {
        clause.write_sql(&mut sql, &mut params);
    }
    (sql, params)
}

impl BuildSql for Delete<HasTable> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        render(self)
    }
}

impl BuildSql for Delete<HasWhere> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        render(self)
    }
}
