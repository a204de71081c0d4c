//! UPDATE statement builder using the typestate pattern.

use std::marker::PhantomData;

use crate::check::{DynamicCapability, Gated, RuleId};
use crate::exec::BuildSql;

use super::expr::{col, Assignment, Expr, IntoExpr};
use super::value::SqlValue;
use super::where_clause::{build_dynamic_clause, build_static_clause, WhereClause, WhereTarget};

// Typestate markers

/// Marker: No SET clause specified yet.
pub struct NoSet;
/// Marker: SET clause has been specified.
pub struct HasSet;
/// Marker: A checked WHERE clause is attached.
pub struct HasWhere;

/// An UPDATE statement builder.
///
/// The SET list is made of assignment expressions, the very shape a WHERE
/// clause refuses.
pub struct Update<State> {
    table: String,
    capability: DynamicCapability,
    assignments: Vec<Expr>,
    where_clause: Option<WhereClause>,
    _state: PhantomData<State>,
}

impl Update<NoSet> {
    /// Creates an UPDATE builder for a table.
    #[must_use]
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            capability: DynamicCapability::Unsupported,
            assignments: vec![],
            where_clause: None,
            _state: PhantomData,
        }
    }

    /// Creates an UPDATE builder that accepts `dynamic_where()`.
    #[must_use]
    pub fn dynamic_table(table: &str) -> Self {
        Self {
            capability: DynamicCapability::Supported,
            ..Self::table(table)
        }
    }

    /// Adds the first SET assignment.
    #[must_use]
    pub fn set<T: IntoExpr>(self, column: &str, value: T) -> Update<HasSet> {
        let mut update = Update {
            table: self.table,
            capability: self.capability,
            assignments: self.assignments,
            where_clause: None,
            _state: PhantomData,
        };
        update.push_assignment(column, value);
        update
    }

    /// Adds the first SET entry from an assignment built with
    /// `Column::assign()`.
    ///
    /// Conditions and other expressions are not assignments:
    ///
    /// ```compile_fail
    /// use sqlgate_core::builder::{col, count, Update};
    ///
    /// let _ = Update::table("t").set_expr(count(col("x")).gt(1));
    /// ```
    #[must_use]
    pub fn set_expr(self, assignment: Assignment) -> Update<HasSet> {
        let mut update = Update {
            table: self.table,
            capability: self.capability,
            assignments: self.assignments,
            where_clause: None,
            _state: PhantomData,
        };
        update.assignments.push(assignment.into_inner());
        update
    }
}

impl<State> Update<State> {
    fn push_assignment<T: IntoExpr>(&mut self, column: &str, value: T) {
        self.assignments.push(col(column).assign(value).into_inner());
    }

    /// Returns the capability this statement was constructed with.
    #[must_use]
    pub const fn capability(&self) -> DynamicCapability {
        self.capability
    }
}

impl WhereTarget for Update<HasSet> {
    type Filtered = Update<HasWhere>;

    fn dynamic_capability(&self) -> DynamicCapability {
        self.capability
    }

    fn attach_where(self, clause: WhereClause) -> Update<HasWhere> {
        Update {
            table: self.table,
            capability: self.capability,
            assignments: self.assignments,
            where_clause: Some(clause),
            _state: PhantomData,
        }
    }
}

// Methods available after SET
impl Update<HasSet> {
    /// Adds another SET assignment.
    #[must_use]
    pub fn set<T: IntoExpr>(mut self, column: &str, value: T) -> Self {
        self.push_assignment(column, value);
        self
    }

    /// Adds another SET entry from an assignment expression.
    #[must_use]
    pub fn set_expr(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment.into_inner());
        self
    }

    /// Adds a WHERE clause with a single condition.
    pub fn where_clause<T: IntoExpr>(self, expr: T) -> Gated<Update<HasWhere>> {
        build_static_clause(self, [expr])
    }

    /// Adds a WHERE clause with a fixed list of conditions, joined by AND.
    pub fn where_all<I>(self, exprs: I) -> Gated<Update<HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_static_clause(self, exprs)
    }

    /// Adds a WHERE clause that can be extended later with `add_where()`.
    pub fn dynamic_where<I>(self, exprs: I) -> Gated<Update<HasWhere>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        build_dynamic_clause(self, exprs)
    }

    /// Builds the UPDATE statement and returns SQL with parameters.
    ///
    /// **Warning**: Without a WHERE clause this updates ALL rows.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }
}

impl Update<HasWhere> {
    /// Adds a condition to a dynamic WHERE clause.
    pub fn add_where<T: IntoExpr>(&mut self, expr: T) -> Result<(), RuleId> {
        match self.where_clause.as_mut() {
            Some(clause) => clause.push(expr),
            None => Err(RuleId::DynamicNotSupported),
        }
    }

    /// Builds the UPDATE statement and returns SQL with parameters.
    #[must_use]
    pub fn build(self) -> (String, Vec<SqlValue>) {
        self.to_sql()
    }
}

fn render(update: &Update<impl Sized>) -> (String, Vec<SqlValue>) {
    let mut sql = String::from("UPDATE ");
    let mut params = vec![];
    sql.push_str(&update.table);
    sql.push_str(" SET ");
    for (i, assignment) in update.assignments.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        assignment.write_sql(&mut sql, &mut params);
    }
    if let Some(ref clause) = update.where_clause {
        clause.write_sql(&mut sql, &mut params);
    }
    (sql, params)
}

impl BuildSql for Update<HasSet> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        render(self)
    }
}

impl BuildSql for Update<HasWhere> {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{col, Column, ExprBuilder};
    use crate::schema::ValueType;

    #[test]
    fn test_simple_update() {
        let (sql, params) = Update::table("users").set("name", "Bob").build();

        assert_eq!(sql, "UPDATE users SET name = ?");
        assert_eq!(params, vec![SqlValue::Text(String::from("Bob"))]);
    }

    #[test]
    fn test_update_multiple_columns() {
        let (sql, params) = Update::table("users")
            .set("name", "Bob")
            .set("email", "bob@example.com")
            .set("age", 30_i32)
            .build();

        assert_eq!(sql, "UPDATE users SET name = ?, email = ?, age = ?");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_set_expr() {
        let visits = Column::typed("visits", ValueType::Integer);
        let (sql, params) = Update::table("pages")
            .set_expr(visits.assign(0_i32))
            .set("title", "home")
            .set_expr(col("edited").assign(true))
            .build();

        assert_eq!(sql, "UPDATE pages SET visits = ?, title = ?, edited = ?");
        assert_eq!(params[0], SqlValue::Int(0));
    }

    #[test]
    fn test_update_with_where() {
        let (sql, params) = Update::table("users")
            .set("active", false)
            .where_clause(col("id").eq(1_i32))
            .unwrap_valid()
            .build();

        assert_eq!(sql, "UPDATE users SET active = ? WHERE id = ?");
        assert_eq!(params, vec![SqlValue::Bool(false), SqlValue::Int(1)]);
    }

    #[test]
    fn test_set_expression_is_rejected_as_condition() {
        let gated = Update::table("users")
            .set("active", false)
            .where_clause(col("active").assign(true));
        assert_eq!(gated.rule(), Some(RuleId::AssignmentNotAllowed));
    }

    #[test]
    fn test_dynamic_update() {
        let mut update = Update::dynamic_table("users")
            .set("active", false)
            .dynamic_where(Vec::<ExprBuilder>::new())
            .unwrap_valid();
        update.add_where(col("last_login").lt(1000)).unwrap();
        assert_eq!(
            update.build().0,
            "UPDATE users SET active = ? WHERE last_login < ?"
        );
    }

    #[test]
    fn test_update_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let (sql, params) = Update::table("users")
            .set("name", malicious)
            .where_clause(col("id").eq(1_i32))
            .unwrap_valid()
            .build();

        assert_eq!(sql, "UPDATE users SET name = ? WHERE id = ?");
        assert!(matches!(&params[0], SqlValue::Text(s) if s == malicious));
    }
}
