//! Type-Safe SQL Builder
//!
//! This module provides a type-safe SQL builder using the typestate pattern.
//! Structural mistakes (no FROM, two WHERE clauses) are caught at compile
//! time. WHERE clause contents are checked when the clause is attached, and
//! a statement that fails the check comes back as an inert invalid value.
//!
//! # Example
//!
//! ```rust
//! use sqlgate_core::builder::{Select, col};
//!
//! let (sql, params) = Select::new()
//!     .columns(&["id", "name"])
//!     .from("users")
//!     .where_clause(col("active").eq(true))
//!     .unwrap_valid()
//!     .build();
//!
//! assert_eq!(sql, "SELECT id, name FROM users WHERE active = ?");
//! assert_eq!(params.len(), 1);
//! ```
//!
//! A plain value is not a condition:
//!
//! ```rust
//! use sqlgate_core::builder::Delete;
//! use sqlgate_core::check::RuleId;
//!
//! let statement = Delete::new().from("users").where_clause(17);
//! assert_eq!(statement.rule(), Some(RuleId::NonBooleanExpression));
//! assert!(statement.build().is_err());
//! ```

pub mod aggregate;
mod delete;
mod expr;
mod select;
pub mod typed;
mod update;
pub mod value;
mod where_clause;

pub use aggregate::{avg, count, count_all, count_distinct, max, min, sum};
pub use delete::Delete;
pub use expr::{
    col, AggregateFunc, Assignment, Column, CompareOp, Expr, ExprBuilder, IntoExpr, LogicalOp,
};
pub use select::Select;
pub use typed::{
    dynamic_remove_from, dynamic_select_from, remove_from, select_from, typed_col, TypedDelete,
    TypedSelect,
};
pub use update::Update;
pub use value::{SqlValue, ToSqlValue};
pub use where_clause::{build_dynamic_clause, build_static_clause, WhereClause, WhereTarget};
