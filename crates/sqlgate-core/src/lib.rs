//! # sqlgate-core
//!
//! A type-safe SQL builder that checks WHERE clauses before they can reach a
//! database.
//!
//! This crate provides:
//! - A type-safe SQL builder using the typestate pattern
//! - A WHERE clause checker: every condition must be a boolean expression,
//!   must not be an assignment and must not involve an aggregate function
//! - A gate that turns a statement failing the check into an inert invalid
//!   value which refuses to render or execute
//! - Protection against SQL injection through parameterized queries
//!
//! ## Checked WHERE clauses
//!
//! ```rust
//! use sqlgate_core::builder::{col, count, Delete};
//! use sqlgate_core::check::RuleId;
//!
//! // Valid: a comparison is a condition
//! let delete = Delete::new()
//!     .from("users")
//!     .where_clause(col("id").eq(1));
//! assert!(delete.is_valid());
//!
//! // Invalid: an assignment is not
//! let delete = Delete::new()
//!     .from("users")
//!     .where_clause(col("id").assign(1));
//! assert_eq!(delete.rule(), Some(RuleId::AssignmentNotAllowed));
//!
//! // Invalid: aggregates belong in HAVING
//! let delete = Delete::new()
//!     .from("users")
//!     .where_clause(count(col("id")).gt(1));
//! assert_eq!(delete.rule(), Some(RuleId::AggregateNotAllowed));
//! ```
//!
//! ## Dynamic WHERE clauses
//!
//! Statements created with `dynamic_from()` accept a clause that can grow:
//!
//! ```rust
//! use sqlgate_core::builder::{col, Select};
//!
//! let mut select = Select::new()
//!     .all()
//!     .dynamic_from("orders")
//!     .dynamic_where([col("total").gt(100)])
//!     .unwrap_valid();
//! select.add_where(col("status").eq("open")).unwrap();
//!
//! assert_eq!(
//!     select.build_sql(),
//!     "SELECT * FROM orders WHERE (total > ?) AND (status = ?)"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! All values are automatically parameterized:
//!
//! ```rust
//! use sqlgate_core::builder::{Select, col};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = Select::new()
//!     .columns(&["id"])
//!     .from("users")
//!     .where_clause(col("name").eq(user_input))
//!     .unwrap_valid()
//!     .build();
//!
//! assert_eq!(sql, "SELECT id FROM users WHERE name = ?");
//! assert_eq!(params.len(), 1);
//! ```

pub mod builder;
pub mod check;
pub mod error;
pub mod exec;
pub mod schema;

pub use builder::{col, Delete, Select, Update};
pub use check::{BadStatement, Gated, RuleId};
pub use error::{Result, StatementError};
pub use exec::{BuildSql, Executor};
pub use schema::{Column, Selectable, SqlType, Table, TypedColumn, ValueType};

#[cfg(feature = "derive")]
pub use sqlgate_derive::Table;
