//! WHERE clause validation.
//!
//! Validation happens in three steps, each a pure function of its inputs:
//!
//! 1. [`classify`] reduces every candidate condition to [`ExprFacts`].
//! 2. [`check`] runs the ordered rule table over those facts and the clause
//!    mode, yielding a [`Verdict`].
//! 3. [`gate`] turns the verdict into a [`Gated`] statement: either the
//!    statement itself, or the inert [`BadStatement`] sentinel.
//!
//! The statement builders call these through
//! [`build_static_clause`](crate::builder::build_static_clause) and
//! [`build_dynamic_clause`](crate::builder::build_dynamic_clause).
//!
//! ```rust
//! use sqlgate_core::builder::{col, Delete};
//! use sqlgate_core::check::RuleId;
//!
//! let gated = Delete::new().from("users").where_clause(col("id").assign(1));
//! assert_eq!(gated.rule(), Some(RuleId::AssignmentNotAllowed));
//! ```

mod classify;
mod gate;
mod rules;

pub use classify::{classify, classify_expr, ExprFacts};
pub use gate::{gate, BadStatement, Gated};
pub use rules::{check, check_exprs, ClauseMode, DynamicCapability, RuleId, Verdict};
