//! Turning a verdict into a usable or an inert statement.

use core::fmt;

use tracing::warn;

use super::rules::{RuleId, Verdict};

/// The sentinel returned when a WHERE clause failed its checks.
///
/// It holds no statement, so there is nothing to render or execute. The
/// violated rule is kept for diagnostics only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BadStatement {
    rule: RuleId,
}

impl BadStatement {
    /// The rule that rejected the statement.
    #[must_use]
    pub const fn rule(&self) -> RuleId {
        self.rule
    }
}

impl fmt::Display for BadStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid statement: {}", self.rule)
    }
}

impl std::error::Error for BadStatement {}

/// Result of building a WHERE clause: either the statement, ready for
/// further composition, or the [`BadStatement`] sentinel.
#[must_use = "an invalid statement must be handled, not ignored"]
#[derive(Debug, Clone)]
pub enum Gated<S> {
    /// The clause passed every rule.
    Valid(S),
    /// The clause violated a rule.
    Invalid(BadStatement),
}

/// Gates a statement on a verdict.
///
/// Violations are logged here, at construction time, long before anything
/// could reach a database.
pub fn gate<S>(verdict: Verdict, statement: S) -> Gated<S> {
    match verdict {
        Verdict::Consistent => Gated::Valid(statement),
        Verdict::Violation(rule) => {
            warn!(target: "sqlgate::check", rule = rule.name(), "{rule}");
            Gated::Invalid(BadStatement { rule })
        }
    }
}

impl<S> Gated<S> {
    /// Returns true if the statement is usable.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns true for the sentinel.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The rule that rejected the statement, for diagnostics.
    #[must_use]
    pub const fn rule(&self) -> Option<RuleId> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(bad) => Some(bad.rule),
        }
    }

    /// Borrows the statement if it is valid.
    #[must_use]
    pub const fn as_valid(&self) -> Option<&S> {
        match self {
            Self::Valid(statement) => Some(statement),
            Self::Invalid(_) => None,
        }
    }

    /// Mutably borrows the statement if it is valid.
    #[must_use]
    pub fn as_valid_mut(&mut self) -> Option<&mut S> {
        match self {
            Self::Valid(statement) => Some(statement),
            Self::Invalid(_) => None,
        }
    }

    /// Returns the statement if it is valid.
    #[must_use]
    pub fn valid(self) -> Option<S> {
        match self {
            Self::Valid(statement) => Some(statement),
            Self::Invalid(_) => None,
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<S, BadStatement> {
        match self {
            Self::Valid(statement) => Ok(statement),
            Self::Invalid(bad) => Err(bad),
        }
    }

    /// Continues composing a valid statement. The sentinel passes through.
    pub fn map<T, F: FnOnce(S) -> T>(self, f: F) -> Gated<T> {
        match self {
            Self::Valid(statement) => Gated::Valid(f(statement)),
            Self::Invalid(bad) => Gated::Invalid(bad),
        }
    }

    /// Continues composing with a step that may itself be gated.
    pub fn and_then<T, F: FnOnce(S) -> Gated<T>>(self, f: F) -> Gated<T> {
        match self {
            Self::Valid(statement) => f(statement),
            Self::Invalid(bad) => Gated::Invalid(bad),
        }
    }

    /// Returns the statement.
    ///
    /// # Panics
    ///
    /// Panics with the violated rule if the statement is invalid.
    #[track_caller]
    pub fn unwrap_valid(self) -> S {
        match self {
            Self::Valid(statement) => statement,
            Self::Invalid(bad) => panic!("called `Gated::unwrap_valid()` on an {bad}"),
        }
    }
}

impl<S> From<Gated<S>> for Result<S, BadStatement> {
    fn from(gated: Gated<S>) -> Self {
        gated.into_result()
    }
}
