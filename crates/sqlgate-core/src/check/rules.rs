//! WHERE clause consistency rules.
//!
//! The rules form an ordered table. `check` walks the table top to bottom
//! and reports the first rule that is violated, so a clause that breaks
//! several rules at once always gets the same diagnosis. Clause-level rules
//! come first; each expression-level rule scans every expression before the
//! next rule is consulted.

use thiserror::Error as ThisError;
use tracing::debug;

use crate::builder::ExprBuilder;

use super::classify::{classify, ExprFacts};

///
/// RuleId
///
/// Identifies a violated WHERE clause rule. The `Display` text is the
/// diagnostic shown to the caller.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, ThisError)]
pub enum RuleId {
    #[error("dynamic_where() requires a statement constructed with dynamic clause support")]
    DynamicNotSupported,

    #[error("where() requires at least one expression")]
    EmptyStaticClause,

    #[error("where() arguments must be conditions, not assignments")]
    AssignmentNotAllowed,

    #[error("where() arguments must be boolean expressions")]
    NonBooleanExpression,

    #[error("where() arguments must not contain aggregate functions")]
    AggregateNotAllowed,
}

impl RuleId {
    /// All rules, in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::DynamicNotSupported,
        Self::EmptyStaticClause,
        Self::AssignmentNotAllowed,
        Self::NonBooleanExpression,
        Self::AggregateNotAllowed,
    ];

    /// Stable identifier, suitable for logs and metrics labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DynamicNotSupported => "dynamic_not_supported",
            Self::EmptyStaticClause => "empty_static_clause",
            Self::AssignmentNotAllowed => "assignment_not_allowed",
            Self::NonBooleanExpression => "non_boolean_expression",
            Self::AggregateNotAllowed => "aggregate_not_allowed",
        }
    }
}

/// How the clause is being built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClauseMode {
    /// All expressions are given at once; at least one is required.
    Static,
    /// Expressions may be added later; zero is fine.
    Dynamic,
}

/// Whether a statement accepts a dynamically growing WHERE clause.
///
/// Fixed when the statement is constructed and only ever read afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum DynamicCapability {
    /// The statement was constructed for dynamic clauses.
    Supported,
    /// The statement was constructed with a fixed set of clauses.
    #[default]
    Unsupported,
}

impl DynamicCapability {
    /// Returns true for [`DynamicCapability::Supported`].
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Supported)
    }
}

impl From<bool> for DynamicCapability {
    fn from(supported: bool) -> Self {
        if supported {
            Self::Supported
        } else {
            Self::Unsupported
        }
    }
}

/// Outcome of a consistency check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// No rule is violated.
    Consistent,
    /// The first violated rule.
    Violation(RuleId),
}

impl Verdict {
    /// Returns true for [`Verdict::Consistent`].
    #[must_use]
    pub const fn is_consistent(self) -> bool {
        matches!(self, Self::Consistent)
    }

    /// Returns the violated rule, if any.
    #[must_use]
    pub const fn violation(self) -> Option<RuleId> {
        match self {
            Self::Consistent => None,
            Self::Violation(rule) => Some(rule),
        }
    }

    /// Converts the verdict into a `Result`.
    pub const fn into_result(self) -> Result<(), RuleId> {
        match self {
            Self::Consistent => Ok(()),
            Self::Violation(rule) => Err(rule),
        }
    }
}

struct ClauseShape<'a> {
    mode: ClauseMode,
    capability: DynamicCapability,
    exprs: &'a [ExprFacts],
}

enum Scope {
    Clause(fn(&ClauseShape<'_>) -> bool),
    EachExpr(fn(&ExprFacts) -> bool),
}

struct Rule {
    id: RuleId,
    scope: Scope,
}

impl Rule {
    fn is_violated(&self, shape: &ClauseShape<'_>) -> bool {
        match self.scope {
            Scope::Clause(violated) => violated(shape),
            Scope::EachExpr(violated) => shape.exprs.iter().any(violated),
        }
    }
}

const RULES: [Rule; 5] = [
    Rule {
        id: RuleId::DynamicNotSupported,
        scope: Scope::Clause(|shape| {
            shape.mode == ClauseMode::Dynamic && !shape.capability.is_supported()
        }),
    },
    Rule {
        id: RuleId::EmptyStaticClause,
        scope: Scope::Clause(|shape| shape.mode == ClauseMode::Static && shape.exprs.is_empty()),
    },
    Rule {
        id: RuleId::AssignmentNotAllowed,
        scope: Scope::EachExpr(|facts| facts.is_assignment),
    },
    Rule {
        id: RuleId::NonBooleanExpression,
        scope: Scope::EachExpr(|facts| !facts.is_boolean),
    },
    Rule {
        id: RuleId::AggregateNotAllowed,
        scope: Scope::EachExpr(|facts| facts.references_aggregate),
    },
];

/// Checks a clause described by classified expressions.
#[must_use]
pub fn check(mode: ClauseMode, capability: DynamicCapability, exprs: &[ExprFacts]) -> Verdict {
    let shape = ClauseShape {
        mode,
        capability,
        exprs,
    };
    let verdict = RULES
        .iter()
        .find(|rule| rule.is_violated(&shape))
        .map_or(Verdict::Consistent, |rule| Verdict::Violation(rule.id));
    debug!(
        target: "sqlgate::check",
        ?mode,
        ?capability,
        expressions = exprs.len(),
        ?verdict,
        "checked where clause"
    );
    verdict
}

/// Classifies and checks a list of expressions.
#[must_use]
pub fn check_exprs<'a, I>(mode: ClauseMode, capability: DynamicCapability, exprs: I) -> Verdict
where
    I: IntoIterator<Item = &'a ExprBuilder>,
{
    let facts: Vec<ExprFacts> = exprs.into_iter().map(classify).collect();
    check(mode, capability, &facts)
}
