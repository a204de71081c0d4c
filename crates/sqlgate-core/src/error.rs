//! Error types for building and executing statements.

use thiserror::Error;

use crate::check::RuleId;

/// Errors raised when a statement is rendered or executed.
#[derive(Debug, Error)]
pub enum StatementError {
    /// The statement failed WHERE clause validation when it was built, so it
    /// was never sent anywhere.
    #[error("invalid statement, not sent to the database: {rule}")]
    InvalidStatement {
        /// The violated rule.
        rule: RuleId,
    },

    /// The executor accepted the statement but failed to run it.
    #[error("executor error: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StatementError {
    /// Returns true if the statement never left the builder.
    #[must_use]
    pub const fn is_invalid_statement(&self) -> bool {
        matches!(self, Self::InvalidStatement { .. })
    }
}

/// Result type alias for statement operations.
pub type Result<T> = std::result::Result<T, StatementError>;
