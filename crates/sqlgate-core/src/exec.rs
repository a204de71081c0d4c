//! Execution boundary.
//!
//! The crate does not talk to databases itself. Drivers implement
//! [`Executor`]; statements implement [`BuildSql`]. A [`Gated`] statement
//! refuses to render or execute when it is the invalid sentinel, and does so
//! before the executor is touched.

use tracing::{debug, error};

use crate::builder::SqlValue;
use crate::check::Gated;
use crate::error::{Result, StatementError};

/// A statement that renders to parameterized SQL.
pub trait BuildSql {
    /// Renders the SQL text and its bound parameters.
    fn to_sql(&self) -> (String, Vec<SqlValue>);
}

/// Something that can run SQL, typically a database connection.
pub trait Executor {
    /// Driver error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> std::result::Result<u64, Self::Error>;
}

impl<S: BuildSql> Gated<S> {
    /// Renders the statement.
    ///
    /// Fails with [`StatementError::InvalidStatement`] for the sentinel.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        match self {
            Self::Valid(statement) => Ok(statement.to_sql()),
            Self::Invalid(bad) => Err(StatementError::InvalidStatement { rule: bad.rule() }),
        }
    }

    /// Renders the statement and executes it.
    ///
    /// The sentinel fails with [`StatementError::InvalidStatement`] without
    /// calling the executor.
    pub fn execute<E: Executor>(&self, executor: &mut E) -> Result<u64> {
        let (sql, params) = self.build().inspect_err(|err| {
            error!(target: "sqlgate::exec", %err, "refusing to execute invalid statement");
        })?;
        debug!(target: "sqlgate::exec", %sql, params = params.len(), "executing statement");
        executor
            .execute(&sql, &params)
            .map_err(|err| StatementError::Executor(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{gate, RuleId, Verdict};

    struct Fixed;

    impl BuildSql for Fixed {
        fn to_sql(&self) -> (String, Vec<SqlValue>) {
            (String::from("DELETE FROM t WHERE a = ?"), vec![SqlValue::Int(1)])
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail: bool,
    }

    impl Executor for Recorder {
        type Error = Reset;

        fn execute(
            &mut self,
            sql: &str,
            _params: &[SqlValue],
        ) -> std::result::Result<u64, Self::Error> {
            self.calls.push(String::from(sql));
            if self.fail {
                Err(Reset)
            } else {
                Ok(1)
            }
        }
    }

    #[test]
    fn test_valid_statement_executes() {
        let mut db = Recorder::default();
        let affected = gate(Verdict::Consistent, Fixed).execute(&mut db).unwrap();
        assert_eq!(affected, 1);
        assert_eq!(db.calls, vec!["DELETE FROM t WHERE a = ?"]);
    }

    #[test]
    fn test_invalid_statement_never_reaches_executor() {
        let mut db = Recorder::default();
        let err = gate(Verdict::Violation(RuleId::EmptyStaticClause), Fixed)
            .execute(&mut db)
            .unwrap_err();
        assert!(err.is_invalid_statement());
        assert!(matches!(
            err,
            StatementError::InvalidStatement {
                rule: RuleId::EmptyStaticClause
            }
        ));
        assert!(db.calls.is_empty());
    }

    #[test]
    fn test_executor_failure_is_distinct() {
        let mut db = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let err = gate(Verdict::Consistent, Fixed).execute(&mut db).unwrap_err();
        assert!(!err.is_invalid_statement());
        assert_eq!(err.to_string(), "executor error: connection reset");
    }
}
