//! Typed repository failures
//!
//! Most store errors travel as `anyhow::Error` with context attached. The
//! ones services need to react to are raised as [`RepositoryError`] so they
//! can be recovered with `downcast_ref`.

/// Store failures with a meaning above the database layer
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A UNIQUE constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

/// Convert a failed write, keeping unique violations typed.
pub fn write_error(err: sqlx::Error, context: &'static str) -> anyhow::Error {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::UniqueViolation(db.message().to_string()).into()
        }
        other => anyhow::Error::new(other).context(context),
    }
}

/// Whether a repository error came from a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::UniqueViolation(_))
    )
}
