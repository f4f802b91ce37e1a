pub mod snippet;
pub mod tag;
pub mod user;

/// True when `err` was caused by a unique-constraint violation in PostgreSQL.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
        )
    })
}
