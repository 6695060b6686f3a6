use sqlx::PgPool;

/// Executes data-access messages against the connection pool.
///
/// Every SQL statement in this crate is a message type with a
/// [`kanau::processor::Processor`] impl on this struct.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
