//! Contains database models and interaction code.
pub mod models;
use sqlx::postgres::PgPoolOptions;

use crate::constants::db as constants;

/// An alias for the underlying DBMS specific pool type.
pub type ConnectionPool = sqlx::PgPool;

/// Initiate a pooled connection to the database.
pub async fn connect(database_url: &str) -> Result<ConnectionPool, errors::DatabaseError> {
    Ok(PgPoolOptions::new()
        .max_connections(constants::MAX_CONNECTIONS)
        .connect(database_url)
        .await?)
}

/// Bring the schema up to date with the bundled migrations.
pub async fn migrate(db_conn: &ConnectionPool) -> Result<(), errors::DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(db_conn)
        .await
        .map_err(sqlx::Error::from)?;
    Ok(())
}

pub mod errors {
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error(transparent)]
    pub struct DatabaseError(#[from] sqlx::Error);
}
