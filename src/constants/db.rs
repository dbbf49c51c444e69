//! Database connection related constants.

/// Environment variable holding the Postgres connection URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Maximum number of pooled database connections.
pub const MAX_CONNECTIONS: u32 = 10;
