//! Constants related to the general configuration of the API and its deployment.

/// Environment variable holding the public URL of the single-page frontend.
pub const FRONTEND_URL_VAR: &str = "FRONTEND_URL";
/// Frontend URL used when `FRONTEND_URL` is not set.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:8080";

/// Environment variable holding the port to listen on.
pub const PORT_VAR: &str = "PORT";
/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3001;

/// Environment variable holding the address to bind to.
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
/// Bind address used when `BIND_ADDRESS` is not set.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Number of dreams returned by the recent feed when no limit is given.
pub const RECENT_DREAMS_DEFAULT_LIMIT: u32 = 3;
/// Upper bound on the recent feed page size.
pub const RECENT_DREAMS_MAX_LIMIT: u32 = 50;
