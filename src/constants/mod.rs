//! Constants (fixed values and environment variable names) used across the application.
pub mod api;
pub mod db;
pub mod secrets;
pub mod stripe;
