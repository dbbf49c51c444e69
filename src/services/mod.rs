//! Services which correspond to routes and define core business logic.
pub mod checkout;
pub mod dreams;
pub mod events;
pub mod metadata;
pub mod signature;
pub mod store;
