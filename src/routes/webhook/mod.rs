//! Webhook API endpoints, used for handling payment processor events.
use axum::Router;

use crate::state::AppState;

mod stripe;

/// Creates a router for all webhook interfaces.
pub fn create_router() -> Router<AppState> {
    Router::new().merge(stripe::create_router())
}
