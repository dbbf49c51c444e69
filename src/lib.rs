//! Backend for Monument of Dreams: dreams are submitted through a hosted
//! checkout, and stored only once the payment processor confirms payment.
pub mod config;
pub mod constants;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::status::create_router())
        .merge(routes::checkout::create_router())
        .nest("/webhook", routes::webhook::create_router())
        .nest("/dreams", routes::dreams::create_router())
        .with_state(state)
}
