//! Defines the state shared across the Axum application.
use std::sync::Arc;

use crate::services::{checkout::CheckoutProcessor, signature::EventVerifier, store::DreamStore};

#[derive(Clone)]
/// The state struct shared across routers.
pub struct AppState {
    /// Where paid dreams are kept.
    pub store: Arc<dyn DreamStore>,
    /// The payment processor checkout sessions are opened with.
    pub checkout: Arc<dyn CheckoutProcessor>,
    /// Verifies webhook deliveries against the endpoint signing secret.
    pub verifier: Arc<EventVerifier>,
    /// Base URL of the frontend, for checkout redirects.
    pub frontend_url: Arc<str>,
}
