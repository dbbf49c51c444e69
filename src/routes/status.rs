//! Root and health check routes.
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

async fn root() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Dreams Backend Root",
        "time": now(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "checkoutProvider": state.checkout.provider(),
        "frontendUrl": &*state.frontend_url,
        "timestamp": now(),
    }))
}
