//! Read-only access to paid dreams for the landing page feed.
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::api::RECENT_DREAMS_DEFAULT_LIMIT,
    db::models::dream::Dream,
    services::dreams,
    state::AppState,
    utils::httperror::HttpError,
};

pub fn create_router() -> Router<AppState> {
    Router::new().route("/recent", get(recent_dreams))
}

#[derive(Deserialize)]
struct RecentDreamsQuery {
    limit: Option<u32>,
}

#[derive(Serialize)]
struct RecentDreamsResponse {
    dreams: Vec<Dream>,
}

async fn recent_dreams(
    State(state): State<AppState>,
    Query(params): Query<RecentDreamsQuery>,
) -> Result<Json<RecentDreamsResponse>, HttpError> {
    let limit = params.limit.unwrap_or(RECENT_DREAMS_DEFAULT_LIMIT);
    Ok(Json(RecentDreamsResponse {
        dreams: dreams::recent_dreams(state.store.as_ref(), limit).await?,
    }))
}
