//! The checkout-session endpoint the submission form posts to.
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    services::checkout::{self, errors::CheckoutError, DreamDraft},
    state::AppState,
    utils::httperror::HttpError,
};

pub fn create_router() -> Router<AppState> {
    Router::new().route(
        "/create-checkout-session",
        post(create_checkout_session).get(method_not_allowed),
    )
}

/// Request body from the submission form. Any price the client sends is
/// ignored; the charge is fixed server-side.
#[derive(Deserialize)]
struct CheckoutRequestBody {
    #[serde(default)]
    dream: Option<DreamDraft>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    success: bool,
    session_id: String,
    url: String,
}

fn invalid_dream() -> HttpError {
    HttpError::new(StatusCode::BAD_REQUEST, "Invalid dream data", None)
}

async fn create_checkout_session(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequestBody>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, HttpError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Unreadable checkout request");
        invalid_dream()
    })?;
    let draft = body.dream.ok_or_else(|| {
        tracing::warn!("Checkout request without a dream");
        invalid_dream()
    })?;
    let session =
        checkout::create_checkout_session(draft, &state.frontend_url, state.checkout.as_ref())
            .await?;
    Ok(Json(CheckoutResponse {
        success: true,
        session_id: session.id,
        url: session.url,
    }))
}

async fn method_not_allowed() -> HttpError {
    HttpError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        Some(String::from("Use POST")),
    )
}

impl From<CheckoutError> for HttpError {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::MissingField(field) => {
                tracing::warn!(field, "Checkout request is missing a required field");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "Invalid dream data",
                    Some(format!("{field} is required")),
                )
            }
            CheckoutError::ProcessorError(err) => {
                tracing::error!(error = %err, "Payment processor error when creating checkout session");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Payment failed",
                    Some(err.to_string()),
                )
            }
        }
    }
}
