//! The Stripe webhook endpoint. Deliveries are verified against the raw body
//! before anything else looks at them.
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, State},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{
    constants::stripe::SIGNATURE_HEADER,
    services::{
        dreams::{self, errors::ConfirmationError, WebhookOutcome},
        events::Event,
        signature::errors::VerificationError,
    },
    state::AppState,
    utils::httperror::HttpError,
};

pub fn create_router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook_event))
}

/// A webhook event whose signature has been checked against the exact bytes
/// received.
pub struct VerifiedEvent(Event);

impl FromRequest<AppState> for VerifiedEvent {
    type Rejection = HttpError;

    async fn from_request(req: Request<Body>, state: &AppState) -> Result<Self, Self::Rejection> {
        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .ok_or(VerificationError::MissingSignature)?
            .to_str()
            .map_err(|_err| VerificationError::MalformedHeader)?
            .to_owned();

        let payload = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!(error = %rejection, "Could not read webhook body");
            HttpError::new(rejection.status(), "Webhook Error", Some(rejection.body_text()))
        })?;

        Ok(Self(state.verifier.verify(&payload, &signature)?))
    }
}

/// Body of every acknowledged delivery.
#[derive(Serialize)]
struct WebhookAck {
    received: bool,
}

async fn stripe_webhook_event(
    State(state): State<AppState>,
    VerifiedEvent(event): VerifiedEvent,
) -> Result<Json<WebhookAck>, HttpError> {
    let outcome = dreams::confirm_payment(&event, state.store.as_ref()).await?;
    if let WebhookOutcome::Recorded(dream) = &outcome {
        tracing::debug!(event_id = %event.id, dream_id = %dream.id, "Webhook handled");
    }
    Ok(Json(WebhookAck { received: true }))
}

impl From<VerificationError> for HttpError {
    fn from(error: VerificationError) -> Self {
        tracing::warn!(%error, "Rejected unverified webhook delivery");
        Self::new(
            StatusCode::BAD_REQUEST,
            "Webhook Error",
            Some(error.to_string()),
        )
    }
}

impl From<ConfirmationError> for HttpError {
    fn from(error: ConfirmationError) -> Self {
        match error {
            ConfirmationError::StoreError(err) => err.into(),
            ConfirmationError::MalformedEvent(err) => {
                tracing::warn!(error = %err, "Completed checkout event has no session object");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "Webhook Error",
                    Some(String::from("Event object is not a checkout session")),
                )
            }
        }
    }
}
