//! Turning a paid checkout into exactly one stored dream, and reading dreams
//! back for the public feed.
use time::OffsetDateTime;

use crate::{
    constants::api::RECENT_DREAMS_MAX_LIMIT,
    db::models::dream::{Dream, DreamInsert},
    services::{
        events::{Event, Extraction},
        store::{errors::StoreError, DreamStore, InsertOutcome},
    },
};

/// How a verified webhook event was handled. Every variant is acknowledged
/// to the processor with a success status.
#[derive(Debug)]
pub enum WebhookOutcome {
    /// The event type is not one this service acts on.
    Ignored { event_type: String },
    /// A completed checkout without a usable title. Acknowledged so that it is
    /// not redelivered forever.
    MissingMetadata { session_id: String },
    /// A dream for this session was already stored by an earlier delivery.
    AlreadyRecorded { session_id: String },
    /// The paid dream was stored.
    Recorded(Dream),
}

/// Act on a verified webhook event.
///
/// Safe to call any number of times, concurrently, for the same session: the
/// store refuses a second dream for a session, so at most one is ever written.
/// Store failures are returned so the processor retries the delivery later.
pub async fn confirm_payment(
    event: &Event,
    store: &dyn DreamStore,
) -> Result<WebhookOutcome, errors::ConfirmationError> {
    let (session_id, dream) = match event.extract()? {
        Extraction::Ignored(event_type) => {
            tracing::debug!(event_id = %event.id, %event_type, "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored { event_type });
        }
        Extraction::MissingMetadata { session_id } => {
            tracing::warn!(
                event_id = %event.id,
                %session_id,
                "Completed checkout has no dream title in its metadata, ignoring"
            );
            return Ok(WebhookOutcome::MissingMetadata { session_id });
        }
        Extraction::PaidDream { session_id, dream } => (session_id, dream),
    };
    tracing::info!(event_id = %event.id, %session_id, "Payment confirmed");

    if store.find_by_session(&session_id).await?.is_some() {
        tracing::info!(%session_id, "Dream already stored for this session");
        return Ok(WebhookOutcome::AlreadyRecorded { session_id });
    }

    let insert = DreamInsert {
        title: dream.title,
        description: dream.description,
        author: dream.author,
        country: dream.country,
        language: dream.language,
        stripe_session_id: session_id.clone(),
    };
    match store.insert_paid(insert, OffsetDateTime::now_utc()).await? {
        InsertOutcome::Inserted(stored) => {
            tracing::info!(%session_id, dream_id = %stored.id, "Paid dream stored");
            Ok(WebhookOutcome::Recorded(stored))
        }
        InsertOutcome::Duplicate => {
            tracing::info!(%session_id, "Concurrent delivery stored this dream first");
            Ok(WebhookOutcome::AlreadyRecorded { session_id })
        }
    }
}

/// The most recent paid dreams, newest first. `limit` is clamped to
/// `1..=RECENT_DREAMS_MAX_LIMIT`.
pub async fn recent_dreams(store: &dyn DreamStore, limit: u32) -> Result<Vec<Dream>, StoreError> {
    store.recent(limit.clamp(1, RECENT_DREAMS_MAX_LIMIT)).await
}

pub mod errors {
    use crate::services::store::errors::StoreError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ConfirmationError {
        /// A completed checkout event whose object is not a checkout session.
        #[error("Event object is not a checkout session: {0}")]
        MalformedEvent(#[from] serde_json::Error),
        #[error(transparent)]
        StoreError(#[from] StoreError),
    }
}
