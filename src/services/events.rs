//! Typed webhook events, and extraction of the paid dream they carry.
use serde::Deserialize;

use crate::{constants::stripe::CHECKOUT_SESSION_COMPLETED, services::metadata::DreamMetadata};

/// The logical type of a webhook event. Only completed checkouts are acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    CheckoutSessionCompleted,
    Other,
}

impl From<&str> for EventKind {
    fn from(event_type: &str) -> Self {
        if event_type == CHECKOUT_SESSION_COMPLETED {
            Self::CheckoutSessionCompleted
        } else {
            Self::Other
        }
    }
}

/// A webhook event whose signature has been verified.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// The processor's event id.
    pub id: String,
    /// The raw event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The object the event is about. Its shape depends on the event type, so
    /// it is only decoded once the type is known.
    pub object: serde_json::Value,
}

/// The parts of a checkout session this service cares about. Metadata is
/// left untyped so that a badly shaped bag is reported as missing rather than
/// failing the whole event.
#[derive(Debug, Clone, Deserialize)]
struct CheckoutSessionObject {
    id: String,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

/// What a verified event turned out to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The event is of a type this service does not act on.
    Ignored(String),
    /// A completed checkout whose metadata cannot describe a dream.
    MissingMetadata { session_id: String },
    /// A completed checkout paying for a dream.
    PaidDream {
        session_id: String,
        dream: DreamMetadata,
    },
}

impl Event {
    /// Decode an event from its (already verified) JSON body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }

    /// Pull the paid dream out of a completed checkout event.
    ///
    /// Fails only when a completed checkout's object is not a checkout session
    /// at all, i.e. has no string `id`. Events of other types and sessions without a usable title are
    /// reported, not failed, so that the processor stops redelivering them.
    pub fn extract(&self) -> Result<Extraction, serde_json::Error> {
        if self.kind() != EventKind::CheckoutSessionCompleted {
            return Ok(Extraction::Ignored(self.event_type.clone()));
        }
        let session: CheckoutSessionObject = serde_json::from_value(self.data.object.clone())?;
        let dream = session
            .metadata
            .as_ref()
            .and_then(DreamMetadata::from_json);
        Ok(match dream {
            Some(dream) => Extraction::PaidDream {
                session_id: session.id,
                dream,
            },
            None => Extraction::MissingMetadata {
                session_id: session.id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, object: serde_json::Value) -> Event {
        serde_json::from_value(json!({
            "id": "evt_1",
            "object": "event",
            "type": event_type,
            "data": { "object": object },
        }))
        .expect("valid event")
    }

    #[test]
    fn completed_checkout_yields_paid_dream() {
        let event = event(
            "checkout.session.completed",
            json!({
                "id": "sess_123",
                "object": "checkout.session",
                "payment_status": "paid",
                "metadata": {
                    "dream_title": "See the ocean",
                    "dream_description": "...",
                    "dream_author": "Ana",
                    "dream_country": "Brazil",
                    "dream_language": ""
                }
            }),
        );
        assert_eq!(event.kind(), EventKind::CheckoutSessionCompleted);
        assert_eq!(
            EventKind::from("checkout.session.expired"),
            EventKind::Other
        );
        let Extraction::PaidDream { session_id, dream } = event.extract().expect("decodes") else {
            panic!("expected a paid dream");
        };
        assert_eq!(session_id, "sess_123");
        assert_eq!(dream.title, "See the ocean");
        assert_eq!(dream.author, "Ana");
        assert_eq!(dream.country, "Brazil");
        assert_eq!(dream.language, None);
    }

    #[test]
    fn other_event_types_are_ignored() {
        let event = event("payment_intent.succeeded", json!({ "id": "pi_1" }));
        assert_eq!(
            event.extract().expect("decodes"),
            Extraction::Ignored("payment_intent.succeeded".to_owned())
        );
    }

    #[test]
    fn unusable_metadata_is_reported() {
        for object in [
            json!({ "id": "sess_1" }),
            json!({ "id": "sess_1", "metadata": null }),
            json!({ "id": "sess_1", "metadata": { "dream_author": "Ana" } }),
            json!({ "id": "sess_1", "metadata": { "dream_title": 5 } }),
            json!({ "id": "sess_1", "metadata": [] }),
        ] {
            assert_eq!(
                event("checkout.session.completed", object).extract().expect("decodes"),
                Extraction::MissingMetadata {
                    session_id: "sess_1".to_owned()
                }
            );
        }
    }

    #[test]
    fn completed_event_without_session_id_fails() {
        for object in [json!({ "metadata": {} }), json!({ "id": 42 }), json!([])] {
            assert!(event("checkout.session.completed", object).extract().is_err());
        }
    }
}
