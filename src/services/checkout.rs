//! Creating hosted checkout sessions for dreams which have not been paid for yet.
//!
//! Drafts are never written to the store. The only copy of an unpaid dream is
//! the metadata on its checkout session; if the payment is abandoned the dream
//! is gone.
use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    constants::stripe::{DREAM_PRICE_CENTS, DREAM_PRODUCT_NAME, SESSION_ID_PLACEHOLDER},
    services::metadata::DreamMetadata,
};

/// A dream as submitted by the frontend form, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DreamDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
}

impl DreamDraft {
    /// Check that every required field is present and not blank, trimming
    /// surrounding whitespace. The first missing field is reported.
    pub fn validate(self) -> Result<DreamMetadata, errors::CheckoutError> {
        fn required(
            value: Option<String>,
            field: &'static str,
        ) -> Result<String, errors::CheckoutError> {
            value
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or(errors::CheckoutError::MissingField(field))
        }
        Ok(DreamMetadata {
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            author: required(self.author, "author")?,
            country: required(self.country, "country")?,
            language: self
                .language
                .map(|language| language.trim().to_owned())
                .filter(|language| !language.is_empty()),
        })
    }
}

/// Everything the payment processor needs to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    /// Charge in cents (USD), for a single unit.
    pub amount_cents: i64,
    pub product_name: String,
    pub product_description: String,
    /// Where the processor sends the user after paying. Contains the
    /// session id placeholder.
    pub success_url: String,
    /// Where the processor sends the user if they back out.
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionRequest {
    /// Build the request for a validated dream. The price is fixed.
    pub fn for_dream(dream: &DreamMetadata, frontend_url: &str) -> Self {
        Self {
            amount_cents: DREAM_PRICE_CENTS,
            product_name: DREAM_PRODUCT_NAME.to_owned(),
            product_description: format!(
                "Support a dream from {} ({})",
                dream.author, dream.country
            ),
            success_url: format!("{frontend_url}/success?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: format!("{frontend_url}/submit"),
            metadata: dream.to_metadata(),
        }
    }
}

/// A checkout session opened by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    /// The processor's session id. Becomes the dream's idempotency key.
    pub id: String,
    /// The hosted payment page to redirect the user to.
    pub url: String,
}

/// A payment processor able to open hosted checkout sessions.
#[async_trait]
pub trait CheckoutProcessor: Send + Sync {
    /// A short name for health reporting.
    fn provider(&self) -> &'static str;

    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, errors::ProcessorError>;
}

/// Opens checkout sessions with the Stripe API.
pub struct StripeCheckout {
    client: stripe::Client,
}

impl StripeCheckout {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: stripe::Client::new(secret_key),
        }
    }
}

#[async_trait]
impl CheckoutProcessor for StripeCheckout {
    fn provider(&self) -> &'static str {
        "stripe"
    }

    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, errors::ProcessorError> {
        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(stripe::CheckoutSessionMode::Payment);
        params.payment_method_types =
            Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.success_url = Some(request.success_url.as_str());
        params.cancel_url = Some(request.cancel_url.as_str());
        params.metadata = Some(request.metadata.clone());
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: stripe::Currency::USD,
                unit_amount: Some(request.amount_cents),
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.product_name.clone(),
                    description: Some(request.product_description.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);
        let session = stripe::CheckoutSession::create(&self.client, params).await?;
        let url = session
            .url
            .ok_or_else(|| errors::ProcessorError::new("Checkout session has no payment URL"))?;
        Ok(CreatedSession {
            id: session.id.to_string(),
            url,
        })
    }
}

/// Validate a draft and open a checkout session carrying it.
///
/// Nothing is sent to the processor unless the draft is valid, and nothing is
/// stored either way.
pub async fn create_checkout_session(
    draft: DreamDraft,
    frontend_url: &str,
    processor: &dyn CheckoutProcessor,
) -> Result<CreatedSession, errors::CheckoutError> {
    let dream = draft.validate()?;
    tracing::info!(
        author = %dream.author,
        country = %dream.country,
        "Creating checkout session (dream is not stored until paid)"
    );
    let request = CheckoutSessionRequest::for_dream(&dream, frontend_url);
    let session = processor.create_session(&request).await?;
    tracing::info!(session_id = %session.id, "Checkout session created");
    Ok(session)
}

pub mod errors {
    use thiserror::Error;

    /// An error returned by the payment processor.
    #[derive(Error, Debug)]
    #[error("{0}")]
    pub struct ProcessorError(String);

    impl ProcessorError {
        pub fn new(message: impl Into<String>) -> Self {
            Self(message.into())
        }
    }

    impl From<stripe::StripeError> for ProcessorError {
        fn from(err: stripe::StripeError) -> Self {
            Self(err.to_string())
        }
    }

    #[derive(Error, Debug)]
    pub enum CheckoutError {
        #[error("Required field {0} is missing or empty")]
        MissingField(&'static str),
        #[error(transparent)]
        ProcessorError(#[from] ProcessorError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::stripe::metadata as keys;
    use std::sync::Mutex;

    fn draft() -> DreamDraft {
        DreamDraft {
            title: Some(" See the ocean ".to_owned()),
            description: Some("...".to_owned()),
            author: Some("Ana".to_owned()),
            country: Some("Brazil".to_owned()),
            language: None,
        }
    }

    #[derive(Default)]
    struct RecordingProcessor {
        requests: Mutex<Vec<CheckoutSessionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl CheckoutProcessor for RecordingProcessor {
        fn provider(&self) -> &'static str {
            "recording"
        }

        async fn create_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> Result<CreatedSession, errors::ProcessorError> {
            self.requests.lock().expect("not poisoned").push(request.clone());
            if self.fail {
                return Err(errors::ProcessorError::new("connection reset"));
            }
            Ok(CreatedSession {
                id: "cs_test_1".to_owned(),
                url: "https://checkout.example/cs_test_1".to_owned(),
            })
        }
    }

    #[test]
    fn request_carries_fixed_price_and_all_fields() {
        let dream = draft().validate().expect("valid");
        let request = CheckoutSessionRequest::for_dream(&dream, "https://dreams.example");
        assert_eq!(request.amount_cents, 100);
        assert_eq!(request.product_name, "Dream Submission");
        assert_eq!(request.product_description, "Support a dream from Ana (Brazil)");
        assert_eq!(
            request.success_url,
            "https://dreams.example/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(request.cancel_url, "https://dreams.example/submit");
        assert_eq!(request.metadata.get(keys::TITLE).map(String::as_str), Some("See the ocean"));
        assert_eq!(request.metadata.get(keys::LANGUAGE).map(String::as_str), Some(""));
        assert_eq!(DreamMetadata::from_metadata(&request.metadata), Some(dream));
    }

    #[test]
    fn each_required_field_is_checked() {
        for (field, strip) in [
            ("title", (|d: &mut DreamDraft| d.title = None) as fn(&mut DreamDraft)),
            ("description", |d| d.description = Some(String::new())),
            ("author", |d| d.author = Some("   ".to_owned())),
            ("country", |d| d.country = None),
        ] {
            let mut incomplete = draft();
            strip(&mut incomplete);
            assert!(matches!(
                incomplete.validate(),
                Err(errors::CheckoutError::MissingField(missing)) if missing == field
            ));
        }
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_processor() {
        let processor = RecordingProcessor::default();
        let incomplete = DreamDraft {
            country: None,
            ..draft()
        };
        let result = create_checkout_session(incomplete, "http://localhost", &processor).await;
        assert!(matches!(result, Err(errors::CheckoutError::MissingField("country"))));
        assert!(processor.requests.lock().expect("not poisoned").is_empty());
    }

    #[tokio::test]
    async fn processor_failure_is_returned() {
        let processor = RecordingProcessor {
            fail: true,
            ..Default::default()
        };
        let result = create_checkout_session(draft(), "http://localhost", &processor).await;
        assert!(matches!(result, Err(errors::CheckoutError::ProcessorError(_))));
        assert_eq!(processor.requests.lock().expect("not poisoned").len(), 1);
    }

    #[tokio::test]
    async fn valid_draft_returns_session() {
        let processor = RecordingProcessor::default();
        let session = create_checkout_session(draft(), "http://localhost", &processor)
            .await
            .expect("created");
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url, "https://checkout.example/cs_test_1");
    }
}
