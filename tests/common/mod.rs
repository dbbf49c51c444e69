#![allow(dead_code, reason = "each test binary uses a different subset")]
use core::time::Duration;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt as _;
use monument_api::{
    app,
    services::{
        checkout::{errors::ProcessorError, CheckoutProcessor, CheckoutSessionRequest, CreatedSession},
        signature::EventVerifier,
        store::{DreamStore, MemoryDreamStore},
    },
    state::AppState,
};
use time::OffsetDateTime;

pub const WEBHOOK_SECRET: &str = "whsec_integration_test";

/// A processor that never talks to the network.
#[derive(Default)]
pub struct FakeProcessor {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl CheckoutProcessor for FakeProcessor {
    fn provider(&self) -> &'static str {
        "fake"
    }

    async fn create_session(
        &self,
        _request: &CheckoutSessionRequest,
    ) -> Result<CreatedSession, ProcessorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProcessorError::new("api.stripe.com: connection reset"));
        }
        Ok(CreatedSession {
            id: format!("cs_test_{call}"),
            url: format!("https://checkout.stripe.test/pay/cs_test_{call}"),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDreamStore>,
    pub processor: Arc<FakeProcessor>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_processor(FakeProcessor::default())
    }

    pub fn with_processor(processor: FakeProcessor) -> Self {
        let store = Arc::new(MemoryDreamStore::new());
        let processor = Arc::new(processor);
        Self::with_store(store.clone() as Arc<dyn DreamStore>, store, processor)
    }

    pub fn with_store(
        store: Arc<dyn DreamStore>,
        memory: Arc<MemoryDreamStore>,
        processor: Arc<FakeProcessor>,
    ) -> Self {
        let state = AppState {
            store,
            checkout: processor.clone(),
            verifier: Arc::new(verifier()),
            frontend_url: Arc::from("https://dreams.test"),
        };
        Self {
            router: app(state),
            store: memory,
            processor,
        }
    }
}

pub fn verifier() -> EventVerifier {
    EventVerifier::new(WEBHOOK_SECRET, Duration::from_secs(300))
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// A signed webhook delivery for `payload`, signed at `timestamp`.
pub fn webhook_request(payload: &str, timestamp: i64) -> Request<Body> {
    Request::post("/webhook/stripe")
        .header("content-type", "application/json")
        .header("stripe-signature", verifier().sign(payload.as_bytes(), timestamp))
        .body(Body::from(payload.to_owned()))
        .expect("valid request")
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("valid request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn completed_session(session_id: &str, metadata: &serde_json::Value) -> String {
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "object": "event",
        "type": "checkout.session.completed",
        "livemode": false,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "mode": "payment",
                "payment_status": "paid",
                "amount_total": 100,
                "currency": "usd",
                "metadata": metadata,
            }
        }
    })
    .to_string()
}
