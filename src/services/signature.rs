//! Verification of signed webhook deliveries.
//!
//! The signature header has the form `t=<unix time>,v1=<hex hmac>[,v1=...]`.
//! The signed payload is `<t>.<raw body>` and the MAC is HMAC-SHA256 keyed with
//! the endpoint's signing secret. More than one `v1` entry may be present while
//! a secret is being rolled; any one of them matching is enough.
use core::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::services::events::Event;

type HmacSha256 = Hmac<Sha256>;

/// Checks webhook payloads against the endpoint signing secret.
#[derive(Clone)]
pub struct EventVerifier {
    secret: Vec<u8>,
    tolerance: Duration,
}

/// The components of a signature header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

impl EventVerifier {
    pub fn new(secret: &str, tolerance: Duration) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            tolerance,
        }
    }

    /// Verify a delivery against the current clock and decode its event.
    ///
    /// `payload` must be the request body exactly as received; any
    /// re-encoding before this point breaks the signature.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<Event, errors::VerificationError> {
        self.verify_at(payload, header, OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Verify a delivery as if the current time were `now` (unix seconds).
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> Result<Event, errors::VerificationError> {
        let header = parse_header(header)?;
        let mac = self.mac_for(header.timestamp, payload);
        let matched = header
            .signatures
            .iter()
            .filter_map(|candidate| hex::decode(candidate).ok())
            .any(|candidate| mac.clone().verify_slice(&candidate).is_ok());
        if !matched {
            return Err(errors::VerificationError::SignatureInvalid);
        }
        let age = now.saturating_sub(header.timestamp);
        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if age.saturating_abs() > tolerance {
            return Err(errors::VerificationError::TimestampExpired {
                age_seconds: age,
                tolerance_seconds: tolerance,
            });
        }
        Ok(Event::from_slice(payload)?)
    }

    /// Produce a signature header for `payload` signed at `timestamp`, in the
    /// same format the payment processor sends. Useful for replaying events
    /// against a local instance.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let signature = hex::encode(self.mac_for(timestamp, payload).finalize().into_bytes());
        format!("t={timestamp},v1={signature}")
    }

    fn mac_for(&self, timestamp: i64, payload: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }
}

fn parse_header(header: &str) -> Result<SignatureHeader, errors::VerificationError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse()
                        .map_err(|_err| errors::VerificationError::MalformedHeader)?,
                );
            }
            Some(("v1", value)) => signatures.push(value.to_owned()),
            // other schemes (v0) are not trusted
            _ => {}
        }
    }
    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(errors::VerificationError::MalformedHeader),
    }
}

pub mod errors {
    use thiserror::Error;

    /// Reasons a webhook delivery is rejected before it is acted on.
    #[derive(Error, Debug)]
    pub enum VerificationError {
        #[error("Missing signature header")]
        MissingSignature,
        #[error("Signature header is malformed")]
        MalformedHeader,
        #[error("No signature matches the payload")]
        SignatureInvalid,
        #[error("Signature timestamp is {age_seconds}s from now (tolerance {tolerance_seconds}s)")]
        TimestampExpired {
            age_seconds: i64,
            tolerance_seconds: i64,
        },
        #[error("Verified payload is not a valid event: {0}")]
        MalformedEvent(#[from] serde_json::Error),
    }
}
