//! Stripe related constants: the fixed price of a submission, the metadata keys
//! carried on a checkout session, and the environment variables holding keys.

/// Environment variable holding the Stripe API secret key.
pub const STRIPE_SECRET_KEY_VAR: &str = "STRIPE_SECRET_KEY";
/// Environment variable holding the webhook endpoint signing secret.
pub const STRIPE_WEBHOOK_SECRET_VAR: &str = "STRIPE_WEBHOOK_SECRET";
/// Environment variable overriding the webhook timestamp tolerance, in seconds.
pub const STRIPE_WEBHOOK_TOLERANCE_VAR: &str = "STRIPE_WEBHOOK_TOLERANCE_SECS";

/// Default tolerance between the signed timestamp and the local clock.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: u64 = 300;

/// Name of the header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// The flat price of one dream submission, in cents (USD).
pub const DREAM_PRICE_CENTS: i64 = 100;
/// Product name shown on the hosted checkout page.
pub const DREAM_PRODUCT_NAME: &str = "Dream Submission";

/// Placeholder Stripe substitutes with the real session id in redirect URLs.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Event type carrying a completed (paid) checkout session.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Metadata keys a dream is stored under on the checkout session.
pub mod metadata {
    pub const TITLE: &str = "dream_title";
    pub const DESCRIPTION: &str = "dream_description";
    pub const AUTHOR: &str = "dream_author";
    pub const COUNTRY: &str = "dream_country";
    pub const LANGUAGE: &str = "dream_language";
}
