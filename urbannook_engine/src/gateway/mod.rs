//! Payment gateway adapters.
//!
//! Gateways report payment outcomes through browser callbacks with their own field names. An adapter translates its
//! wire format into a [`GatewayCallback`], and the rest of the engine only ever sees that neutral shape. Signature
//! checking sits behind [`SignatureVerifier`] so that tests (and future gateways) can swap it out.
use serde_json::Value;
use thiserror::Error;

pub mod razorpay;

pub use razorpay::{RazorpayCallback, RazorpayCallbackError, RazorpayConfig, RazorpaySignatureVerifier};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("The gateway signing secret is not configured")]
    MissingSecret,
    #[error("Could not initialise the signature check: {0}")]
    InvalidKey(String),
}

/// What the gateway says happened to a payment.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    /// The gateway reported a failure. `code` is passed through as-is, since gateways do not always send a string.
    Failed { code: Option<Value>, description: Option<String> },
    /// The gateway reported a success, vouched for by a signature that still has to be checked.
    Signed { payment_id: Option<String>, signature: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCallback {
    /// The gateway's identifier for the checkout session. This is how the callback is matched to an order.
    pub gateway_order_ref: Option<String>,
    pub outcome: GatewayOutcome,
}

impl GatewayCallback {
    pub fn failed(gateway_order_ref: Option<String>, code: Option<Value>, description: Option<String>) -> Self {
        Self { gateway_order_ref, outcome: GatewayOutcome::Failed { code, description } }
    }

    pub fn signed(gateway_order_ref: Option<String>, payment_id: Option<String>, signature: Option<String>) -> Self {
        Self { gateway_order_ref, outcome: GatewayOutcome::Signed { payment_id, signature } }
    }

    /// The order reference, if present and not blank.
    pub fn order_ref(&self) -> Option<&str> {
        self.gateway_order_ref.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

pub trait SignatureVerifier {
    /// Returns `Ok(true)` only if `signature` was produced by the gateway for exactly this order and payment.
    fn verify(&self, gateway_order_ref: &str, payment_id: &str, signature: &str) -> Result<bool, GatewayError>;
}
