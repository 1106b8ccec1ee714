//! Razorpay checkout callbacks.
//!
//! Razorpay's checkout widget posts either a success triple (`razorpay_order_id`, `razorpay_payment_id`,
//! `razorpay_signature`) or an `error` object. The signature is the lowercase hex HMAC-SHA256 of
//! `"<razorpay_order_id>|<razorpay_payment_id>"`, keyed with the account's key secret.
use std::env;

use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use urbannook_common::Secret;

use crate::gateway::{GatewayCallback, GatewayError, SignatureVerifier};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
}

impl RazorpayConfig {
    pub fn new<S: Into<String>>(key_id: S, key_secret: S) -> Self {
        Self { key_id: key_id.into(), key_secret: Secret::new(key_secret.into()) }
    }

    pub fn from_env_or_default() -> Self {
        let key_id = env::var("UN_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🪛️ UN_RAZORPAY_KEY_ID is not set. Payment callbacks can still be verified, but checkout will fail.");
            String::default()
        });
        let key_secret = env::var("UN_RAZORPAY_KEY_SECRET").map(Secret::new).unwrap_or_else(|_| {
            error!(
                "🪛️ UN_RAZORPAY_KEY_SECRET is not set. Every payment signature check will fail until it is \
                 configured."
            );
            Secret::default()
        });
        Self { key_id, key_secret }
    }
}

#[derive(Debug, Clone)]
pub struct RazorpaySignatureVerifier {
    key_secret: Secret<String>,
}

impl RazorpaySignatureVerifier {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self { key_secret: config.key_secret.clone() }
    }

    fn mac_for(&self, gateway_order_ref: &str, payment_id: &str) -> Result<HmacSha256, GatewayError> {
        if self.key_secret.is_empty() {
            return Err(GatewayError::MissingSecret);
        }
        let mut mac = HmacSha256::new_from_slice(self.key_secret.reveal().as_bytes())
            .map_err(|e| GatewayError::InvalidKey(e.to_string()))?;
        mac.update(gateway_order_ref.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(mac)
    }

    /// Produces the signature Razorpay would send for this order and payment.
    pub fn sign(&self, gateway_order_ref: &str, payment_id: &str) -> Result<String, GatewayError> {
        let mac = self.mac_for(gateway_order_ref, payment_id)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl SignatureVerifier for RazorpaySignatureVerifier {
    fn verify(&self, gateway_order_ref: &str, payment_id: &str, signature: &str) -> Result<bool, GatewayError> {
        let mac = self.mac_for(gateway_order_ref, payment_id)?;
        let Ok(expected) = hex::decode(signature.trim()) else {
            debug!("💳️ Signature for {gateway_order_ref} is not valid hex");
            return Ok(false);
        };
        // verify_slice compares in constant time
        Ok(mac.verify_slice(&expected).is_ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RazorpayCallbackError {
    pub code: Option<Value>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub step: Option<String>,
    pub reason: Option<String>,
    pub metadata: Option<RazorpayErrorMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RazorpayErrorMetadata {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
}

/// The body Razorpay's checkout posts back to the storefront.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RazorpayCallback {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub error: Option<RazorpayCallbackError>,
}

impl From<RazorpayCallback> for GatewayCallback {
    fn from(value: RazorpayCallback) -> Self {
        match value.error {
            Some(error) => {
                // Failure payloads sometimes only carry the order id inside the error metadata
                let order_ref = value.razorpay_order_id.or_else(|| error.metadata.and_then(|m| m.order_id));
                GatewayCallback::failed(order_ref, error.code, error.description)
            },
            None => {
                GatewayCallback::signed(value.razorpay_order_id, value.razorpay_payment_id, value.razorpay_signature)
            },
        }
    }
}
