//! Payment failure messages.
//!
//! Maps the error codes reported by the payment gateway (and the few that the engine synthesises itself) to a message
//! that is safe to show a customer, plus a flag telling the storefront whether to keep the cart for a retry.
//!
//! The lookup is total: unknown, blank or non-string codes resolve to [`DEFAULT_PAYMENT_FAILURE`].
use serde::Serialize;
use serde_json::Value;

/// Code used when the gateway reports a failure without a code.
pub const PAYMENT_FAILED: &str = "payment_failed";
/// Code used when a success callback carries a signature that does not verify.
pub const SIGNATURE_VERIFICATION_FAILED: &str = "signature_verification_failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailure {
    pub message: &'static str,
    pub preserve_cart: bool,
}

impl PaymentFailure {
    const fn retryable(message: &'static str) -> Self {
        Self { message, preserve_cart: true }
    }
}

pub const DEFAULT_PAYMENT_FAILURE: PaymentFailure =
    PaymentFailure::retryable("Payment could not be processed. Please try again later.");

pub const KNOWN_PAYMENT_ERRORS: [(&str, PaymentFailure); 11] = [
    (
        "BAD_REQUEST_ERROR",
        PaymentFailure::retryable("Payment request was incomplete. Please check your details and try again."),
    ),
    (
        "GATEWAY_ERROR",
        PaymentFailure::retryable(
            "Payment gateway is temporarily unavailable. Please try again or use a different payment method.",
        ),
    ),
    (
        "SERVER_ERROR",
        PaymentFailure::retryable("Payment service is having trouble right now. Please try again in a few minutes."),
    ),
    (PAYMENT_FAILED, PaymentFailure::retryable("Payment failed. Please try again or use a different payment method.")),
    (
        "payment_timeout",
        PaymentFailure::retryable("Payment timed out. Your cart has been saved, so please try again."),
    ),
    (
        "insufficient_funds",
        PaymentFailure::retryable(
            "Insufficient funds in your account. Please use a different card or contact your bank.",
        ),
    ),
    ("card_declined", PaymentFailure::retryable("Card declined. Please contact your bank or try another card.")),
    (
        "network_error",
        PaymentFailure::retryable(
            "Network connection was interrupted. Please check your connection and try again, or use another payment \
             method.",
        ),
    ),
    (
        "invalid_card",
        PaymentFailure::retryable("Card details are invalid. Please check your card information and try again."),
    ),
    (
        "authentication_failed",
        PaymentFailure::retryable("Payment authentication failed. Please try again or contact your bank."),
    ),
    (
        SIGNATURE_VERIFICATION_FAILED,
        PaymentFailure::retryable("Payment verification failed. Please contact support if amount was debited."),
    ),
];

/// Resolves a gateway error code. Codes are matched exactly (they are case-sensitive on the gateway side too).
pub fn lookup_payment_error(code: Option<&str>) -> PaymentFailure {
    code.and_then(|code| KNOWN_PAYMENT_ERRORS.iter().find(|(known, _)| *known == code))
        .map(|(_, failure)| *failure)
        .unwrap_or(DEFAULT_PAYMENT_FAILURE)
}

/// Resolves an error code straight off the wire. Anything that is not a JSON string gets the default entry.
pub fn lookup_payment_error_value(code: &Value) -> PaymentFailure {
    lookup_payment_error(code.as_str())
}
