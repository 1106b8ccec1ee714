use std::fmt::Debug;

use chrono::Utc;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    db::traits::OrderManagement,
    db_types::{Order, OrderStatusType},
    engine_api::{errors::PaymentVerificationError, order_status_api::OrderStatusApi},
    envelope::Envelope,
    events::PaymentFailedEvent,
    gateway::{GatewayCallback, GatewayOutcome, SignatureVerifier},
    notifications::{Notification, NotificationRequest},
    payment_errors::{lookup_payment_error, PAYMENT_FAILED, SIGNATURE_VERIFICATION_FAILED},
};

/// The payment method shown on receipts for gateway-verified payments.
pub const GATEWAY_PAYMENT_METHOD: &str = "Razorpay";

/// Who is reporting the payment. Resolved by whatever authenticates the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: Option<String>,
}

impl CallerIdentity {
    pub fn new<S: Into<String>>(user_id: S) -> Self {
        Self { user_id: Some(user_id.into()) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// `PaymentVerificationApi` finalises a checkout once the payment gateway reports back.
///
/// A gateway-reported failure, or a success whose signature does not check out, marks the order as `FAILED` and
/// answers with a customer-safe message. A verified success is handed to [`OrderStatusApi::record_verified_payment`].
pub struct PaymentVerificationApi<B, V> {
    orders: OrderStatusApi<B>,
    verifier: V,
}

impl<B, V> Debug for PaymentVerificationApi<B, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentVerificationApi")
    }
}

impl<B, V> PaymentVerificationApi<B, V> {
    pub fn new(orders: OrderStatusApi<B>, verifier: V) -> Self {
        Self { orders, verifier }
    }

    pub fn orders(&self) -> &OrderStatusApi<B> {
        &self.orders
    }
}

impl<B, V> PaymentVerificationApi<B, V>
where
    B: OrderManagement,
    V: SignatureVerifier,
{
    pub async fn verify_and_finalize_payment(&self, caller: &CallerIdentity, callback: GatewayCallback) -> Envelope {
        match self.try_verify_and_finalize(caller, callback).await {
            Ok(envelope) => envelope,
            Err(e) => e.into(),
        }
    }

    async fn try_verify_and_finalize(
        &self,
        caller: &CallerIdentity,
        callback: GatewayCallback,
    ) -> Result<Envelope, PaymentVerificationError> {
        let Some(user_id) = caller.user_id() else {
            warn!("💳️ Payment callback received without a caller identity");
            return Err(PaymentVerificationError::UnknownUser);
        };
        let Some(gateway_ref) = callback.order_ref() else {
            warn!("💳️ Payment callback from {user_id} has no order reference");
            return Err(PaymentVerificationError::MissingOrderRef);
        };
        match &callback.outcome {
            GatewayOutcome::Failed { code, description } => {
                let code = error_code_from(code.as_ref());
                info!(
                    "💳️ Gateway reported a failed payment for {gateway_ref}: {code} ({})",
                    description.as_deref().unwrap_or("no description")
                );
                self.record_failure(gateway_ref, &code).await
            },
            GatewayOutcome::Signed { payment_id, signature } => {
                let payment_id = payment_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
                let signature = signature.as_deref().map(str::trim).filter(|s| !s.is_empty());
                let (Some(payment_id), Some(signature)) = (payment_id, signature) else {
                    warn!("💳️ Success callback for {gateway_ref} is missing its payment id or signature");
                    return self.record_failure(gateway_ref, SIGNATURE_VERIFICATION_FAILED).await;
                };
                if !self.verifier.verify(gateway_ref, payment_id, signature)? {
                    warn!("💳️ Signature check failed for payment {payment_id} on {gateway_ref}");
                    return self.record_failure(gateway_ref, SIGNATURE_VERIFICATION_FAILED).await;
                }
                debug!("💳️ Signature for payment {payment_id} on {gateway_ref} is valid");
                self.record_success(gateway_ref, payment_id).await
            },
        }
    }

    async fn record_failure(&self, gateway_ref: &str, code: &str) -> Result<Envelope, PaymentVerificationError> {
        let failure = lookup_payment_error(Some(code));
        let from = self.orders.config().transition_policy.payment_failure_sources();
        let updated = self
            .orders
            .db()
            .mark_payment_failed(gateway_ref, &from, OrderStatusType::Failed, code, failure.message)
            .await?;
        if updated == 0 {
            match self.orders.db().fetch_order_by_gateway_ref(gateway_ref).await? {
                Some(order) => warn!(
                    "💳️ Payment failure {code} reported for {gateway_ref}, but order {} is {} and was left as it is",
                    order.order_id, order.status
                ),
                None => warn!("💳️ Payment failure {code} reported for {gateway_ref}, but no order is linked to it"),
            }
        } else {
            self.orders.producers().publish_payment_failed(PaymentFailedEvent::new(gateway_ref, code));
        }
        Ok(Envelope::bad_request(failure.message)
            .with_data(json!({ "errorCode": code, "preserveCart": failure.preserve_cart })))
    }

    async fn record_success(&self, gateway_ref: &str, payment_id: &str) -> Result<Envelope, PaymentVerificationError> {
        if self.orders.db().fetch_order_by_gateway_ref(gateway_ref).await?.is_none() {
            warn!("💳️ Verified payment {payment_id} refers to unknown order reference {gateway_ref}");
            return Ok(Envelope::not_found("Order not found"));
        }
        let verified = match self.orders.record_verified_payment(gateway_ref, payment_id).await {
            Ok(v) => v,
            Err(e) => return Ok(e.into()),
        };
        if verified.newly_recorded {
            self.enqueue_payment_notifications(&verified.order, payment_id);
        }
        let order = verified.order;
        Ok(Envelope::ok(
            "Payment verified successfully",
            json!({ "orderId": order.order_id, "status": order.status, "paymentId": payment_id }),
        ))
    }

    fn enqueue_payment_notifications(&self, order: &Order, payment_id: &str) {
        let outbox = self.orders.outbox();
        let receipt = Notification::PaymentReceipt {
            payment_id: payment_id.to_string(),
            amount: order.amount,
            order_id: order.order_id.clone(),
            paid_at: Utc::now(),
            method: GATEWAY_PAYMENT_METHOD.to_string(),
        };
        outbox.enqueue(NotificationRequest::new(order.user_id.as_str(), receipt));
        outbox.enqueue(NotificationRequest::new(order.user_id.as_str(), Notification::order_confirmation(order)));
    }
}

/// Normalises the gateway's error code. Missing, null and blank codes become [`PAYMENT_FAILED`]. Codes that are not
/// strings are kept in their JSON form so that they still show up on the order for support staff.
fn error_code_from(code: Option<&Value>) -> String {
    match code {
        None | Some(Value::Null) => PAYMENT_FAILED.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => PAYMENT_FAILED.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}
