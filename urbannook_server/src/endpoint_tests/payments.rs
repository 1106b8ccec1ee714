use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::{json, Value};
use urbannook_engine::{
    db_types::{Order, OrderStatusType},
    EventProducers,
    OrderStatusApi,
    PaymentVerificationApi,
};

use super::{
    helpers::send_request,
    mocks::{order, FixedSignature, MockOrderStore},
};
use crate::{helpers::USER_ID_HEADER, routes::VerifyPaymentRoute};

const GOOD_SIGNATURE: &str = "6f1c0ffee";

fn configure(store: MockOrderStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentVerificationApi::new(
            OrderStatusApi::new(store, EventProducers::default()),
            FixedSignature(GOOD_SIGNATURE),
        );
        cfg.app_data(web::Data::new(api))
            .service(web::scope("/api").service(VerifyPaymentRoute::<MockOrderStore, FixedSignature>::new()));
    }
}

fn callback(body: Value) -> TestRequest {
    TestRequest::post().uri("/api/payments/verify").insert_header((USER_ID_HEADER, "rohan@example.com")).set_json(body)
}

fn confirmed(order: &Order) -> Order {
    let mut stored = order.clone();
    stored.version += 1;
    stored
}

#[actix_web::test]
async fn declined_card() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_mark_payment_failed()
        .withf(|r, from, s, c, d| {
            r == "order_declined999" &&
                from.contains(&OrderStatusType::Created) &&
                *s == OrderStatusType::Failed &&
                c == "card_declined" &&
                d == "Card declined. Please contact your bank or try another card."
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(1));
    let req = callback(json!({
        "error": {
            "code": "card_declined",
            "description": "Card was declined by the issuer",
            "metadata": { "order_id": "order_declined999", "payment_id": "pay_N1" }
        }
    }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], json!(400));
    assert_eq!(body["message"], json!("Card declined. Please contact your bank or try another card."));
    assert_eq!(body["data"], json!({ "errorCode": "card_declined", "preserveCart": true }));
}

#[actix_web::test]
async fn forged_signature() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_mark_payment_failed()
        .withf(|r, _, _, c, _| r == "order_test123" && c == "signature_verification_failed")
        .times(1)
        .returning(|_, _, _, _, _| Ok(1));
    let req = callback(json!({
        "razorpay_order_id": "order_test123",
        "razorpay_payment_id": "pay_test456",
        "razorpay_signature": "deadbeef"
    }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Payment verification failed. Please contact support if amount was debited."));
    assert_eq!(body["data"]["errorCode"], json!("signature_verification_failed"));
}

#[actix_web::test]
async fn verified_payment() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_order_by_gateway_ref()
        .withf(|r| r == "order_UN-42")
        .times(2)
        .returning(|_| Ok(Some(order("UN-42", OrderStatusType::Created))));
    store
        .expect_save_order()
        .withf(|o| {
            o.status == OrderStatusType::Confirmed && o.payment.gateway_payment_id.as_deref() == Some("pay_42")
        })
        .times(1)
        .returning(|o| Ok(confirmed(o)));
    let req = callback(json!({
        "razorpay_order_id": "order_UN-42",
        "razorpay_payment_id": "pay_42",
        "razorpay_signature": GOOD_SIGNATURE
    }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Payment verified successfully"));
    assert_eq!(body["data"], json!({ "orderId": "UN-42", "status": "CONFIRMED", "paymentId": "pay_42" }));
}

#[actix_web::test]
async fn second_payment_for_a_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_gateway_ref().returning(|_| {
        let mut o = order("UN-43", OrderStatusType::Shipped);
        o.payment.gateway_payment_id = Some("pay_first".into());
        Ok(Some(o))
    });
    let req = callback(json!({
        "razorpay_order_id": "order_UN-43",
        "razorpay_payment_id": "pay_second",
        "razorpay_signature": GOOD_SIGNATURE
    }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Order has already been paid"));
}

#[actix_web::test]
async fn caller_must_be_known() {
    let _ = env_logger::try_init().ok();
    let store = MockOrderStore::new();
    let req = TestRequest::post()
        .uri("/api/payments/verify")
        .set_json(json!({ "razorpay_order_id": "order_1", "razorpay_payment_id": "pay_1", "razorpay_signature": "x" }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("User not found for payment"));
}

#[actix_web::test]
async fn order_reference_is_required() {
    let _ = env_logger::try_init().ok();
    let store = MockOrderStore::new();
    let req = callback(json!({ "error": { "code": "card_declined" } }));
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Payment order reference is required"));
}
