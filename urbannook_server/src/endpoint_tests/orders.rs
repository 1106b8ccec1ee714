use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::json;
use urbannook_engine::{
    db_types::{Order, OrderId, OrderStatusType},
    EngineConfig,
    EventProducers,
    OrderStatusApi,
    OrderStoreError,
    TransitionPolicy,
};

use super::{
    helpers::send_request,
    mocks::{order, with_history, MockOrderStore},
};
use crate::routes::{OrderByIdRoute, OrdersForUserRoute, UpdateOrderStatusRoute};

fn configure(store: MockOrderStore, config: EngineConfig) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderStatusApi::new(store, EventProducers::default()).with_config(config);
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .service(UpdateOrderStatusRoute::<MockOrderStore>::new())
                .service(OrderByIdRoute::<MockOrderStore>::new())
                .service(OrdersForUserRoute::<MockOrderStore>::new()),
        );
    }
}

fn saved(order: &Order) -> Order {
    let mut stored = order.clone();
    stored.version += 1;
    stored
}

fn patch_status(order_id: &str, body: serde_json::Value) -> TestRequest {
    TestRequest::patch().uri(&format!("/api/orders/{order_id}/status")).set_json(body)
}

#[actix_web::test]
async fn confirm_a_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_order_by_order_id()
        .with(eq(OrderId::from("ORD123")))
        .times(1)
        .returning(|_| Ok(Some(order("ORD123", OrderStatusType::Paid))));
    store.expect_save_order().times(1).returning(|o| Ok(saved(o)));
    let req = patch_status("ORD123", json!({ "status": "CONFIRMED" }));
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], json!(200));
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Order status updated successfully"));
    assert_eq!(body["data"]["orderId"], json!("ORD123"));
    assert_eq!(body["data"]["status"], json!("CONFIRMED"));
    let history = body["data"]["statusHistory"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], json!("CONFIRMED"));
    assert_eq!(history[0]["note"], json!(""));
}

#[actix_web::test]
async fn shipping_with_tracking_details() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order("UN-77", OrderStatusType::Processing))));
    store
        .expect_save_order()
        .withf(|o| o.tracking_info.carrier.as_deref() == Some("Delhivery") && o.tracking_info.tracking_number.is_none())
        .returning(|o| Ok(saved(o)));
    let req = patch_status(
        "UN-77",
        json!({ "status": "SHIPPED", "note": "Left the warehouse", "trackingInfo": { "carrier": "Delhivery" } }),
    );
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trackingInfo"]["carrier"], json!("Delhivery"));
    assert_eq!(body["data"]["statusHistory"][0]["note"], json!("Left the warehouse"));
}

#[actix_web::test]
async fn status_is_required() {
    let _ = env_logger::try_init().ok();
    // No expectations: any store call fails the test
    let store = MockOrderStore::new();
    let (status, body) = send_request(patch_status("ORD123", json!({})), configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], json!(400));
    assert_eq!(body["message"], json!("Order ID and status are required"));
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn unknown_status_values_are_rejected() {
    let _ = env_logger::try_init().ok();
    let store = MockOrderStore::new();
    let req = patch_status("ORD123", json!({ "status": "confirmed" }));
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("CREATED"), "{message}");
}

#[actix_web::test]
async fn malformed_bodies_get_an_envelope() {
    let _ = env_logger::try_init().ok();
    let store = MockOrderStore::new();
    let req = TestRequest::patch()
        .uri("/api/orders/ORD123/status")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ status: ");
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], json!(400));
    assert!(body["message"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn store_failures_are_not_leaked() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order("ORD9", OrderStatusType::Confirmed))));
    store
        .expect_save_order()
        .returning(|_| Err(OrderStoreError::DatabaseError("disk I/O error at orders.db".into())));
    let req = patch_status("ORD9", json!({ "status": "PROCESSING" }));
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], json!("Internal Server Error"));
    assert!(!body.to_string().contains("disk"));
}

#[actix_web::test]
async fn strict_transitions_refuse_going_back() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order("UN-5", OrderStatusType::Delivered))));
    let config = EngineConfig::default().with_transition_policy(TransitionPolicy::Strict);
    let (status, body) = send_request(patch_status("UN-5", json!({ "status": "SHIPPED" })), configure(store, config)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Cannot change order status from DELIVERED to SHIPPED"));
}

#[actix_web::test]
async fn fetch_an_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().with(eq(OrderId::from("UN-8"))).returning(|_| {
        let o = order("UN-8", OrderStatusType::Confirmed);
        Ok(Some(with_history(o, &[(OrderStatusType::Paid, ""), (OrderStatusType::Confirmed, "Payment verified (pay_8)")])))
    });
    let req = TestRequest::get().uri("/api/orders/UN-8");
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("CONFIRMED"));
    assert_eq!(body["data"]["statusHistory"][1]["note"], json!("Payment verified (pay_8)"));
    assert_eq!(body["data"]["statusHistory"][1]["timestamp"], json!("2024-06-01T11:00:00Z"));
}

#[actix_web::test]
async fn fetch_a_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let (status, body) =
        send_request(TestRequest::get().uri("/api/orders/UN-404"), configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Order not found"));
    assert_eq!(body["data"], json!(null));
}

#[actix_web::test]
async fn orders_for_a_customer() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_orders_for_user()
        .withf(|user| user == "rohan@example.com")
        .returning(|_| Ok(vec![order("UN-2", OrderStatusType::Shipped), order("UN-1", OrderStatusType::Delivered)]));
    let req = TestRequest::get().uri("/api/users/rohan@example.com/orders");
    let (status, body) = send_request(req, configure(store, EngineConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["orderId"], json!("UN-2"));
    assert_eq!(orders[1]["status"], json!("DELIVERED"));
}
