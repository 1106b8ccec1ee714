use cucumber::{given, then, when};
use serde_json::json;
use urbannook_common::Paise;
use urbannook_engine::{
    db_types::{LineItem, NewOrder, OrderId, OrderStatusType, ProductSnapshot, ShippingAddress},
    gateway::GatewayCallback,
    order_objects::StatusUpdateRequest,
    CallerIdentity,
    OrderManagement,
};

use crate::cucumber::{order_world::verifier, OrderWorld};

fn shipping_address(name: &str) -> ShippingAddress {
    ShippingAddress {
        name: name.to_string(),
        line1: "4 Residency Road".into(),
        line2: None,
        city: "Bengaluru".into(),
        state: "KA".into(),
        postal_code: "560025".into(),
        country: "India".into(),
        phone: None,
    }
}

//             an order ORD123 from customer 'meera@example.com' for 1299 rupees with gateway reference order_abc
#[given(expr = "an order {word} from customer '{word}' for {int} rupees with gateway reference {word}")]
async fn create_order(world: &mut OrderWorld, order_id: String, customer: String, rupees: i64, gateway_ref: String) {
    let item = ProductSnapshot {
        product_id: "p-throw-03".into(),
        name: "Handloom Throw".into(),
        category: Some("Textiles".into()),
        image_url: None,
        unit_price: Paise::from_rupees(rupees),
    };
    let order = NewOrder::new(OrderId::from(order_id), customer.as_str(), gateway_ref.as_str())
        .with_item(LineItem::new(item, 1))
        .with_shipping_address(shipping_address("Meera Nair"));
    world.db().insert_order(order).await.expect("Error inserting order");
}

#[given(expr = "order {word} has been moved to {word}")]
async fn order_moved_to(world: &mut OrderWorld, order_id: String, status: String) {
    let result = world.api().orders().update_order_status(StatusUpdateRequest::new(order_id, status)).await;
    assert!(result.success, "Could not prepare order: {}", result.message);
}

#[when(expr = "an admin sets order {word} to {word}")]
async fn admin_sets_status(world: &mut OrderWorld, order_id: String, status: String) {
    let result = world.api().orders().update_order_status(StatusUpdateRequest::new(order_id, status)).await;
    world.last_response = Some(result.into_json());
}

#[when(expr = "an admin sets an order to {word} without giving its id")]
async fn admin_sets_status_without_id(world: &mut OrderWorld, status: String) {
    let request = StatusUpdateRequest { status: Some(status), ..Default::default() };
    let result = world.api().orders().update_order_status(request).await;
    world.last_response = Some(result.into_json());
}

#[when(expr = "the gateway reports failure {word} for {word}")]
async fn gateway_failure(world: &mut OrderWorld, code: String, gateway_ref: String) {
    let callback = GatewayCallback::failed(Some(gateway_ref), Some(json!(code)), Some("Reported by gateway".into()));
    let caller = CallerIdentity::new("checkout@urbannook.in");
    let result = world.api().verify_and_finalize_payment(&caller, callback).await;
    world.last_response = Some(result);
}

#[when(expr = "the gateway reports payment {word} for {word} with signature {string}")]
async fn gateway_success_with_signature(world: &mut OrderWorld, payment_id: String, gateway_ref: String, sig: String) {
    report_signed_payment(world, payment_id, gateway_ref, sig).await;
}

#[when(expr = "the gateway reports payment {word} for {word} with a valid signature")]
async fn gateway_success(world: &mut OrderWorld, payment_id: String, gateway_ref: String) {
    let signature = verifier().sign(&gateway_ref, &payment_id).expect("Error signing payment");
    report_signed_payment(world, payment_id, gateway_ref, signature).await;
}

async fn report_signed_payment(world: &mut OrderWorld, payment_id: String, gateway_ref: String, signature: String) {
    let callback = GatewayCallback::signed(Some(gateway_ref), Some(payment_id), Some(signature));
    let caller = CallerIdentity::new("checkout@urbannook.in");
    let result = world.api().verify_and_finalize_payment(&caller, callback).await;
    world.last_response = Some(result);
}

#[then(expr = "the response status is {int}")]
async fn response_status(world: &mut OrderWorld, status: u16) {
    assert_eq!(world.response().status_code, status, "Unexpected response: {:?}", world.response());
}

#[then(expr = "the response message is {string}")]
async fn response_message(world: &mut OrderWorld, message: String) {
    assert_eq!(world.response().message, message);
}

#[then(expr = "the response says the cart is preserved")]
async fn cart_preserved(world: &mut OrderWorld) {
    let data = world.response().data.as_ref().expect("Response has no data");
    assert_eq!(data["preserveCart"], json!(true));
}

#[then(expr = "order {word} has status {word}")]
async fn order_status(world: &mut OrderWorld, order_id: String, status: String) {
    let order = world.order(&order_id).await;
    let expected = status.parse::<OrderStatusType>().expect("Invalid status");
    assert_eq!(order.status, expected, "Status is incorrect");
}

#[then(expr = "order {word} has payment error {word}")]
async fn order_payment_error(world: &mut OrderWorld, order_id: String, code: String) {
    let order = world.order(&order_id).await;
    assert_eq!(order.payment.error_code, Some(code), "Payment error code is incorrect");
}

#[then(expr = "order {word} has payment id {word}")]
async fn order_payment_id(world: &mut OrderWorld, order_id: String, payment_id: String) {
    let order = world.order(&order_id).await;
    assert_eq!(order.payment.gateway_payment_id, Some(payment_id), "Payment id is incorrect");
}

#[then(expr = "order {word} has no payment id")]
async fn order_has_no_payment_id(world: &mut OrderWorld, order_id: String) {
    let order = world.order(&order_id).await;
    assert_eq!(order.payment.gateway_payment_id, None, "Payment id should not be set");
}

#[then(expr = "order {word} has {int} history entries")]
async fn history_length(world: &mut OrderWorld, order_id: String, count: usize) {
    let order = world.order(&order_id).await;
    assert_eq!(order.status_history.len(), count, "History length is incorrect");
}

#[then(expr = "the latest history entry for order {word} is {word} with note {string}")]
async fn latest_history_entry(world: &mut OrderWorld, order_id: String, status: String, note: String) {
    let order = world.order(&order_id).await;
    let entry = order.status_history.last().expect("Order has no history");
    assert_eq!(entry.status.as_str(), status);
    assert_eq!(entry.note, note);
}
