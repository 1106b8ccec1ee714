use chrono::{TimeZone, Utc};
use mockall::mock;
use urbannook_common::Paise;
use urbannook_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentInfo, StatusHistoryEntry, TrackingInfo},
    gateway::{GatewayError, SignatureVerifier},
    OrderManagement,
    OrderStoreError,
};

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_order_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderStoreError>;
        async fn save_order(&self, order: &Order) -> Result<Order, OrderStoreError>;
        async fn mark_payment_failed(
            &self,
            gateway_ref: &str,
            from: &[OrderStatusType],
            status: OrderStatusType,
            error_code: &str,
            error_description: &str,
        ) -> Result<u64, OrderStoreError>;
    }
}

/// Accepts exactly one signature.
pub struct FixedSignature(pub &'static str);

impl SignatureVerifier for FixedSignature {
    fn verify(&self, _gateway_order_ref: &str, _payment_id: &str, signature: &str) -> Result<bool, GatewayError> {
        Ok(signature == self.0)
    }
}

pub fn order(order_id: &str, status: OrderStatusType) -> Order {
    let placed = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
    Order {
        order_id: OrderId::from(order_id),
        user_id: "rohan@example.com".into(),
        status,
        status_history: vec![],
        tracking_info: TrackingInfo::default(),
        payment: PaymentInfo { gateway_order_ref: format!("order_{order_id}"), ..Default::default() },
        items: vec![],
        amount: Paise::from_rupees(3_200),
        shipping_address: None,
        created_at: placed,
        updated_at: placed,
        version: 2,
    }
}

pub fn with_history(mut order: Order, entries: &[(OrderStatusType, &str)]) -> Order {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();
    order.status_history =
        entries.iter().map(|(status, note)| StatusHistoryEntry { status: *status, timestamp: at, note: note.to_string() }).collect();
    order
}
