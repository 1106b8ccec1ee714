use chrono::Utc;
use mockall::mock;
use urbannook_common::Paise;

use crate::{
    db::traits::{OrderManagement, OrderStoreError},
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentInfo, TrackingInfo},
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

pub fn order(order_id: &str, status: OrderStatusType) -> Order {
    let now = Utc::now();
    Order {
        order_id: OrderId::from(order_id),
        user_id: "priya@example.com".into(),
        status,
        status_history: vec![],
        tracking_info: TrackingInfo::default(),
        payment: PaymentInfo { gateway_order_ref: format!("order_{order_id}"), ..Default::default() },
        items: vec![],
        amount: Paise::from_rupees(2_499),
        shipping_address: None,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}

/// Mimics the store: a successful save returns the order with its version bumped.
pub fn saved(order: &Order) -> Order {
    let mut stored = order.clone();
    stored.version += 1;
    stored
}
