use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, OrderStatusType};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order_id} was modified concurrently. Expected version {expected}")]
    VersionConflict { order_id: OrderId, expected: i64 },
    #[error("Stored order data is corrupt: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for OrderStoreError {
    fn from(e: serde_json::Error) -> Self {
        OrderStoreError::CorruptRecord(e.to_string())
    }
}

/// The `OrderManagement` trait defines the behaviour a persistence backend must expose to hold UrbanNook orders.
///
/// An order is a single document: status, status history, tracking info, payment linkage and line items are loaded and
/// saved together. Backends must honour two guarantees:
///
/// * [`OrderManagement::save_order`] is conditional on [`Order::version`]. A stale version is rejected with
///   [`OrderStoreError::VersionConflict`] and nothing is written.
/// * Status history is append-only. Saving an order stores the entries that are not yet persisted and never rewrites
///   existing ones.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a brand-new order in the `Created` state, with an empty history and version 0.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetches the order with the given external order id. Returns `None` if there is no such order.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches the order linked to the given payment gateway order reference.
    async fn fetch_order_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Order>, OrderStoreError>;

    /// All orders for a user, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderStoreError>;

    /// Persists the mutable parts of `order` (status, new history entries, tracking info and payment info).
    ///
    /// Returns the order as stored, with its version incremented.
    async fn save_order(&self, order: &Order) -> Result<Order, OrderStoreError>;

    /// A targeted update used on the payment failure path. Only the status and the payment error fields of the order
    /// with the given gateway reference are touched, and a history entry is appended.
    ///
    /// The update only applies while the order is in one of the `from` statuses and has no verified payment recorded
    /// against it. The check and the write are a single statement, so a concurrent writer cannot slip in between.
    ///
    /// Returns the number of orders updated (0 or 1).
    async fn mark_payment_failed(
        &self,
        gateway_ref: &str,
        from: &[OrderStatusType],
        status: OrderStatusType,
        error_code: &str,
        error_description: &str,
    ) -> Result<u64, OrderStoreError>;
}
