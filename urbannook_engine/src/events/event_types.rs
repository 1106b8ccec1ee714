use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

/// Published after an order's new status has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub old_status: OrderStatusType,
    pub order: Order,
}

impl OrderStatusChangedEvent {
    pub fn new(old_status: OrderStatusType, order: Order) -> Self {
        Self { old_status, order }
    }
}

/// Published after a gateway failure has been recorded against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailedEvent {
    pub gateway_order_ref: String,
    pub error_code: String,
}

impl PaymentFailedEvent {
    pub fn new<S: Into<String>>(gateway_order_ref: S, error_code: S) -> Self {
        Self { gateway_order_ref: gateway_order_ref.into(), error_code: error_code.into() }
    }
}
