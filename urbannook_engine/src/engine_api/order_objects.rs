use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderStatusType, StatusHistoryEntry, TrackingInfo, TrackingUpdate};

/// An administrative (or payment-driven) request to move an order to a new status.
///
/// Every field is optional on the wire so that missing values can be reported with a proper message instead of a
/// deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub order_id: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
    pub tracking_info: Option<TrackingUpdate>,
}

impl StatusUpdateRequest {
    pub fn new<S: Into<String>>(order_id: S, status: S) -> Self {
        Self { order_id: Some(order_id.into()), status: Some(status.into()), ..Default::default() }
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_tracking(mut self, tracking: TrackingUpdate) -> Self {
        self.tracking_info = Some(tracking);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusView {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub status_history: Vec<StatusHistoryEntry>,
    pub tracking_info: TrackingInfo,
}

impl From<Order> for OrderStatusView {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            status: order.status,
            status_history: order.status_history,
            tracking_info: order.tracking_info,
        }
    }
}

/// The outcome of recording a verified payment against an order.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    pub order: Order,
    /// `false` when the order already carried this payment and nothing was written.
    pub newly_recorded: bool,
}
