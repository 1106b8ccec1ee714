use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use urbannook_common::Paise;

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle states of an order.
///
/// The happy path runs `Created → Paid → Confirmed → Processing → Shipped → Delivered`. `Cancelled` and `Failed`
/// are side branches. `Delivered`, `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// Checkout created the order. No payment has been captured yet.
    Created,
    /// The gateway reported the payment as captured.
    Paid,
    /// Payment has been verified and the order is accepted.
    Confirmed,
    /// The order is being picked and packed.
    Processing,
    /// The order has been handed to a carrier.
    Shipped,
    /// The customer received the order.
    Delivered,
    /// The order was cancelled by the customer or an admin.
    Cancelled,
    /// The payment failed or could not be verified.
    Failed,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 8] = [
        OrderStatusType::Created,
        OrderStatusType::Paid,
        OrderStatusType::Confirmed,
        OrderStatusType::Processing,
        OrderStatusType::Shipped,
        OrderStatusType::Delivered,
        OrderStatusType::Cancelled,
        OrderStatusType::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::Created => "CREATED",
            OrderStatusType::Paid => "PAID",
            OrderStatusType::Confirmed => "CONFIRMED",
            OrderStatusType::Processing => "PROCESSING",
            OrderStatusType::Shipped => "SHIPPED",
            OrderStatusType::Delivered => "DELIVERED",
            OrderStatusType::Cancelled => "CANCELLED",
            OrderStatusType::Failed => "FAILED",
        }
    }

    /// Comma separated list of every valid status, in lifecycle order.
    pub fn valid_values() -> String {
        Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled | OrderStatusType::Failed)
    }

    /// Position along the happy path, or `None` for the failure branches.
    pub fn happy_path_rank(&self) -> Option<u8> {
        match self {
            OrderStatusType::Created => Some(0),
            OrderStatusType::Paid => Some(1),
            OrderStatusType::Confirmed => Some(2),
            OrderStatusType::Processing => Some(3),
            OrderStatusType::Shipped => Some(4),
            OrderStatusType::Delivered => Some(5),
            OrderStatusType::Cancelled | OrderStatusType::Failed => None,
        }
    }

    /// Whether `self → next` moves forward along the lifecycle. Terminal states never move, and the failure branches
    /// are reachable from every non-terminal state.
    pub fn is_forward_transition(&self, next: OrderStatusType) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.happy_path_rank(), next.happy_path_rank()) {
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}. Must be one of: {list}", list = OrderStatusType::valid_values())]
pub struct StatusConversionError(pub String);

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| StatusConversionError(s.to_string()))
    }
}

//--------------------------------------  StatusHistoryEntry   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatusType,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

impl StatusHistoryEntry {
    pub fn new(status: OrderStatusType, note: Option<String>) -> Self {
        Self { status, timestamp: Utc::now(), note: note.unwrap_or_default() }
    }
}

//--------------------------------------     TrackingInfo      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// A partial tracking update. Only the fields that are present (and not blank) are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TrackingUpdate {
    pub fn with_carrier<S: Into<String>>(mut self, carrier: S) -> Self {
        self.carrier = Some(carrier.into());
        self
    }

    pub fn with_tracking_number<S: Into<String>>(mut self, tracking_number: S) -> Self {
        self.tracking_number = Some(tracking_number.into());
        self
    }

    pub fn with_estimated_delivery(mut self, eta: DateTime<Utc>) -> Self {
        self.estimated_delivery = Some(eta);
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

impl TrackingInfo {
    /// Merges the supplied fields of `update` into this record. Absent or blank fields leave the current value alone.
    pub fn apply(&mut self, update: &TrackingUpdate) {
        if let Some(carrier) = non_blank(&update.carrier) {
            self.carrier = Some(carrier);
        }
        if let Some(number) = non_blank(&update.tracking_number) {
            self.tracking_number = Some(number);
        }
        if let Some(eta) = update.estimated_delivery {
            self.estimated_delivery = Some(eta);
        }
    }
}

//--------------------------------------      PaymentInfo      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// The payment gateway's identifier for the checkout session
    pub gateway_order_ref: String,
    pub gateway_payment_id: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

//--------------------------------------       LineItem        ---------------------------------------------------------
/// The product as it looked when the order was placed. Catalog edits never reach historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Paise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_name: String,
    pub quantity: u32,
    pub price: Paise,
    pub snapshot: ProductSnapshot,
}

impl LineItem {
    pub fn new(snapshot: ProductSnapshot, quantity: u32) -> Self {
        Self { product_name: snapshot.name.clone(), quantity, price: snapshot.unit_price, snapshot }
    }

    pub fn subtotal(&self) -> Paise {
        self.price * i64::from(self.quantity)
    }
}

//--------------------------------------    ShippingAddress    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl Display for ShippingAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.name, self.line1)?;
        if let Some(line2) = self.line2.as_deref().filter(|s| !s.trim().is_empty()) {
            write!(f, ", {line2}")?;
        }
        write!(f, ", {}, {} {}, {}", self.city, self.state, self.postal_code, self.country)
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: String,
    pub status: OrderStatusType,
    pub status_history: Vec<StatusHistoryEntry>,
    pub tracking_info: TrackingInfo,
    pub payment: PaymentInfo,
    pub items: Vec<LineItem>,
    pub amount: Paise,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token. Incremented by the store on every successful save.
    pub version: i64,
}

impl Order {
    /// Sets the new status and appends exactly one history entry for it.
    pub fn transition_to(&mut self, status: OrderStatusType, note: Option<String>) {
        self.status = status;
        self.status_history.push(StatusHistoryEntry::new(status, note));
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order as handed over by checkout. The total is computed from the line items when the order is built.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: String,
    pub gateway_order_ref: String,
    pub items: Vec<LineItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(order_id: OrderId, user_id: S, gateway_order_ref: S) -> Self {
        Self {
            order_id,
            user_id: user_id.into(),
            gateway_order_ref: gateway_order_ref.into(),
            items: Vec::new(),
            shipping_address: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_shipping_address(mut self, address: ShippingAddress) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn amount(&self) -> Paise {
        self.items.iter().map(LineItem::subtotal).sum()
    }
}
