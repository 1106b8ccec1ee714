//! Message bodies for every outbound notification.
//!
//! Each [`Notification`] variant carries exactly the fields its template needs. [`Notification::render`] refuses to
//! produce a message with a blank required field rather than sending a half-filled email.
use std::fmt::{Display, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use urbannook_common::Paise;

use crate::db_types::{LineItem, Order, OrderId, OrderStatusType, ShippingAddress};

pub const STORE_NAME: &str = "UrbanNook";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderConfirmation,
    PaymentReceipt,
    Otp,
    Welcome,
    StatusUpdate,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NotificationKind::OrderConfirmation => "order confirmation",
            NotificationKind::PaymentReceipt => "payment receipt",
            NotificationKind::Otp => "one-time password",
            NotificationKind::Welcome => "welcome",
            NotificationKind::StatusUpdate => "status update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    OrderConfirmation {
        order_id: OrderId,
        customer_name: String,
        items: Vec<LineItem>,
        amount: Paise,
        shipping_address: Option<ShippingAddress>,
    },
    PaymentReceipt {
        payment_id: String,
        amount: Paise,
        order_id: OrderId,
        paid_at: DateTime<Utc>,
        method: String,
    },
    Otp {
        code: String,
        expires_in_minutes: u32,
    },
    Welcome {
        display_name: String,
    },
    StatusUpdate {
        order_id: OrderId,
        status: OrderStatusType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Required field '{field}' is missing for the {kind} notification")]
    MissingField { kind: NotificationKind, field: &'static str },
}

/// The customer-facing label for an order status.
pub fn status_label(status: OrderStatusType) -> &'static str {
    match status {
        OrderStatusType::Created => "Order Placed",
        OrderStatusType::Paid => "Payment Received",
        OrderStatusType::Confirmed => "Order Confirmed",
        OrderStatusType::Processing => "Being Prepared",
        OrderStatusType::Shipped => "Shipped",
        OrderStatusType::Delivered => "Delivered",
        OrderStatusType::Cancelled => "Cancelled",
        OrderStatusType::Failed => "Payment Failed",
    }
}

impl Notification {
    /// Builds an order confirmation from a stored order. The shipping address name is used as the greeting, falling
    /// back to the user id.
    pub fn order_confirmation(order: &Order) -> Self {
        let customer_name = order
            .shipping_address
            .as_ref()
            .map(|a| a.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| order.user_id.clone());
        Notification::OrderConfirmation {
            order_id: order.order_id.clone(),
            customer_name,
            items: order.items.clone(),
            amount: order.amount,
            shipping_address: order.shipping_address.clone(),
        }
    }

    pub fn status_update(order: &Order) -> Self {
        Notification::StatusUpdate { order_id: order.order_id.clone(), status: order.status }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::OrderConfirmation { .. } => NotificationKind::OrderConfirmation,
            Notification::PaymentReceipt { .. } => NotificationKind::PaymentReceipt,
            Notification::Otp { .. } => NotificationKind::Otp,
            Notification::Welcome { .. } => NotificationKind::Welcome,
            Notification::StatusUpdate { .. } => NotificationKind::StatusUpdate,
        }
    }

    /// Renders the subject and HTML body. Substituted values are trimmed; the body gets them HTML-escaped, while the
    /// plain-text subject keeps them as they are.
    pub fn render(&self) -> Result<RenderedMail, RenderError> {
        let kind = self.kind();
        let missing = |field| RenderError::MissingField { kind, field };
        let required = |field: &'static str, value: &str| -> Result<String, RenderError> {
            Some(value.trim()).filter(|v| !v.is_empty()).map(String::from).ok_or_else(|| missing(field))
        };
        match self {
            Notification::OrderConfirmation { order_id, customer_name, items, amount, shipping_address } => {
                let order_id = required("order_id", order_id.as_str())?;
                let name = escape_html(&required("customer_name", customer_name)?);
                if items.is_empty() {
                    return Err(missing("items"));
                }
                let address = shipping_address.as_ref().ok_or_else(|| missing("shipping_address"))?;
                let address = escape_html(&required("shipping_address", &address.to_string())?);
                let mut rows = String::new();
                for item in items {
                    let product = escape_html(&required("items.product_name", &item.product_name)?);
                    let _ = write!(
                        rows,
                        "<tr><td>{product}</td><td>{}</td><td>{}</td></tr>",
                        item.quantity,
                        item.subtotal()
                    );
                }
                let subject = format!("{STORE_NAME}: order {order_id} confirmed");
                let order_id = escape_html(&order_id);
                let html = format!(
                    "<h2>Thank you for your order, {name}!</h2>\
                     <p>Your order <strong>{order_id}</strong> has been confirmed.</p>\
                     <table><tr><th>Item</th><th>Qty</th><th>Price</th></tr>{rows}</table>\
                     <p>Total: <strong>{amount}</strong></p>\
                     <p>Shipping to: {address}</p>\
                     <p>We will let you know as soon as it ships.</p>"
                );
                Ok(RenderedMail { subject, html })
            },
            Notification::PaymentReceipt { payment_id, amount, order_id, paid_at, method } => {
                let payment_id = escape_html(&required("payment_id", payment_id)?);
                let order_id = required("order_id", order_id.as_str())?;
                let method = escape_html(&required("method", method)?);
                let date = paid_at.format("%d %b %Y, %H:%M UTC");
                let subject = format!("{STORE_NAME}: payment receipt for order {order_id}");
                let order_id = escape_html(&order_id);
                let html = format!(
                    "<h2>Payment received</h2>\
                     <p>We have received your payment for order <strong>{order_id}</strong>.</p>\
                     <ul>\
                     <li>Payment ID: {payment_id}</li>\
                     <li>Amount: {amount}</li>\
                     <li>Order: {order_id}</li>\
                     <li>Date: {date}</li>\
                     <li>Method: {method}</li>\
                     </ul>"
                );
                Ok(RenderedMail { subject, html })
            },
            Notification::Otp { code, expires_in_minutes } => {
                let code = escape_html(&required("code", code)?);
                if *expires_in_minutes == 0 {
                    return Err(missing("expires_in_minutes"));
                }
                let html = format!(
                    "<h2>Your verification code</h2>\
                     <p style=\"font-size:24px;letter-spacing:4px\"><strong>{code}</strong></p>\
                     <p>This code expires in {expires_in_minutes} minutes.</p>\
                     <p>Never share this code with anyone. {STORE_NAME} staff will never ask you for it.</p>"
                );
                Ok(RenderedMail { subject: format!("{STORE_NAME}: your verification code"), html })
            },
            Notification::Welcome { display_name } => {
                let name = required("display_name", display_name)?;
                let subject = format!("Welcome to {STORE_NAME}, {name}");
                let name = escape_html(&name);
                let html = format!(
                    "<h2>Welcome to {STORE_NAME}, {name}!</h2>\
                     <p>We are glad you are here. Explore handpicked decor for every corner of your home.</p>"
                );
                Ok(RenderedMail { subject, html })
            },
            Notification::StatusUpdate { order_id, status } => {
                let order_id = required("order_id", order_id.as_str())?;
                let label = status_label(*status);
                let subject = format!("{STORE_NAME}: order {order_id} is {label}");
                let order_id = escape_html(&order_id);
                let html = format!(
                    "<h2>Order update</h2>\
                     <p>Your order <strong>{order_id}</strong> is now: <strong>{label}</strong>.</p>"
                );
                Ok(RenderedMail { subject, html })
            },
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
