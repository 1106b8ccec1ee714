//! # UrbanNook engine public API
//!
//! The API is split by responsibility so that callers only depend on the parts they use.
//!
//! * [`order_status_api`] validates and applies status transitions, maintains the status history and tracking details,
//!   and queues the status-update email.
//! * [`payment_verification_api`] translates payment gateway callbacks into either a recorded failure or a verified,
//!   confirmed order.
//!
//! # API usage
//!
//! Every API is created by supplying a database backend that implements [`crate::OrderManagement`]:
//!
//! ```rust,ignore
//! use urbannook_engine::{EventProducers, OrderStatusApi, SqliteDatabase, StatusUpdateRequest};
//! let db = SqliteDatabase::new_with_url("sqlite://data/orders.db", 5).await?;
//! let api = OrderStatusApi::new(db, EventProducers::default());
//! let envelope = api.update_order_status(StatusUpdateRequest::new("ORD123", "SHIPPED")).await;
//! ```
pub mod config;
pub mod errors;
pub mod order_objects;
pub mod order_status_api;
pub mod payment_verification_api;

#[cfg(test)]
mod mocks;
