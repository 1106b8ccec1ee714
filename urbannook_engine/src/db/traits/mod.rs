//! # Persistence contracts
//!
//! This module defines the interface a database *backend* must implement to hold orders for the engine.
//!
//! * [`OrderManagement`] loads, saves and queries orders. The order status engine and the payment verification
//!   adapter only ever talk to storage through this trait, so any store with a conditional single-document update can
//!   back them.
mod order_management;

pub use order_management::{OrderManagement, OrderStoreError};
