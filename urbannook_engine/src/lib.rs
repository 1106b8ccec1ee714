//! UrbanNook order engine
//!
//! The engine owns the order lifecycle of the UrbanNook storefront after checkout: it reconciles payment gateway
//! callbacks with orders, applies status transitions with an append-only audit trail, and sends the customer emails
//! that go with them. It knows nothing about HTTP; `urbannook_server` is one front end for it.
//!
//! The library is divided into these main sections:
//! 1. Database management ([`mod@db`]). SQLite is the bundled backend. Use the public API rather than the database
//!    directly. The exception is the data types used in the database, which are defined in [`db_types`] and are
//!    public.
//! 2. The engine public API ([`mod@engine_api`]). [`OrderStatusApi`] applies status changes and
//!    [`PaymentVerificationApi`] turns gateway callbacks into confirmed or failed orders. Every operation answers with
//!    an [`Envelope`].
//! 3. Payment gateway adapters ([`gateway`]) and the customer-safe failure messages ([`payment_errors`]).
//! 4. Notifications ([`notifications`]). Emails are rendered from templates and delivered by a background outbox
//!    worker, with retries.
//!
//! The engine also emits events ([`events`]) when an order changes status or a payment fails, so that other parts of
//! the system can react without the engine knowing about them.
mod db;

pub mod db_types;
pub mod engine_api;
pub mod envelope;
pub mod events;
pub mod gateway;
pub mod notifications;
pub mod payment_errors;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::{OrderManagement, OrderStoreError};
pub use engine_api::{
    config::{EngineConfig, TransitionPolicy},
    errors::{OrderStatusError, PaymentVerificationError},
    order_objects,
    order_status_api::OrderStatusApi,
    payment_verification_api::{CallerIdentity, PaymentVerificationApi},
};
pub use envelope::Envelope;
pub use events::{EventHandlers, EventHooks, EventProducers};
