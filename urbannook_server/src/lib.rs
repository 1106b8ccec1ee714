//! # UrbanNook server
//! This crate is the HTTP front end for the UrbanNook order engine. It is responsible for:
//! * Receiving payment gateway callbacks forwarded by the storefront and handing them to the engine for verification.
//! * Exposing the administrative order status endpoints.
//! * Running the background workers that deliver customer emails and log engine events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/payments/verify`: Finalises a checkout from the gateway's callback.
//! * `PATCH /api/orders/{order_id}/status`: Moves an order to a new status.
//! * `GET /api/orders/{order_id}`: The status, history and tracking details of an order.
//! * `GET /api/users/{user_id}/orders`: All orders of a customer, newest first.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod routes;
pub mod server;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;
