//! The uniform result shape returned by every boundary operation of the engine.
//!
//! Errors are folded into an [`Envelope`] before they leave the engine. Callers inspect `status_code` (an HTTP status
//! equivalent) and `success` instead of matching on error types.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const CONFLICT: u16 = 409;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// The generic message used for every unexpected failure. Details go to the log, never to the caller.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
    pub success: bool,
}

impl<T> Envelope<T> {
    pub fn new<S: Display>(status_code: u16, message: S, data: Option<T>) -> Self {
        let success = (200..300).contains(&status_code);
        Self { status_code, message: message.to_string(), data, success }
    }

    pub fn ok<S: Display>(message: S, data: T) -> Self {
        Self::new(OK, message, Some(data))
    }

    pub fn failure<S: Display>(status_code: u16, message: S) -> Self {
        Self::new(status_code, message, None)
    }

    pub fn bad_request<S: Display>(message: S) -> Self {
        Self::failure(BAD_REQUEST, message)
    }

    pub fn not_found<S: Display>(message: S) -> Self {
        Self::failure(NOT_FOUND, message)
    }

    pub fn conflict<S: Display>(message: S) -> Self {
        Self::failure(CONFLICT, message)
    }

    pub fn internal_error() -> Self {
        Self::failure(INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

}

impl<T: Serialize> Envelope<T> {
    /// Erases the payload type into JSON. A payload that cannot be serialized becomes an internal error.
    pub fn into_json(self) -> Envelope<Value> {
        let Envelope { status_code, message, data, success } = self;
        match data.map(serde_json::to_value).transpose() {
            Ok(data) => Envelope { status_code, message, data, success },
            Err(e) => {
                log::error!("📦️ Could not serialize envelope payload: {e}");
                Envelope::internal_error()
            },
        }
    }
}
