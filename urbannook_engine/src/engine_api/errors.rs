use log::*;
use thiserror::Error;

use crate::{
    db::traits::OrderStoreError,
    db_types::{OrderId, OrderStatusType, StatusConversionError},
    envelope::{Envelope, BAD_REQUEST, CONFLICT, INTERNAL_SERVER_ERROR, NOT_FOUND},
    gateway::GatewayError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderStatusError {
    #[error("Order ID and status are required")]
    MissingFields,
    #[error("{0}")]
    InvalidStatus(#[from] StatusConversionError),
    #[error("Order not found")]
    OrderNotFound(OrderId),
    #[error("Order not found")]
    NoOrderForGatewayRef(String),
    #[error("Cannot change order status from {from} to {to}")]
    TransitionNotAllowed { from: OrderStatusType, to: OrderStatusType },
    #[error("Order has already been paid")]
    AlreadyPaid(OrderId),
    #[error("Order was modified concurrently. Please retry.")]
    ConcurrentModification(OrderId),
    #[error("Database error: {0}")]
    Store(#[from] OrderStoreError),
}

impl OrderStatusError {
    pub fn status_code(&self) -> u16 {
        match self {
            OrderStatusError::MissingFields | OrderStatusError::InvalidStatus(_) => BAD_REQUEST,
            OrderStatusError::OrderNotFound(_) | OrderStatusError::NoOrderForGatewayRef(_) => NOT_FOUND,
            OrderStatusError::TransitionNotAllowed { .. } |
            OrderStatusError::AlreadyPaid(_) |
            OrderStatusError::ConcurrentModification(_) => CONFLICT,
            OrderStatusError::Store(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T> From<OrderStatusError> for Envelope<T> {
    fn from(err: OrderStatusError) -> Self {
        match err {
            OrderStatusError::Store(e) => {
                error!("🔄️ Order store failure: {e}");
                Envelope::internal_error()
            },
            e => Envelope::failure(e.status_code(), e),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentVerificationError {
    #[error("User not found for payment")]
    UnknownUser,
    #[error("Payment order reference is required")]
    MissingOrderRef,
    #[error("Could not check the payment signature: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    Store(#[from] OrderStoreError),
}

impl<T> From<PaymentVerificationError> for Envelope<T> {
    fn from(err: PaymentVerificationError) -> Self {
        match err {
            PaymentVerificationError::UnknownUser => Envelope::not_found(err),
            PaymentVerificationError::MissingOrderRef => Envelope::bad_request(err),
            e => {
                error!("💳️ Payment verification failed internally: {e}");
                Envelope::internal_error()
            },
        }
    }
}
