use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{OrderManagement, OrderStoreError},
    db_types::{Order, OrderId, OrderStatusType},
    engine_api::{
        config::EngineConfig,
        errors::OrderStatusError,
        order_objects::{OrderStatusView, StatusUpdateRequest, VerifiedPayment},
    },
    envelope::Envelope,
    events::{EventProducers, OrderStatusChangedEvent},
    notifications::{Notification, NotificationOutbox, NotificationRequest},
};

/// `OrderStatusApi` validates and applies status transitions, whether an administrator asked for them or a verified
/// payment triggered them.
///
/// Every change is a load → mutate → save cycle guarded by the order's version. If another writer gets there first,
/// the whole cycle is repeated against the fresh order (up to [`EngineConfig::max_conflict_retries`] times).
pub struct OrderStatusApi<B> {
    db: B,
    config: EngineConfig,
    producers: EventProducers,
    outbox: NotificationOutbox,
}

impl<B> Debug for OrderStatusApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderStatusApi ({:?})", self.config.transition_policy)
    }
}

impl<B> OrderStatusApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, config: EngineConfig::default(), producers, outbox: NotificationOutbox::default() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_outbox(mut self, outbox: NotificationOutbox) -> Self {
        self.outbox = outbox;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn outbox(&self) -> &NotificationOutbox {
        &self.outbox
    }

    pub fn producers(&self) -> &EventProducers {
        &self.producers
    }

    fn after_status_change(&self, old_status: OrderStatusType, order: &Order) {
        self.outbox.enqueue(NotificationRequest::new(order.user_id.as_str(), Notification::status_update(order)));
        self.producers.publish_status_changed(OrderStatusChangedEvent::new(old_status, order.clone()));
    }
}

impl<B> OrderStatusApi<B>
where B: OrderManagement
{
    /// Moves an order to a new status, appending a history entry and merging any tracking details supplied.
    ///
    /// Validation failures are reported without touching storage. The status-update email is queued after the order
    /// is saved, and nothing that happens to it can change the result.
    pub async fn update_order_status(&self, request: StatusUpdateRequest) -> Envelope<OrderStatusView> {
        match self.try_update_order_status(request).await {
            Ok(order) => Envelope::ok("Order status updated successfully", OrderStatusView::from(order)),
            Err(e) => {
                debug!("🔄️ Status update rejected: {e}");
                e.into()
            },
        }
    }

    pub async fn try_update_order_status(&self, request: StatusUpdateRequest) -> Result<Order, OrderStatusError> {
        // Blank counts as missing, but a present status must match one of the values exactly
        let status = request.status.as_deref().filter(|s| !s.trim().is_empty());
        let (Some(order_id), Some(status)) = (non_blank(&request.order_id), status) else {
            return Err(OrderStatusError::MissingFields);
        };
        let status = status.parse::<OrderStatusType>()?;
        let order_id = OrderId::from(order_id);
        let retries = self.config.max_conflict_retries;
        for attempt in 1..=retries + 1 {
            let mut order = self
                .db
                .fetch_order_by_order_id(&order_id)
                .await?
                .ok_or_else(|| OrderStatusError::OrderNotFound(order_id.clone()))?;
            let old_status = order.status;
            if !self.config.transition_policy.allows(old_status, status) {
                return Err(OrderStatusError::TransitionNotAllowed { from: old_status, to: status });
            }
            order.transition_to(status, request.note.clone());
            if let Some(tracking) = &request.tracking_info {
                order.tracking_info.apply(tracking);
            }
            match self.db.save_order(&order).await {
                Ok(saved) => {
                    info!("🔄️ Order {order_id} moved from {old_status} to {status}");
                    self.after_status_change(old_status, &saved);
                    return Ok(saved);
                },
                Err(OrderStoreError::VersionConflict { .. }) => {
                    debug!("🔄️ Order {order_id} changed while it was being updated (attempt {attempt}). Retrying.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        warn!("🔄️ Gave up updating order {order_id} after {} conflicting writes", retries + 1);
        Err(OrderStatusError::ConcurrentModification(order_id))
    }

    /// Confirms the order linked to `gateway_ref` after its payment signature has been checked.
    ///
    /// Recording the same payment twice is harmless: the second call changes nothing and reports
    /// `newly_recorded = false`.
    pub async fn record_verified_payment(
        &self,
        gateway_ref: &str,
        payment_id: &str,
    ) -> Result<VerifiedPayment, OrderStatusError> {
        let retries = self.config.max_conflict_retries;
        let mut last_order_id = None;
        for attempt in 1..=retries + 1 {
            let mut order = self
                .db
                .fetch_order_by_gateway_ref(gateway_ref)
                .await?
                .ok_or_else(|| OrderStatusError::NoOrderForGatewayRef(gateway_ref.to_string()))?;
            last_order_id = Some(order.order_id.clone());
            if order.payment.gateway_payment_id.as_deref() == Some(payment_id) {
                debug!("💳️ Payment {payment_id} is already recorded against order {}", order.order_id);
                return Ok(VerifiedPayment { order, newly_recorded: false });
            }
            let old_status = order.status;
            if is_paid(old_status) {
                warn!(
                    "💳️ Order {} is already {old_status}, but a second payment ({payment_id}) was verified for it",
                    order.order_id
                );
                return Err(OrderStatusError::AlreadyPaid(order.order_id));
            }
            let target = OrderStatusType::Confirmed;
            if !self.config.transition_policy.allows(old_status, target) {
                return Err(OrderStatusError::TransitionNotAllowed { from: old_status, to: target });
            }
            order.payment.gateway_payment_id = Some(payment_id.to_string());
            order.payment.error_code = None;
            order.payment.error_description = None;
            order.transition_to(target, Some(format!("Payment verified ({payment_id})")));
            match self.db.save_order(&order).await {
                Ok(saved) => {
                    info!("💳️ Payment {payment_id} confirmed order {}", saved.order_id);
                    self.after_status_change(old_status, &saved);
                    return Ok(VerifiedPayment { order: saved, newly_recorded: true });
                },
                Err(OrderStoreError::VersionConflict { .. }) => {
                    debug!("💳️ Order {} changed while recording payment (attempt {attempt})", order.order_id);
                },
                Err(e) => return Err(e.into()),
            }
        }
        let order_id = last_order_id.unwrap_or_else(|| OrderId::from(gateway_ref));
        warn!("💳️ Gave up recording payment {payment_id} on order {order_id} after {} conflicts", retries + 1);
        Err(OrderStatusError::ConcurrentModification(order_id))
    }

    pub async fn fetch_order(&self, order_id: &str) -> Envelope<OrderStatusView> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Envelope::bad_request("Order ID is required");
        }
        let order_id = OrderId::from(order_id);
        match self.db.fetch_order_by_order_id(&order_id).await {
            Ok(Some(order)) => Envelope::ok("Order retrieved successfully", OrderStatusView::from(order)),
            Ok(None) => OrderStatusError::OrderNotFound(order_id).into(),
            Err(e) => OrderStatusError::Store(e).into(),
        }
    }

    pub async fn fetch_orders_for_user(&self, user_id: &str) -> Envelope<Vec<OrderStatusView>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Envelope::bad_request("User ID is required");
        }
        match self.db.fetch_orders_for_user(user_id).await {
            Ok(orders) => {
                trace!("🔄️ {} orders found for {user_id}", orders.len());
                Envelope::ok("Orders retrieved successfully", orders.into_iter().map(OrderStatusView::from).collect())
            },
            Err(e) => OrderStatusError::Store(e).into(),
        }
    }
}

/// Whether the order has already been confirmed (or progressed beyond that).
fn is_paid(status: OrderStatusType) -> bool {
    match (status.happy_path_rank(), OrderStatusType::Confirmed.happy_path_rank()) {
        (Some(rank), Some(confirmed)) => rank >= confirmed,
        _ => false,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
