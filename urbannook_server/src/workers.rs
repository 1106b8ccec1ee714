use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::task::JoinHandle;
use urbannook_engine::{
    events::{OrderStatusChangedEvent, PaymentFailedEvent},
    notifications::{DispatchConfig, LogMailTransport, NotificationDispatcher, NotificationOutbox, OutboxWorker},
    EventHandlers,
    EventHooks,
    EventProducers,
};

/// Starts the notification outbox worker on its own task.
///
/// The worker stops once every clone of the returned outbox has been dropped, after finishing the deliveries in flight.
pub fn start_outbox_worker(buffer_size: usize, config: DispatchConfig) -> (NotificationOutbox, JoinHandle<()>) {
    let dispatcher = Arc::new(NotificationDispatcher::new(LogMailTransport, config));
    let worker = OutboxWorker::new(buffer_size, dispatcher);
    let outbox = worker.outbox();
    let handle = tokio::spawn(worker.run());
    (outbox, handle)
}

/// Starts the handlers for engine events and returns the producers the engine publishes to.
pub async fn start_event_hooks(buffer_size: usize) -> EventProducers {
    let handlers = EventHandlers::new(buffer_size, default_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    producers
}

/// Audit logging for every status change and payment failure.
pub fn default_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_status_changed(|ev: OrderStatusChangedEvent| {
            Box::pin(async move {
                info!("🔄️ Order {} moved from {} to {}", ev.order.order_id, ev.old_status, ev.order.status);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
        .on_payment_failed(|ev: PaymentFailedEvent| {
            Box::pin(async move {
                warn!("💳️ Payment for {} failed with {}", ev.gateway_order_ref, ev.error_code);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    hooks
}
