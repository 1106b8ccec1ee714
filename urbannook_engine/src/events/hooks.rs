use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderStatusChangedEvent, PaymentFailedEvent};

/// The publishing side of every configured hook. Cheap to clone, and every publish is non-blocking.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub payment_failed_producer: Vec<EventProducer<PaymentFailedEvent>>,
}

impl EventProducers {
    pub fn publish_status_changed(&self, event: OrderStatusChangedEvent) {
        for producer in &self.status_changed_producer {
            producer.try_publish(event.clone());
        }
    }

    pub fn publish_payment_failed(&self, event: PaymentFailedEvent) {
        for producer in &self.payment_failed_producer {
            producer.try_publish(event.clone());
        }
    }
}

pub struct EventHandlers {
    pub on_status_changed: Option<EventHandler<OrderStatusChangedEvent>>,
    pub on_payment_failed: Option<EventHandler<PaymentFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_status_changed = hooks.on_status_changed.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_failed = hooks.on_payment_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_status_changed, on_payment_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_status_changed {
            result.status_changed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_failed {
            result.payment_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_status_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_payment_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_status_changed: Option<Handler<OrderStatusChangedEvent>>,
    pub on_payment_failed: Option<Handler<PaymentFailedEvent>>,
}

impl EventHooks {
    pub fn on_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_status_changed = Some(Arc::new(f));
        self
    }

    pub fn on_payment_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_failed = Some(Arc::new(f));
        self
    }
}
