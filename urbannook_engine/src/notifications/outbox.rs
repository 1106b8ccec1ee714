//! The notification outbox.
//!
//! Engine operations never send mail themselves. They queue a [`NotificationRequest`] on a [`NotificationOutbox`] and
//! move on. An [`OutboxWorker`] drains the queue on a background task and hands each request to a
//! [`NotificationDispatcher`], so a delivery failure (or a slow retry) can never change the result of the operation
//! that asked for it.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    events::{EventHandler, EventProducer, Handler},
    notifications::{
        dispatcher::NotificationDispatcher,
        templates::{Notification, NotificationKind},
        transport::MailTransport,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient: String,
    pub notification: Notification,
}

impl NotificationRequest {
    pub fn new<S: Into<String>>(recipient: S, notification: Notification) -> Self {
        Self { recipient: recipient.into(), notification }
    }

    pub fn kind(&self) -> NotificationKind {
        self.notification.kind()
    }
}

/// The sending side of the outbox. The default instance has no worker attached and drops everything it is given.
#[derive(Clone, Default)]
pub struct NotificationOutbox {
    producer: Option<EventProducer<NotificationRequest>>,
}

impl NotificationOutbox {
    /// Queues a notification and returns immediately. Returns `false` if the request was dropped.
    pub fn enqueue(&self, request: NotificationRequest) -> bool {
        match &self.producer {
            Some(producer) => {
                trace!("📧️ Queueing {} for {}", request.kind(), request.recipient);
                producer.try_publish(request)
            },
            None => {
                debug!("📧️ No outbox worker is running. {} for {} dropped.", request.kind(), request.recipient);
                false
            },
        }
    }

    pub fn is_connected(&self) -> bool {
        self.producer.is_some()
    }
}

/// Drains a [`NotificationOutbox`], delivering each request on its own task.
pub struct OutboxWorker {
    handler: EventHandler<NotificationRequest>,
}

impl OutboxWorker {
    pub fn new<T>(buffer_size: usize, dispatcher: Arc<NotificationDispatcher<T>>) -> Self
    where T: MailTransport + Send + Sync + 'static {
        Self { handler: EventHandler::new(buffer_size, dispatch_hook(dispatcher)) }
    }

    pub fn outbox(&self) -> NotificationOutbox {
        NotificationOutbox { producer: Some(self.handler.subscribe()) }
    }

    /// Runs until every [`NotificationOutbox`] handle has been dropped, then finishes the deliveries in flight.
    pub async fn run(self) {
        info!("📧️ Notification outbox worker started");
        self.handler.start_handler().await;
        info!("📧️ Notification outbox worker stopped");
    }
}

/// Wraps a dispatcher as an event handler. Each call sends one notification and logs the outcome.
pub fn dispatch_hook<T>(dispatcher: Arc<NotificationDispatcher<T>>) -> Handler<NotificationRequest>
where T: MailTransport + Send + Sync + 'static {
    Arc::new(move |request: NotificationRequest| {
        let dispatcher = Arc::clone(&dispatcher);
        Box::pin(async move {
            let result = dispatcher.send(&request.recipient, &request.notification).await;
            if result.success {
                debug!("📧️ Outbox delivered {} to {}", request.kind(), request.recipient);
            } else {
                error!(
                    "📧️ Outbox could not deliver {} to {}: [{}] {}",
                    request.kind(),
                    request.recipient,
                    result.status_code,
                    result.message
                );
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    })
}
