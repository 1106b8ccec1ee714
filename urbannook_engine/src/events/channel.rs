//! Simple stateless pub-sub event channel
//!
//! Components publish events through an [`EventProducer`]. A single [`EventHandler`] drains the channel and runs the
//! handler for every event on its own task, so a slow handler (e.g. a mail delivery that is backing off) never holds
//! up the publisher or other events. Handlers have no access to engine state; all they receive is the event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight jobs to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Drop our own sender so that the loop ends once the last producer goes away
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move {
                (handler)(ev).await;
                trace!("📬️ Event handled");
            });
            // Reap finished jobs so the set does not grow without bound
            while let Some(done) = jobs.try_join_next() {
                if let Err(e) = done {
                    warn!("📬️ Event handler job failed: {e}");
                }
            }
        }
        debug!("📬️ All producers closed. Waiting for {} outstanding jobs", jobs.len());
        while let Some(done) = jobs.join_next().await {
            if let Err(e) = done {
                warn!("📬️ Event handler job failed during shutdown: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Publishes an event, waiting for channel capacity if the handler is behind.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }

    /// Publishes an event without waiting. If the channel is full or closed, the event is dropped and logged.
    ///
    /// Returns `true` if the event was queued.
    pub fn try_publish(&self, event: E) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("📬️ Event channel is full. Event dropped.");
                false
            },
            Err(TrySendError::Closed(_)) => {
                error!("📬️ Event channel is closed. Event dropped.");
                false
            },
        }
    }
}
