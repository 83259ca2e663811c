//! Downstream hand-off.

use crate::Event;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Destination for decoded events
///
/// Pushes are ordered appends. The input treats them as infallible: a sink that
/// cannot accept an event must deal with it itself.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn push(&self, event: Event);
}

#[async_trait]
impl EventSink for mpsc::Sender<Event> {
    /// Waits for capacity, so a slow pipeline applies backpressure to the input
    async fn push(&self, event: Event) {
        if self.send(event).await.is_err() {
            warn!("Event sink closed, dropping event");
        }
    }
}

#[async_trait]
impl EventSink for mpsc::UnboundedSender<Event> {
    async fn push(&self, event: Event) {
        if self.send(event).is_err() {
            warn!("Event sink closed, dropping event");
        }
    }
}

#[async_trait]
impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    async fn push(&self, event: Event) {
        (**self).push(event).await
    }
}
