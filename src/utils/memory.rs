//! In-process transport.
//!
//! `MemoryTransport` keeps lists and channels in shared memory and lets the
//! caller script failures, so an input can be driven end to end without a
//! queue server.

use crate::{ConnectOptions, InputError, InputResult, Session, SubscriptionHandler, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;

/// One scripted entry on a list or channel
#[derive(Debug, Clone)]
enum Delivery {
    Payload(String),
    Error(String),
    Close,
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, VecDeque<Delivery>>,
    subscribers: HashMap<String, usize>,
    failing_connects: usize,
    rejected_subscribes: usize,
    connect_attempts: usize,
    unsubscribes: usize,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    notify: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enqueue(&self, key: &str, delivery: Delivery) {
        self.lock()
            .queues
            .entry(key.to_string())
            .or_default()
            .push_back(delivery);
        self.notify.notify_waiters();
    }

    /// Wait for the next entry on `key`
    async fn next(&self, key: &str) -> Delivery {
        loop {
            let notified = self.notify.notified();
            let next = {
                let mut state = self.lock();
                state.queues.get_mut(key).and_then(VecDeque::pop_front)
            };
            if let Some(delivery) = next {
                return delivery;
            }
            notified.await;
        }
    }

    fn add_subscriber(&self, channel: &str) -> usize {
        let mut state = self.lock();
        let count = state.subscribers.entry(channel.to_string()).or_default();
        *count += 1;
        *count
    }

    fn remove_subscriber(&self, channel: &str) -> usize {
        let mut state = self.lock();
        let count = state.subscribers.entry(channel.to_string()).or_default();
        *count = count.saturating_sub(1);
        *count
    }
}

/// Transport backed by in-process lists and channels
///
/// Clones share the same state, so a test can keep one handle to feed and
/// inspect the transport while the runtime owns another. Unlike a real server,
/// messages published on a channel nobody listens to are held for the next
/// subscriber instead of being discarded.
///
/// # Example
///
/// ```
/// use queue_input_core::utils::MemoryTransport;
///
/// let transport = MemoryTransport::new();
/// transport.push("jobs", r#"{"id":1}"#);
/// transport.fail_connects(2);
/// assert_eq!(transport.pending("jobs"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a list item or publish a channel message
    pub fn push(&self, key: &str, payload: impl Into<String>) {
        self.shared.enqueue(key, Delivery::Payload(payload.into()));
    }

    /// Make the next read on `key` fail like a dropped connection
    pub fn inject_error(&self, key: &str, message: impl Into<String>) {
        self.shared.enqueue(key, Delivery::Error(message.into()));
    }

    /// Have the server end the current subscription on `channel`
    pub fn close_channel(&self, channel: &str) {
        self.shared.enqueue(channel, Delivery::Close);
    }

    /// Make the next `count` connection attempts fail
    pub fn fail_connects(&self, count: usize) {
        self.shared.lock().failing_connects += count;
    }

    /// Make the next `count` subscribe requests fail before they are acknowledged
    pub fn reject_subscribes(&self, count: usize) {
        self.shared.lock().rejected_subscribes += count;
    }

    /// Number of connection attempts so far, failed ones included
    pub fn connect_attempts(&self) -> usize {
        self.shared.lock().connect_attempts
    }

    /// Number of explicit unsubscribe requests
    pub fn unsubscribe_count(&self) -> usize {
        self.shared.lock().unsubscribes
    }

    /// Current subscriber count on `channel`
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.shared
            .lock()
            .subscribers
            .get(channel)
            .copied()
            .unwrap_or(0)
    }

    /// Entries still waiting on `key`
    pub fn pending(&self, key: &str) -> usize {
        self.shared.lock().queues.get(key).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self, options: &ConnectOptions) -> InputResult<Box<dyn Session>> {
        {
            let mut state = self.shared.lock();
            state.connect_attempts += 1;
            if state.failing_connects > 0 {
                state.failing_connects -= 1;
                return Err(InputError::transport(format!(
                    "Connection refused by {}:{}",
                    options.host, options.port
                )));
            }
        }

        debug!("Memory session opened for {}:{}", options.host, options.port);
        Ok(Box::new(MemorySession {
            shared: self.shared.clone(),
            subscribed: None,
        }))
    }
}

struct MemorySession {
    shared: Arc<Shared>,
    subscribed: Option<String>,
}

#[async_trait]
impl Session for MemorySession {
    async fn blocking_pop(&mut self, key: &str) -> InputResult<String> {
        match self.shared.next(key).await {
            Delivery::Payload(payload) => Ok(payload),
            Delivery::Error(message) => Err(InputError::transport(message)),
            Delivery::Close => Err(InputError::transport("Connection closed by server")),
        }
    }

    async fn subscribe(
        &mut self,
        channel: &str,
        handler: &mut dyn SubscriptionHandler,
    ) -> InputResult<()> {
        {
            let mut state = self.shared.lock();
            if state.rejected_subscribes > 0 {
                state.rejected_subscribes -= 1;
                return Err(InputError::transport(format!(
                    "Subscription to {} rejected",
                    channel
                )));
            }
        }

        let count = self.shared.add_subscriber(channel);
        self.subscribed = Some(channel.to_string());
        handler.on_subscribe(channel, count).await;

        loop {
            match self.shared.next(channel).await {
                Delivery::Payload(payload) => handler.on_message(channel, payload).await,
                Delivery::Error(message) => {
                    self.shared.remove_subscriber(channel);
                    self.subscribed = None;
                    return Err(InputError::transport(message));
                }
                Delivery::Close => {
                    let remaining = self.shared.remove_subscriber(channel);
                    self.subscribed = None;
                    handler.on_unsubscribe(channel, remaining).await;
                    return Ok(());
                }
            }
        }
    }

    async fn unsubscribe(&mut self) -> InputResult<()> {
        self.shared.lock().unsubscribes += 1;
        if let Some(channel) = self.subscribed.take() {
            self.shared.remove_subscriber(&channel);
        }
        Ok(())
    }
}
