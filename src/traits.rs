//! Transport trait definitions.
//!
//! The remote queue service is reached through two traits:
//! - `Transport`: opens sessions against the service
//! - `Session`: one open connection, offering blocking pops and subscriptions
//!
//! Subscriptions report back through a `SubscriptionHandler`.

use crate::{ConnectOptions, InputResult};
use async_trait::async_trait;

/// Opens sessions against the remote queue service
///
/// # Example
///
/// ```rust,no_run
/// use queue_input_core::{ConnectOptions, InputError, InputResult, Session, Transport};
/// use async_trait::async_trait;
///
/// pub struct TcpTransport;
///
/// #[async_trait]
/// impl Transport for TcpTransport {
///     async fn connect(&self, options: &ConnectOptions) -> InputResult<Box<dyn Session>> {
///         Err(InputError::transport(format!(
///             "{}:{} unreachable",
///             options.host, options.port
///         )))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new session
    ///
    /// # Errors
    ///
    /// Return `InputError::Transport` when the service cannot be reached or
    /// rejects the credentials; the runtime retries it like any read failure.
    async fn connect(&self, options: &ConnectOptions) -> InputResult<Box<dyn Session>>;
}

/// One open connection to the remote queue service
///
/// A session is owned by a single runtime and never used concurrently. After
/// any `InputError::Transport` the runtime discards it and connects again.
#[async_trait]
pub trait Session: Send {
    /// Remove and return the head of the list `key`
    ///
    /// Waits without timeout until an item is available or the connection fails.
    async fn blocking_pop(&mut self, key: &str) -> InputResult<String>;

    /// Subscribe to `channel` and deliver its traffic to `handler`
    ///
    /// Calls `on_subscribe` once the service acknowledges the subscription,
    /// `on_message` for every published payload, and `on_unsubscribe` when the
    /// subscription ends. Returns only once unsubscribed or on a connection error.
    async fn subscribe(
        &mut self,
        channel: &str,
        handler: &mut dyn SubscriptionHandler,
    ) -> InputResult<()>;

    /// Stop delivery for every channel this session subscribed to
    async fn unsubscribe(&mut self) -> InputResult<()>;

    /// Optional: close the connection
    async fn disconnect(&mut self) -> InputResult<()> {
        Ok(())
    }
}

/// Reactions to subscription traffic
#[async_trait]
pub trait SubscriptionHandler: Send {
    /// The service acknowledged the subscription; `count` is this session's subscription count
    async fn on_subscribe(&mut self, channel: &str, count: usize);

    /// A payload was published on `channel`
    async fn on_message(&mut self, channel: &str, payload: String);

    /// The subscription ended; `count` is the number of subscriptions left
    async fn on_unsubscribe(&mut self, channel: &str, count: usize);
}
