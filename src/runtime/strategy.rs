//! Consumption strategies: how one pass pulls messages off a session.
//!
//! - `ListStrategy`: one blocking pop per pass, resumption on every item
//! - `ChannelStrategy`: one long-lived subscription per pass, resumption on the
//!   subscribe acknowledgment

use super::dispatcher::Dispatcher;
use crate::{DataType, InputResult, Session, SubscriptionHandler};
use async_trait::async_trait;
use tracing::info;

/// How messages are obtained from a live session
#[async_trait]
pub(crate) trait ConsumptionStrategy: Send + Sync {
    /// Run one pass against `session`
    ///
    /// `on_resume` must be called as soon as the session is confirmed to be
    /// serving data. Transport errors are returned unchanged; decode failures
    /// never are.
    async fn consume(
        &self,
        session: &mut dyn Session,
        key: &str,
        dispatcher: &Dispatcher<'_>,
        on_resume: &mut (dyn FnMut() + Send),
    ) -> InputResult<()>;

    /// Release whatever the strategy registered on the session
    async fn teardown(&self, _session: &mut dyn Session) -> InputResult<()> {
        Ok(())
    }
}

/// Pick the strategy for a data type
pub(crate) fn for_data_type(data_type: DataType) -> Box<dyn ConsumptionStrategy> {
    match data_type {
        DataType::List => Box::new(ListStrategy),
        DataType::Channel => Box::new(ChannelStrategy),
    }
}

/// Blocking pop, one item per pass
pub(crate) struct ListStrategy;

#[async_trait]
impl ConsumptionStrategy for ListStrategy {
    async fn consume(
        &self,
        session: &mut dyn Session,
        key: &str,
        dispatcher: &Dispatcher<'_>,
        on_resume: &mut (dyn FnMut() + Send),
    ) -> InputResult<()> {
        let payload = session.blocking_pop(key).await?;
        on_resume();
        dispatcher.dispatch(payload).await;
        Ok(())
    }
}

/// Subscribe and stay subscribed until the server ends it or the connection drops
pub(crate) struct ChannelStrategy;

#[async_trait]
impl ConsumptionStrategy for ChannelStrategy {
    async fn consume(
        &self,
        session: &mut dyn Session,
        key: &str,
        dispatcher: &Dispatcher<'_>,
        on_resume: &mut (dyn FnMut() + Send),
    ) -> InputResult<()> {
        let mut handler = ChannelHandler {
            dispatcher,
            on_resume,
        };
        session.subscribe(key, &mut handler).await
    }

    async fn teardown(&self, session: &mut dyn Session) -> InputResult<()> {
        session.unsubscribe().await
    }
}

struct ChannelHandler<'a, 'r> {
    dispatcher: &'a Dispatcher<'a>,
    on_resume: &'a mut (dyn FnMut() + Send + 'r),
}

#[async_trait]
impl<'a, 'r> SubscriptionHandler for ChannelHandler<'a, 'r> {
    async fn on_subscribe(&mut self, channel: &str, count: usize) {
        info!("Subscribed to {} ({})", channel, count);
        (self.on_resume)();
    }

    async fn on_message(&mut self, _channel: &str, payload: String) {
        // Dispatch absorbs decode failures, so one bad message cannot end the subscription
        self.dispatcher.dispatch(payload).await;
    }

    async fn on_unsubscribe(&mut self, channel: &str, count: usize) {
        info!("Unsubscribed from {} ({})", channel, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryTransport;
    use crate::{Codec, ConnectOptions, Event, EventSink, InputMetrics, Transport};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn options() -> ConnectOptions {
        ConnectOptions {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            timeout: Duration::from_secs(5),
            password: None,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_list_resumes_before_dispatch() {
        let transport = MemoryTransport::new();
        transport.push("jobs", r#"{"id":1}"#);
        let mut session = transport.connect(&options()).await.unwrap();

        let sink = RecordingSink::default();
        let dispatcher = Dispatcher::new(Codec::Json, &sink, InputMetrics::new("t", "jobs"));

        let mut pushed_at_resume = None;
        let mut on_resume = || pushed_at_resume = Some(sink.events.lock().unwrap().len());

        ListStrategy
            .consume(session.as_mut(), "jobs", &dispatcher, &mut on_resume)
            .await
            .unwrap();

        assert_eq!(pushed_at_resume, Some(0));
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_error_skips_resume() {
        let transport = MemoryTransport::new();
        transport.inject_error("jobs", "reset");
        let mut session = transport.connect(&options()).await.unwrap();

        let (tx, _rx) = mpsc::unbounded_channel::<Event>();
        let dispatcher = Dispatcher::new(Codec::Json, &tx, InputMetrics::new("t", "jobs"));
        let mut resumed = 0;
        let mut on_resume = || resumed += 1;

        let err = ListStrategy
            .consume(session.as_mut(), "jobs", &dispatcher, &mut on_resume)
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(resumed, 0);
    }

    #[tokio::test]
    async fn test_channel_resumes_once_per_subscription() {
        let transport = MemoryTransport::new();
        transport.push("news", r#"{"n":1}"#);
        transport.push("news", "garbage");
        transport.push("news", r#"{"n":2}"#);
        transport.close_channel("news");
        let mut session = transport.connect(&options()).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let dispatcher = Dispatcher::new(Codec::Json, &tx, InputMetrics::new("t", "news"));
        let mut resumed = 0;
        let mut on_resume = || resumed += 1;

        ChannelStrategy
            .consume(session.as_mut(), "news", &dispatcher, &mut on_resume)
            .await
            .unwrap();

        assert_eq!(resumed, 1);
        assert_eq!(rx.try_recv().unwrap().get("n"), Some(&serde_json::json!(1)));
        assert_eq!(rx.try_recv().unwrap().get("n"), Some(&serde_json::json!(2)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_channel_teardown_unsubscribes() {
        let transport = MemoryTransport::new();
        let mut session = transport.connect(&options()).await.unwrap();

        ChannelStrategy.teardown(session.as_mut()).await.unwrap();
        ListStrategy.teardown(session.as_mut()).await.unwrap();

        assert_eq!(transport.unsubscribe_count(), 1);
    }
}
