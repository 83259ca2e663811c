//! Input Runtime for Queue → Pipeline inputs
//!
//! Owns the session to the queue service and the retry budget, and drives the
//! configured consumption strategy forever.

use super::dispatcher::Dispatcher;
use super::strategy::{self, ConsumptionStrategy};
use crate::retry::{RetryBudget, RetryPolicy};
use crate::{
    ConnectOptions, EventSink, InputConfig, InputError, InputMetrics, InputResult, Session,
    Transport,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Runtime for inputs (Queue service → downstream sink)
///
/// Create with `InputRuntime::new()` and run with `.run(sink).await`. The
/// runtime keeps at most one live session and reconnects lazily after any
/// transport failure.
pub struct InputRuntime<T: Transport> {
    transport: T,
    config: InputConfig,
    connect_options: ConnectOptions,
    identity: String,
    strategy: Box<dyn ConsumptionStrategy>,
    retry_policy: RetryPolicy,
    /// Live session, `None` until connected and after every transport failure
    session: Option<Box<dyn Session>>,
    metrics: InputMetrics,
    shutdown: ShutdownHandle,
}

impl<T: Transport> InputRuntime<T> {
    /// Create a new input runtime
    pub fn new(transport: T, config: InputConfig) -> InputResult<Self> {
        // Validate configuration
        config.validate()?;

        // Initialize tracing
        Self::init_tracing(&config);

        let identity = config.identity();
        info!("Initializing {} v{}", crate::NAME, crate::VERSION);
        info!("Registering input {}", identity);

        let metrics = InputMetrics::new(&config.name, &config.key);
        metrics.set_health(true);
        metrics.set_retry_budget(config.retries);

        Ok(Self {
            transport,
            connect_options: config.connect_options(),
            identity,
            strategy: strategy::for_data_type(config.data_type),
            retry_policy: RetryPolicy::new(config.retries, config.retry_backoff()),
            session: None,
            metrics,
            shutdown: ShutdownHandle::new(),
            config,
        })
    }

    /// Handle that stops `run` from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Whether a session is currently open
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Validated configuration the runtime was built with
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Pull messages and push decoded events into `sink` until shut down
    ///
    /// Only returns after a shutdown request (`Ok`) or once the retry budget is
    /// spent (`InputError::RetriesExhausted`). `teardown` runs in both cases.
    pub async fn run<K: EventSink>(&mut self, sink: K) -> InputResult<()> {
        info!("Starting input {}", self.identity);

        // Setup shutdown handler
        let signal_listener = self.setup_shutdown_handler();
        let shutdown = self.shutdown.clone();

        let dispatcher = Dispatcher::new(self.config.format, &sink, self.metrics.clone());

        let result = tokio::select! {
            result = self.listener_loop(&dispatcher) => result,
            _ = shutdown.wait() => {
                info!("Shutdown requested");
                Ok(())
            }
        };

        signal_listener.abort();
        self.teardown().await;

        if let Err(e) = &result {
            error!("Input {} stopped: {}", self.identity, e);
        } else {
            info!("Input {} stopped", self.identity);
        }
        result
    }

    /// Release the session
    ///
    /// In channel mode a live session is unsubscribed first so the service stops
    /// delivering to it. Errors are logged, never returned.
    pub async fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = self.strategy.teardown(session.as_mut()).await {
                warn!("Failed to tear down {}: {}", self.identity, e);
            }
            if let Err(e) = session.disconnect().await {
                debug!("Failed to disconnect from {}: {}", self.identity, e);
            }
        }
        self.metrics.set_health(false);
    }

    /// Outer loop: a fresh retry budget per pass, bounded retries within a pass
    async fn listener_loop(&mut self, dispatcher: &Dispatcher<'_>) -> InputResult<()> {
        loop {
            let mut budget = self.retry_policy.budget();
            self.metrics.set_retry_budget(budget.remaining());

            loop {
                match self.listen_once(dispatcher, &mut budget).await {
                    Ok(()) => break,
                    Err(e) if e.is_transport() => {
                        self.metrics.record_transport_failure();
                        warn!(
                            "Failed to get event from {}. Will retry {} times. Error: {}",
                            self.identity,
                            budget.remaining(),
                            e
                        );
                        debug!("Transport failure detail: {:?}", e);

                        if budget.is_exhausted() {
                            error!("Connection to {} failed too many times", self.identity);
                            self.metrics.set_health(false);
                            return Err(InputError::retries_exhausted(
                                self.retry_policy.max_retries(),
                                e,
                            ));
                        }

                        // Force a reconnect on the next attempt
                        self.session = None;
                        budget.consume();
                        self.metrics.record_retry();
                        self.metrics.set_retry_budget(budget.remaining());
                        tokio::time::sleep(self.retry_policy.backoff()).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    /// Connect if needed, then run the strategy once
    async fn listen_once(
        &mut self,
        dispatcher: &Dispatcher<'_>,
        budget: &mut RetryBudget,
    ) -> InputResult<()> {
        if self.session.is_none() {
            debug!("Connecting to {}", self.identity);
            let session = self.transport.connect(&self.connect_options).await?;
            self.metrics.record_connect();
            self.metrics.set_health(true);
            self.session = Some(session);
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| InputError::transport("No live session"))?;

        let metrics = &self.metrics;
        let mut on_resume = || {
            budget.reset();
            metrics.set_retry_budget(budget.remaining());
        };

        self.strategy
            .consume(session.as_mut(), &self.config.key, dispatcher, &mut on_resume)
            .await
    }

    /// Setup shutdown signal handler for SIGINT
    fn setup_shutdown_handler(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received shutdown signal");
                    shutdown.trigger();
                }
                Err(e) => warn!("Failed to listen for ctrl-c: {}", e),
            }
        })
    }

    /// Initialize tracing/logging
    fn init_tracing(config: &InputConfig) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok(); // Ignore if already initialized
    }
}

/// Stops a running input
///
/// Clones share the same signal. Triggering it drops any pending pop or
/// subscription wait, after which the runtime tears down and `run` returns `Ok`.
/// An item already popped but still waiting for room in a full bounded sink is
/// dropped with it and is not put back on the list.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown is requested
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            // The sender lives in `self`, so the channel cannot close while we wait
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
