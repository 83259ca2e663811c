//! Metrics and observability for inputs.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Metrics collector for an input
#[derive(Debug, Clone)]
pub struct InputMetrics {
    /// Input name for labeling
    input_name: String,
    /// List or channel name for labeling
    key: String,
}

impl InputMetrics {
    /// Create a new metrics collector
    pub fn new(input_name: impl Into<String>, key: impl Into<String>) -> Self {
        let input_name = input_name.into();
        let key = key.into();

        Self::register_metrics();

        Self { input_name, key }
    }

    /// Register metric descriptions
    fn register_metrics() {
        // Counters
        describe_counter!(
            "queue_input_messages_received_total",
            "Total number of raw messages pulled from the queue"
        );
        describe_counter!(
            "queue_input_events_pushed_total",
            "Total number of decoded events handed to the sink"
        );
        describe_counter!(
            "queue_input_decode_failures_total",
            "Total number of messages dropped because they could not be decoded"
        );
        describe_counter!(
            "queue_input_transport_failures_total",
            "Total number of connect, read and subscribe failures"
        );
        describe_counter!(
            "queue_input_retries_total",
            "Total number of reconnect attempts after a transport failure"
        );
        describe_counter!(
            "queue_input_connects_total",
            "Total number of sessions opened"
        );

        // Histograms
        describe_histogram!(
            "queue_input_processing_duration_seconds",
            "Time spent decoding and pushing each message"
        );

        // Gauges
        describe_gauge!(
            "queue_input_retry_budget",
            "Retries left before the input gives up"
        );
        describe_gauge!(
            "queue_input_health",
            "Input health status (1 = healthy, 0 = unhealthy)"
        );
    }

    /// Record a raw message pulled from the queue
    pub fn record_received(&self) {
        counter!(
            "queue_input_messages_received_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record an event handed to the sink
    pub fn record_pushed(&self) {
        counter!(
            "queue_input_events_pushed_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record a dropped, undecodable message
    pub fn record_decode_failure(&self) {
        counter!(
            "queue_input_decode_failures_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record a transport failure
    pub fn record_transport_failure(&self) {
        counter!(
            "queue_input_transport_failures_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record a reconnect attempt
    pub fn record_retry(&self) {
        counter!(
            "queue_input_retries_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record a newly opened session
    pub fn record_connect(&self) {
        counter!(
            "queue_input_connects_total",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .increment(1);
    }

    /// Record processing duration
    pub fn record_processing_time(&self, duration: Duration) {
        histogram!(
            "queue_input_processing_duration_seconds",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .record(duration.as_secs_f64());
    }

    /// Set the remaining retry budget
    pub fn set_retry_budget(&self, remaining: u32) {
        gauge!(
            "queue_input_retry_budget",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .set(remaining as f64);
    }

    /// Set input health status
    pub fn set_health(&self, healthy: bool) {
        gauge!(
            "queue_input_health",
            "input" => self.input_name.clone(),
            "key" => self.key.clone(),
        )
        .set(if healthy { 1.0 } else { 0.0 });
    }
}
