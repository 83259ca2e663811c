//! Memory-backed input demo
//!
//! Feeds a few payloads (one of them malformed) through a list input backed by
//! `MemoryTransport`, with a flaky first connection, and prints the events that
//! reach the sink.
//!
//! Run with: `cargo run --example memory_input`

use queue_input_core::utils::MemoryTransport;
use queue_input_core::{DataType, Event, InputConfig, InputResult, InputRuntime};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> InputResult<()> {
    let mut config = InputConfig::new("logstash", DataType::List);
    config.retries = 3;
    config.retry_backoff_ms = 200;
    config.log_level = "debug".to_string();

    let transport = MemoryTransport::new();
    transport.fail_connects(1);
    transport.push("logstash", r#"{"message":"hello","source":"demo"}"#);
    transport.push("logstash", "not-json");
    transport.push("logstash", r#"{"message":"world","source":"demo"}"#);

    let mut runtime = InputRuntime::new(transport.clone(), config)?;
    let shutdown = runtime.shutdown_handle();
    println!(
        "{} v{} reading {} from {}",
        queue_input_core::NAME,
        queue_input_core::VERSION,
        runtime.config().data_type,
        runtime.config().key
    );

    let (tx, mut rx) = mpsc::channel::<Event>(16);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("event: {}", event.to_value());
        }
    });

    // Late publisher
    let feeder = transport.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        feeder.push("logstash", r#"{"message":"late arrival"}"#);
        tokio::time::sleep(Duration::from_millis(500)).await;
        shutdown.trigger();
    });

    runtime.run(tx).await?;
    let _ = printer.await;
    Ok(())
}
