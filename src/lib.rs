//! # Queue Input Core
//!
//! A long-running input that pulls messages from a queue service and hands each
//! decoded event to a downstream pipeline.
//!
//! The input never stops on its own. Transport failures are retried against a
//! bounded budget with a fixed pause between reconnects, and the budget is
//! refilled as soon as the connection is confirmed to be serving data again.
//! Payloads that cannot be decoded are logged and dropped without touching the
//! connection.
//!
//! ## Overview
//!
//! Two ways of reading a key are supported:
//! - **List**: blocking pop of one item at a time
//! - **Channel**: publish/subscribe, one long-lived subscription
//!
//! The queue service itself is reached through the [`Transport`] and [`Session`]
//! traits; [`utils::MemoryTransport`] is an in-process implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queue_input_core::utils::MemoryTransport;
//! use queue_input_core::{DataType, Event, InputConfig, InputResult, InputRuntime};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> InputResult<()> {
//!     let config = InputConfig::new("logstash", DataType::List);
//!     let mut runtime = InputRuntime::new(MemoryTransport::new(), config)?;
//!
//!     let (tx, mut rx) = mpsc::channel::<Event>(1024);
//!     tokio::spawn(async move {
//!         while let Some(event) = rx.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     runtime.run(tx).await
//! }
//! ```

mod codec;
mod config;
mod error;
mod message;
mod metrics;
mod retry;
mod runtime;
mod sink;
mod traits;
pub mod utils;

// Re-export public API
pub use codec::{Codec, DecodeCause, DecodeError};
pub use config::{ConnectOptions, DataType, InputConfig, Password};
pub use error::{InputError, InputResult};
pub use message::{Event, MESSAGE_FIELD};
pub use metrics::InputMetrics;
pub use runtime::{InputRuntime, ShutdownHandle};
pub use sink::EventSink;
pub use traits::{Session, SubscriptionHandler, Transport};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
