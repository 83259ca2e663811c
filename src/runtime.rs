//! Runtime for managing the input lifecycle.
//!
//! `InputRuntime` handles:
//! - Session setup against the queue service, and reconnects
//! - The retry budget and its resets on resumption
//! - List (blocking pop) and channel (subscribe) consumption
//! - Decoding and handing events to the sink
//! - Graceful shutdown

mod dispatcher;
mod input_runtime;
mod strategy;

// Re-export public API types
pub use input_runtime::{InputRuntime, ShutdownHandle};
