//! Message types exchanged with the downstream pipeline.

mod event;

pub use event::{Event, MESSAGE_FIELD};
