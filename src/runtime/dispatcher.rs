//! Decode-and-push for raw payloads.

use crate::{Codec, EventSink, InputMetrics};
use tokio::time::Instant;
use tracing::{debug, error};

/// Hands raw payloads to the sink after decoding them
///
/// Undecodable payloads are logged and dropped here; nothing about them ever
/// reaches the retry logic.
pub(crate) struct Dispatcher<'a> {
    codec: Codec,
    sink: &'a dyn EventSink,
    metrics: InputMetrics,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(codec: Codec, sink: &'a dyn EventSink, metrics: InputMetrics) -> Self {
        Self {
            codec,
            sink,
            metrics,
        }
    }

    /// Decode `raw` and push the resulting event, or log and drop it
    pub(crate) async fn dispatch(&self, raw: String) {
        let start = Instant::now();
        self.metrics.record_received();

        match self.codec.decode(&raw) {
            Ok(event) => {
                self.sink.push(event).await;
                self.metrics.record_pushed();
                self.metrics.record_processing_time(start.elapsed());
            }
            Err(e) => {
                self.metrics.record_decode_failure();
                error!("{}", e);
                debug!("Decode failure detail: {:?}", e);
            }
        }
    }
}
