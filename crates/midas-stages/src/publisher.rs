use midas_core::{ProductBatch, ProductSink, UnpackResult};
use tracing::debug;

/// Hands a whole event's products to a sink in one call.
///
/// One call per event lets the sink take its lock and update its index
/// once, and downstream readers never observe part of an event.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchPublisher;

impl BatchPublisher {
    pub fn new() -> Self {
        Self
    }

    /// Publishes `batch` and returns the number of products handed over.
    /// An empty batch is not published at all.
    pub fn publish(&self, sink: &dyn ProductSink, batch: ProductBatch) -> UnpackResult<usize> {
        if batch.is_empty() {
            debug!("no products to publish");
            return Ok(0);
        }

        let count = batch.len();
        sink.publish_batch(batch)?;
        debug!(products = count, "published batch");
        Ok(count)
    }
}
