//! Stage Context: what the host shares with every stage of a pipeline
use crate::sink::ProductSink;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct StageContext {
    pub trace_id: String,
    products: Arc<dyn ProductSink>,
}

impl StageContext {
    pub fn new(products: Arc<dyn ProductSink>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            products,
        }
    }

    /// Sink receiving the products published by stages.
    pub fn products(&self) -> &dyn ProductSink {
        self.products.as_ref()
    }
}

impl fmt::Debug for StageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}
