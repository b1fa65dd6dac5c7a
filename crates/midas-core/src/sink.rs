//! Product sinks: where finished data products go.
use crate::data_model::{DataProduct, ProductBatch};
use crate::error::{UnpackError, UnpackResult};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Downstream consumer of data products.
///
/// A sink receives every product of one event in a single call and takes
/// ownership of all of them.
pub trait ProductSink: Send + Sync {
    fn publish_batch(&self, batch: ProductBatch) -> UnpackResult<()>;
}

/// In-memory product store shared by the stages of a pipeline.
///
/// Publishing replaces any product already stored under the same name.
/// A whole batch is applied under one write lock, so readers never see
/// half of an event.
#[derive(Debug, Default)]
pub struct ProductManager {
    inner: RwLock<ManagerInner>,
}

#[derive(Debug, Default)]
struct ManagerInner {
    products: HashMap<String, DataProduct>,
    batches: u64,
}

impl ProductManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&ManagerInner) -> T) -> UnpackResult<T> {
        let inner = self
            .inner
            .read()
            .map_err(|e| UnpackError::Sink(format!("product store lock poisoned: {e}")))?;
        Ok(f(&inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut ManagerInner) -> T) -> UnpackResult<T> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| UnpackError::Sink(format!("product store lock poisoned: {e}")))?;
        Ok(f(&mut inner))
    }

    pub fn contains(&self, name: &str) -> UnpackResult<bool> {
        self.read(|inner| inner.products.contains_key(name))
    }

    /// Stored product names, sorted.
    pub fn names(&self) -> UnpackResult<Vec<String>> {
        self.read(|inner| {
            let mut names: Vec<String> = inner.products.keys().cloned().collect();
            names.sort();
            names
        })
    }

    pub fn tags(&self, name: &str) -> UnpackResult<Option<BTreeSet<String>>> {
        self.read(|inner| inner.products.get(name).map(|p| p.tags().clone()))
    }

    pub fn object_count(&self, name: &str) -> UnpackResult<Option<usize>> {
        self.read(|inner| inner.products.get(name).map(DataProduct::len))
    }

    /// Removes a product and hands it to the caller.
    pub fn take(&self, name: &str) -> UnpackResult<Option<DataProduct>> {
        self.write(|inner| inner.products.remove(name))
    }

    pub fn len(&self) -> UnpackResult<usize> {
        self.read(|inner| inner.products.len())
    }

    pub fn is_empty(&self) -> UnpackResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> UnpackResult<()> {
        self.write(|inner| inner.products.clear())
    }

    /// Number of batches received so far.
    pub fn batches_received(&self) -> UnpackResult<u64> {
        self.read(|inner| inner.batches)
    }
}

impl ProductSink for ProductManager {
    fn publish_batch(&self, batch: ProductBatch) -> UnpackResult<()> {
        self.write(|inner| {
            inner.batches += 1;
            for (name, product) in batch {
                inner.products.insert(name, product);
            }
        })
    }
}
