//! Collection assembly: decoded collections in, publishable products out.
//!
//! Decoder-owned objects are never moved into a product. Each surviving
//! element is deep-copied, so the unpacker is free to reuse or drop its
//! buffers on the next event.
use midas_core::{
    DataObject, DataProduct, DecodedCollections, ObjectSlot, ProductBatch, SkipReason,
    TAG_BUILT_BY_CUSTOM_UNPACKER, TAG_UNPACKED_DATA,
};
use serde::Serialize;
use tracing::debug;

/// Counters for one assembly pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub labels: usize,
    pub skipped_labels: usize,
    pub products: usize,
    pub objects: usize,
    pub null_objects: usize,
    pub clone_failures: usize,
}

/// Output of one assembly pass.
#[derive(Debug, Default)]
pub struct Assembly {
    pub batch: ProductBatch,
    pub stats: AssemblyStats,
}

pub struct CollectionAssembler {
    tags: Vec<String>,
}

impl Default for CollectionAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionAssembler {
    /// Assembler tagging products as unpacked data built by this stage.
    pub fn new() -> Self {
        Self::with_tags([TAG_UNPACKED_DATA, TAG_BUILT_BY_CUSTOM_UNPACKER])
    }

    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Builds one product per label that has at least one clonable object.
    ///
    /// Labels keep the unpacker's order; objects keep their order within a
    /// label.
    pub fn assemble(&self, collections: &DecodedCollections) -> Assembly {
        let mut assembly = Assembly {
            batch: ProductBatch::with_capacity(collections.len()),
            stats: AssemblyStats::default(),
        };

        for (label, objects) in collections.iter() {
            assembly.stats.labels += 1;
            match self.assemble_label(label, objects, &mut assembly.stats) {
                Ok(product) => {
                    debug!(label, count = product.len(), "prepared data product");
                    assembly.stats.products += 1;
                    assembly.stats.objects += product.len();
                    assembly.batch.push(product);
                }
                Err(reason) => {
                    debug!(label, reason = %reason, "skipping label");
                    assembly.stats.skipped_labels += 1;
                }
            }
        }

        assembly
    }

    /// Builds the product for a single label, or says why there is none.
    pub fn assemble_label(
        &self,
        label: &str,
        objects: Option<&[ObjectSlot]>,
        stats: &mut AssemblyStats,
    ) -> Result<DataProduct, SkipReason> {
        let objects = objects.ok_or(SkipReason::NullCollection)?;
        if objects.is_empty() {
            return Err(SkipReason::EmptyCollection);
        }

        let mut owned: Vec<Box<dyn DataObject>> = Vec::with_capacity(objects.len());
        for slot in objects {
            match clone_slot(slot) {
                Ok(copy) => owned.push(copy),
                Err(SkipReason::NullObject) => stats.null_objects += 1,
                Err(reason) => {
                    debug!(label, reason = %reason, "dropping object");
                    stats.clone_failures += 1;
                }
            }
        }

        if owned.is_empty() {
            return Err(SkipReason::NothingCloned);
        }

        Ok(DataProduct::new(label, self.tags.iter().cloned(), owned))
    }
}

fn clone_slot(slot: &ObjectSlot) -> Result<Box<dyn DataObject>, SkipReason> {
    let object = slot.as_ref().ok_or(SkipReason::NullObject)?;
    object.clone_object().ok_or(SkipReason::CloneFailure)
}
