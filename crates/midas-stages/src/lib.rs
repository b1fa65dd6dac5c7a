//! MIDAS Stages: the custom unpacker stage and its building blocks.
//!
//! # Pipeline Flow
//!
//! ```text
//! RawEvent → EventUnpacker → CollectionAssembler → BatchPublisher → ProductSink
//!              ↓                    ↓                     ↓
//!        DecodedCollections   ProductBatch          one call per event
//! ```
//!
//! The unpacker is picked by name at `init` time from an
//! [`midas_registry::UnpackerRegistry`], either a scoped one or the
//! process-wide registry.

mod assembler;
mod config;
mod custom_unpacker;
mod publisher;

pub use assembler::{Assembly, AssemblyStats, CollectionAssembler};
pub use config::UnpackerConfig;
pub use custom_unpacker::{CustomMidasUnpackerStage, StageState, StageStats, STAGE_NAME};
pub use publisher::BatchPublisher;

/// Convenience helper returning the stage as a boxed [`midas_core::Stage`],
/// resolving unpackers through the process-wide registry.
pub fn custom_unpacker_stage() -> Box<dyn midas_core::Stage> {
    Box::new(CustomMidasUnpackerStage::new())
}
