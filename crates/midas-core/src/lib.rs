//! MIDAS Core: Stage Trait, Runner, Data Model and Product Sinks
//!
//! Contracts shared by the unpacking pipeline: the stage lifecycle, the
//! unpacker capability, the data products stages publish and the sinks
//! that receive them.
//!
//! # Pipeline Flow
//!
//! ```text
//! RawEvent → Stage → EventUnpacker → DecodedCollections → ProductBatch → ProductSink
//! ```

pub mod context;
pub mod data_model;
pub mod error;
pub mod event;
pub mod runner;
pub mod sink;
pub mod stage;
pub mod unpacker;

pub use context::StageContext;
pub use data_model::{
    DataObject, DataProduct, ProductBatch, TAG_BUILT_BY_CUSTOM_UNPACKER, TAG_UNPACKED_DATA,
};
pub use error::{BoxError, SkipReason, UnpackError, UnpackResult};
pub use event::{Bank, BankType, EventHeader, MidasEvent, RawEvent};
pub use runner::PipelineRunner;
pub use sink::{ProductManager, ProductSink};
pub use stage::Stage;
pub use unpacker::{DecodedCollections, EventUnpacker, ObjectSlot, RegisteredClass};
