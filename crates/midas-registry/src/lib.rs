//! MIDAS Registry: unpacker lookup by class name
//!
//! Stages name their unpacker in configuration; this crate turns that name
//! into an instance. Registries are either scoped (an [`UnpackerRegistry`]
//! owned by the caller) or the process-wide one behind [`register_global`].
//!
//! # Example
//!
//! ```ignore
//! let mut registry = UnpackerRegistry::new();
//! registry.register_default::<TriggerUnpacker>("TriggerUnpacker");
//!
//! let unpacker = registry.create("TriggerUnpacker")?;
//! ```
pub mod global;
pub mod unpacker_registry;

pub use global::{create_global, register_global, with_global_registry};
pub use unpacker_registry::{ClassFactory, DefaultFactory, UnpackerRegistry};
