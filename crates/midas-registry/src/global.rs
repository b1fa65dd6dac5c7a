//! Process-wide registry, populated at startup.
use crate::unpacker_registry::{ClassFactory, UnpackerRegistry};
use midas_core::{EventUnpacker, UnpackError, UnpackResult};
use once_cell::sync::Lazy;
use std::sync::RwLock;

static GLOBAL: Lazy<RwLock<UnpackerRegistry>> = Lazy::new(|| RwLock::new(UnpackerRegistry::new()));

fn poisoned<E: std::fmt::Display>(e: E) -> UnpackError {
    UnpackError::Registry(format!("registry lock poisoned: {e}"))
}

/// Registers a factory in the process-wide registry.
///
/// Returns `false` if the name is already taken.
pub fn register_global<F: ClassFactory + 'static>(class_name: &str, factory: F) -> UnpackResult<bool> {
    let mut registry = GLOBAL.write().map_err(poisoned)?;
    Ok(registry.try_register(class_name, factory))
}

/// Builds an unpacker from the process-wide registry.
pub fn create_global(class_name: &str) -> UnpackResult<Box<dyn EventUnpacker>> {
    let registry = GLOBAL.read().map_err(poisoned)?;
    registry.create(class_name)
}

/// Runs `f` with read access to the process-wide registry.
pub fn with_global_registry<T>(f: impl FnOnce(&UnpackerRegistry) -> T) -> UnpackResult<T> {
    let registry = GLOBAL.read().map_err(poisoned)?;
    Ok(f(&registry))
}
