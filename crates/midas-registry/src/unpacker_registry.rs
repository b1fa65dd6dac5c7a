//! Unpacker Registry
//!
//! Maps class names to factories so a stage can build its unpacker from a
//! name found in configuration, without knowing the concrete type.
use midas_core::{EventUnpacker, RegisteredClass, UnpackError, UnpackResult};
use std::collections::HashMap;
use tracing::{debug, error};

/// Builds fresh instances of one registered class.
pub trait ClassFactory: Send + Sync {
    /// A new instance, or `None` when construction failed.
    fn create(&self) -> Option<Box<dyn RegisteredClass>>;
}

impl<F> ClassFactory for F
where
    F: Fn() -> Option<Box<dyn RegisteredClass>> + Send + Sync,
{
    fn create(&self) -> Option<Box<dyn RegisteredClass>> {
        self()
    }
}

/// Factory for any unpacker type with a `Default` constructor.
pub struct DefaultFactory<U>(std::marker::PhantomData<fn() -> U>);

impl<U> DefaultFactory<U> {
    pub fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<U> Default for DefaultFactory<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ClassFactory for DefaultFactory<U>
where
    U: RegisteredClass + Default + 'static,
{
    fn create(&self) -> Option<Box<dyn RegisteredClass>> {
        Some(Box::new(U::default()))
    }
}

#[derive(Default)]
pub struct UnpackerRegistry {
    factories: HashMap<String, Box<dyn ClassFactory>>,
}

impl UnpackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `class_name`.
    ///
    /// # Panics
    /// Panics if the name is already taken. Use `try_register` otherwise.
    pub fn register<F: ClassFactory + 'static>(&mut self, class_name: &str, factory: F) {
        if !self.try_register(class_name, factory) {
            panic!("Unpacker class '{}' already registered", class_name);
        }
    }

    /// Returns `false` if the name is already taken.
    pub fn try_register<F: ClassFactory + 'static>(&mut self, class_name: &str, factory: F) -> bool {
        if self.factories.contains_key(class_name) {
            return false;
        }
        self.factories
            .insert(class_name.to_string(), Box::new(factory));
        true
    }

    /// Shorthand for registering a `Default`-constructible class.
    pub fn register_default<U>(&mut self, class_name: &str)
    where
        U: RegisteredClass + Default + 'static,
    {
        self.register(class_name, DefaultFactory::<U>::new());
    }

    /// Builds the class registered under `class_name` and checks that it is
    /// an unpacker.
    ///
    /// # Errors
    /// - `UnknownImplementation` if nothing is registered under the name
    /// - `InstantiationFailure` if the factory produced no instance
    /// - `CapabilityMismatch` if the instance is not an unpacker; the
    ///   instance is dropped before returning
    pub fn create(&self, class_name: &str) -> UnpackResult<Box<dyn EventUnpacker>> {
        let factory = self.factories.get(class_name).ok_or_else(|| {
            error!(class = class_name, "unknown unpacker class");
            UnpackError::unknown_implementation(class_name, self.available_types())
        })?;

        debug!(class = class_name, "creating instance");
        let instance = factory.create().ok_or_else(|| {
            error!(class = class_name, "failed to instantiate unpacker");
            UnpackError::instantiation(class_name)
        })?;

        let built = instance.class_name().to_string();
        instance.into_unpacker().ok_or_else(|| {
            error!(class = class_name, built = %built, "instance is not an event unpacker");
            UnpackError::capability_mismatch(class_name)
        })
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Registered class names, sorted.
    pub fn available_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midas_core::{BoxError, DecodedCollections, RawEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct NullUnpacker {
        collections: DecodedCollections,
    }

    midas_core::impl_event_unpacker!(NullUnpacker, "NullUnpacker");

    impl EventUnpacker for NullUnpacker {
        fn unpack_event(&mut self, _event: &mut dyn RawEvent) -> Result<(), BoxError> {
            Ok(())
        }
        fn collections(&self) -> &DecodedCollections {
            &self.collections
        }
    }

    /// Registered, but not an unpacker. Counts its drops.
    struct Histogram {
        drops: Arc<AtomicUsize>,
    }

    impl RegisteredClass for Histogram {
        fn class_name(&self) -> &str {
            "Histogram"
        }
    }

    impl Drop for Histogram {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = UnpackerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.available_types().is_empty());
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = UnpackerRegistry::new();
        registry.register_default::<NullUnpacker>("NullUnpacker");

        assert!(registry.contains("NullUnpacker"));
        assert!(!registry.contains("Other"));
        let unpacker = registry.create("NullUnpacker").unwrap();
        assert_eq!(unpacker.class_name(), "NullUnpacker");
        assert!(unpacker.collections().is_empty());
    }

    #[test]
    fn test_each_create_builds_a_new_instance() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let mut registry = UnpackerRegistry::new();
        registry.register("Counted", move || -> Option<Box<dyn RegisteredClass>> {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Box::new(NullUnpacker::default()))
        });

        registry.create("Counted").unwrap();
        registry.create("Counted").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_class() {
        let mut registry = UnpackerRegistry::new();
        registry.register_default::<NullUnpacker>("NullUnpacker");

        let err = registry.create("Missing").err().unwrap();
        assert!(matches!(err, UnpackError::UnknownImplementation { .. }));
        assert!(err.to_string().contains("available: [NullUnpacker]"));
    }

    #[test]
    fn test_factory_returning_nothing() {
        let mut registry = UnpackerRegistry::new();
        registry.register("Broken", || -> Option<Box<dyn RegisteredClass>> { None });

        let err = registry.create("Broken").err().unwrap();
        assert!(matches!(err, UnpackError::InstantiationFailure(ref name) if name == "Broken"));
    }

    #[test]
    fn test_capability_mismatch_drops_instance() {
        let drops = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&drops);
        let mut registry = UnpackerRegistry::new();
        registry.register("Histogram", move || -> Option<Box<dyn RegisteredClass>> {
            Some(Box::new(Histogram {
                drops: Arc::clone(&handle),
            }))
        });

        let err = registry.create("Histogram").err().unwrap();
        assert!(matches!(err, UnpackError::CapabilityMismatch(_)));
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = UnpackerRegistry::new();
        registry.register_default::<NullUnpacker>("NullUnpacker");
        registry.register_default::<NullUnpacker>("NullUnpacker");
    }

    #[test]
    fn test_try_register_returns_false_on_duplicate() {
        let mut registry = UnpackerRegistry::new();
        assert!(registry.try_register("NullUnpacker", DefaultFactory::<NullUnpacker>::new()));
        assert!(!registry.try_register("NullUnpacker", DefaultFactory::<NullUnpacker>::new()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_available_types_sorted() {
        let mut registry = UnpackerRegistry::new();
        registry.register_default::<NullUnpacker>("b");
        registry.register_default::<NullUnpacker>("a");
        assert_eq!(registry.available_types(), vec!["a", "b"]);
    }
}
