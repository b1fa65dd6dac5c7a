//! Unpacker contract: what a decoding implementation must provide.
use crate::data_model::DataObject;
use crate::error::BoxError;
use crate::event::RawEvent;

/// One element of a decoded collection. `None` stands for a null entry.
pub type ObjectSlot = Option<Box<dyn DataObject>>;

/// Anything that can be constructed by name from a registry.
///
/// Registries may hold types that are not unpackers at all; the conversion
/// below is how a constructed instance proves it is one.
pub trait RegisteredClass: Send {
    fn class_name(&self) -> &str;

    /// Hands the instance over as an unpacker, or `None` if it is not one.
    /// The instance is consumed either way.
    fn into_unpacker(self: Box<Self>) -> Option<Box<dyn EventUnpacker>> {
        None
    }
}

/// Turns the banks of a raw event into labeled object collections.
///
/// An unpacker is only accepted by a registry if its
/// [`RegisteredClass::into_unpacker`] returns `Some(self)`; the default
/// returns `None` and the class is rejected as a capability mismatch.
/// Use [`impl_event_unpacker!`](crate::impl_event_unpacker) to write that
/// impl:
///
/// ```
/// use midas_core::{BoxError, DecodedCollections, EventUnpacker, RawEvent};
///
/// #[derive(Default)]
/// struct ScalerUnpacker {
///     collections: DecodedCollections,
/// }
///
/// midas_core::impl_event_unpacker!(ScalerUnpacker, "ScalerUnpacker");
///
/// impl EventUnpacker for ScalerUnpacker {
///     fn unpack_event(&mut self, _event: &mut dyn RawEvent) -> Result<(), BoxError> {
///         Ok(())
///     }
///     fn collections(&self) -> &DecodedCollections {
///         &self.collections
///     }
/// }
/// ```
pub trait EventUnpacker: RegisteredClass {
    /// Decodes one event, replacing the previous collections.
    fn unpack_event(&mut self, event: &mut dyn RawEvent) -> Result<(), BoxError>;

    /// Collections produced by the last [`EventUnpacker::unpack_event`] call.
    fn collections(&self) -> &DecodedCollections;
}

/// Implements [`RegisteredClass`] for an [`EventUnpacker`] type, reporting
/// `$name` as its class name and handing the instance over as an unpacker.
#[macro_export]
macro_rules! impl_event_unpacker {
    ($ty:ty, $name:expr) => {
        impl $crate::RegisteredClass for $ty {
            fn class_name(&self) -> &str {
                $name
            }

            fn into_unpacker(
                self: ::std::boxed::Box<Self>,
            ) -> ::std::option::Option<::std::boxed::Box<dyn $crate::EventUnpacker>> {
                ::std::option::Option::Some(self)
            }
        }
    };
}

/// Labeled collections in the order the unpacker produced them.
///
/// Labels are unique: inserting an existing label replaces its collection
/// in place. A label may map to no collection at all.
#[derive(Debug, Default)]
pub struct DecodedCollections {
    entries: Vec<(String, Option<Vec<ObjectSlot>>)>,
}

impl DecodedCollections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, objects: Vec<ObjectSlot>) {
        self.set(label.into(), Some(objects));
    }

    /// Registers a label without a collection behind it.
    pub fn insert_absent(&mut self, label: impl Into<String>) {
        self.set(label.into(), None);
    }

    fn set(&mut self, label: String, objects: Option<Vec<ObjectSlot>>) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = objects,
            None => self.entries.push((label, objects)),
        }
    }

    /// Appends an object to a label, creating the collection if needed.
    pub fn push(&mut self, label: &str, object: ObjectSlot) {
        match self.entries.iter_mut().find(|(l, _)| l.as_str() == label) {
            Some((_, objects)) => objects.get_or_insert_with(Vec::new).push(object),
            None => self.entries.push((label.to_string(), Some(vec![object]))),
        }
    }

    pub fn get(&self, label: &str) -> Option<Option<&[ObjectSlot]>> {
        self.entries
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, objects)| objects.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[ObjectSlot]>)> {
        self.entries
            .iter()
            .map(|(label, objects)| (label.as_str(), objects.as_deref()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
