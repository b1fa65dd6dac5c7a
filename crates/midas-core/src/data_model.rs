//! Data Model: DataObject, DataProduct, ProductBatch
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

/// Tag carried by every product built from unpacked event data.
pub const TAG_UNPACKED_DATA: &str = "unpacked_data";

/// Provenance tag for products built by the custom unpacker stage.
pub const TAG_BUILT_BY_CUSTOM_UNPACKER: &str = "built_by_custom_midas_unpacker";

/// An object produced by an unpacker.
///
/// Objects are owned by the unpacker that produced them and may be reused
/// or destroyed on its next decode call, so anything that outlives a decode
/// pass must go through [`DataObject::clone_object`].
pub trait DataObject: Any + Send + Sync + fmt::Debug {
    /// Name of the concrete type, for diagnostics.
    fn class_name(&self) -> &str;

    /// Deep copy of this object, or `None` when it cannot be copied.
    fn clone_object(&self) -> Option<Box<dyn DataObject>>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn DataObject {
    pub fn downcast_ref<T: DataObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: DataObject>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A named, tagged container owning deep copies of decoded objects.
///
/// Products are assembled in one go and expose no mutating accessors, so
/// once handed to a sink their contents are fixed.
#[derive(Debug)]
pub struct DataProduct {
    name: String,
    tags: BTreeSet<String>,
    objects: Vec<Box<dyn DataObject>>,
}

impl DataProduct {
    pub fn new<I, S>(name: impl Into<String>, tags: I, objects: Vec<Box<dyn DataObject>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            objects,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn objects(&self) -> &[Box<dyn DataObject>] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects of type `T`, in container order.
    pub fn objects_of<T: DataObject>(&self) -> impl Iterator<Item = &T> {
        self.objects.iter().filter_map(|o| o.downcast_ref::<T>())
    }

    pub fn into_objects(self) -> Vec<Box<dyn DataObject>> {
        self.objects
    }
}

/// Every product built from one event, in assembly order.
#[derive(Debug, Default)]
pub struct ProductBatch {
    entries: Vec<(String, DataProduct)>,
}

impl ProductBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a product under its own name.
    pub fn push(&mut self, product: DataProduct) {
        self.entries.push((product.name().to_string(), product));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&DataProduct> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, product)| product)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataProduct)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), p))
    }

    /// Total number of objects across every product.
    pub fn object_count(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.len()).sum()
    }
}

impl IntoIterator for ProductBatch {
    type Item = (String, DataProduct);
    type IntoIter = std::vec::IntoIter<(String, DataProduct)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
