//! Collection-element properties.
//!
//! Path binding synthesizes a [`CollectionElementProperty`] for each
//! `[key]` segment: it reads the parent collection by value, addresses one
//! element, and writes the whole collection back through the parent on
//! mutation. Nested segments chain element properties as parents.

use reflectkit_core::{Collection, CollectionKey, MetaData, NameHash, ObjectHandle, TypeId, Variant};

use super::{Property, PropertyPtr, PropertyTraits};

/// One element of a collection-valued property.
pub struct CollectionElementProperty {
    name: String,
    name_hash: NameHash,
    declared_type: TypeId,
    metadata: MetaData,
    parent: PropertyPtr,
    key: CollectionKey,
}

impl CollectionElementProperty {
    /// Address `key` inside the collection produced by `parent`.
    pub fn new(parent: PropertyPtr, key: CollectionKey) -> Self {
        let name = format!("[{key}]");
        let name_hash = NameHash::of_property(&name);
        Self {
            name,
            name_hash,
            // Elements are heterogeneous; the declared type accepts any
            // reflected value.
            declared_type: TypeId::variant(),
            metadata: MetaData::new(),
            parent,
            key,
        }
    }

    /// The key this property addresses.
    pub fn key(&self) -> &CollectionKey {
        &self.key
    }

    fn parent_collection(&self, object: &ObjectHandle) -> Option<Collection> {
        self.parent.get(object).as_collection().cloned()
    }
}

impl Property for CollectionElementProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    fn declared_type(&self) -> &TypeId {
        &self.declared_type
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn traits(&self) -> PropertyTraits {
        let mut traits = PropertyTraits::VALUE;
        if self.parent.read_only() {
            traits |= PropertyTraits::READ_ONLY;
        }
        traits
    }

    fn get(&self, object: &ObjectHandle) -> Variant {
        self.parent_collection(object)
            .and_then(|collection| collection.get(&self.key).cloned())
            .unwrap_or(Variant::Void)
    }

    fn set(&self, object: &ObjectHandle, value: Variant) -> bool {
        if self.read_only() {
            return false;
        }
        let Some(mut collection) = self.parent_collection(object) else {
            return false;
        };
        if !collection.replace(&self.key, value) {
            return false;
        }
        self.parent.set(object, Variant::Collection(collection))
    }
}
