//! The uniform property contract.
//!
//! A [`Property`] describes one slot on a definition - a native field, a
//! native method, or a dynamically-added generic slot - and knows how to
//! read, write or invoke it against an [`ObjectHandle`] of the owning
//! type. All failure is soft: reads return [`Variant::Void`], writes
//! return `false`, invocations return [`Variant::Void`].

mod element;
mod generic;
mod native;

pub use element::CollectionElementProperty;
pub use generic::GenericProperty;
pub use native::{AccessorProperty, MethodProperty};

use std::sync::Arc;

use bitflags::bitflags;
use reflectkit_core::{MetaData, NameHash, ObjectHandle, TypeId, Variant};

bitflags! {
    /// Behavioral flags of one property slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PropertyTraits: u8 {
        /// The property has a readable value.
        const VALUE = 1 << 0;
        /// The property is invokable.
        const METHOD = 1 << 1;
        /// The value is a collection supporting insert/erase.
        const COLLECTION = 1 << 2;
        /// Writes are rejected.
        const READ_ONLY = 1 << 3;
    }
}

impl Default for PropertyTraits {
    fn default() -> Self {
        PropertyTraits::VALUE
    }
}

/// Positional parameter pack for method invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodParameters {
    values: Vec<Variant>,
}

impl MethodParameters {
    /// Empty parameter pack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append a parameter.
    pub fn push(&mut self, value: impl Into<Variant>) {
        self.values.push(value.into());
    }

    /// Builder-style append.
    pub fn with(mut self, value: impl Into<Variant>) -> Self {
        self.push(value);
        self
    }

    /// Positional access.
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.values.get(index)
    }

    /// Iterate parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.values.iter()
    }
}

impl From<Vec<Variant>> for MethodParameters {
    fn from(values: Vec<Variant>) -> Self {
        Self { values }
    }
}

/// One property slot on a definition.
///
/// Implementations never outlive their definition's storage and are shared
/// behind [`PropertyPtr`].
pub trait Property: Send + Sync {
    /// Property name.
    fn name(&self) -> &str;

    /// Precomputed hash of the name, used for O(1) lookup.
    fn name_hash(&self) -> NameHash;

    /// Declared value type.
    fn declared_type(&self) -> &TypeId;

    /// Annotations attached to this property.
    fn metadata(&self) -> &MetaData;

    /// Behavioral flags.
    fn traits(&self) -> PropertyTraits;

    /// Check if this property has a readable value.
    fn is_value(&self) -> bool {
        self.traits().contains(PropertyTraits::VALUE)
    }

    /// Check if this property is invokable.
    fn is_method(&self) -> bool {
        self.traits().contains(PropertyTraits::METHOD)
    }

    /// Check if the value is a collection.
    fn is_collection(&self) -> bool {
        self.traits().contains(PropertyTraits::COLLECTION)
    }

    /// Check if writes are rejected.
    fn read_only(&self) -> bool {
        self.traits().contains(PropertyTraits::READ_ONLY)
    }

    /// Read the value off `object`.
    ///
    /// Returns [`Variant::Void`] if the property is method-only or the
    /// object cannot be reconciled with the owning definition.
    fn get(&self, object: &ObjectHandle) -> Variant;

    /// Write `value` onto `object`.
    ///
    /// Returns false - leaving the object unchanged - when the property is
    /// read-only, the value is not convertible to the declared type, or
    /// the object cannot be reconciled.
    fn set(&self, object: &ObjectHandle, value: Variant) -> bool;

    /// Invoke a method property.
    ///
    /// Non-methods and parameter mismatches return [`Variant::Void`].
    fn invoke(&self, _object: &ObjectHandle, _parameters: &MethodParameters) -> Variant {
        Variant::Void
    }

    /// Number of parameters an invocation expects. Zero for non-methods.
    fn parameter_count(&self) -> usize {
        0
    }
}

/// Shared property reference.
pub type PropertyPtr = Arc<dyn Property>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_traits_are_value() {
        let traits = PropertyTraits::default();
        assert!(traits.contains(PropertyTraits::VALUE));
        assert!(!traits.contains(PropertyTraits::METHOD));
        assert!(!traits.contains(PropertyTraits::READ_ONLY));
    }

    #[test]
    fn parameter_pack() {
        let params = MethodParameters::new().with(1i64).with("two");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(0), Some(&Variant::Int(1)));
        assert_eq!(params.get(1), Some(&Variant::from("two")));
        assert_eq!(params.get(2), None);
    }
}
