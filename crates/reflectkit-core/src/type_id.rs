//! Name-based runtime type identity.
//!
//! [`TypeId`] is the process-wide identifier for a reflected type: a type
//! name paired with its precomputed [`NameHash`]. Native Rust types get
//! their compiler type name via [`TypeId::of`]; runtime-defined types get
//! whatever name their definition carries via [`TypeId::from_name`].
//!
//! Comparison and ordering go through the hash with a full-name tie-break,
//! so two distinct names that happen to collide in the 64-bit space still
//! compare unequal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::name_hash::NameHash;

/// Canonical names for the built-in value kinds a [`crate::Variant`] can hold.
pub mod type_names {
    pub const VOID: &str = "void";
    pub const BOOL: &str = "bool";
    pub const INT64: &str = "int64";
    pub const UINT64: &str = "uint64";
    pub const FLOAT64: &str = "float64";
    pub const STRING: &str = "string";
    pub const COLLECTION: &str = "collection";
    /// Declared type accepting any reflected value.
    pub const VARIANT: &str = "variant";
}

/// A comparable, stable identifier for a reflected type.
///
/// Never owns the referent's data; cloning is cheap (shared name storage).
#[derive(Clone)]
pub struct TypeId {
    name: Arc<str>,
    hash: NameHash,
}

impl TypeId {
    /// Type id of a native Rust type, using the compiler's type name.
    pub fn of<T: ?Sized>() -> Self {
        Self::from_name(std::any::type_name::<T>())
    }

    /// Type id from a runtime name (definition names, wire names).
    pub fn from_name(name: &str) -> Self {
        TypeId {
            name: Arc::from(name),
            hash: NameHash::of_type(name),
        }
    }

    /// The `void` type (empty values, failed lookups).
    pub fn void() -> Self {
        Self::from_name(type_names::VOID)
    }

    /// The boolean type.
    pub fn boolean() -> Self {
        Self::from_name(type_names::BOOL)
    }

    /// The signed integer type.
    pub fn int64() -> Self {
        Self::from_name(type_names::INT64)
    }

    /// The unsigned integer type.
    pub fn uint64() -> Self {
        Self::from_name(type_names::UINT64)
    }

    /// The floating point type.
    pub fn float64() -> Self {
        Self::from_name(type_names::FLOAT64)
    }

    /// The string type.
    pub fn string() -> Self {
        Self::from_name(type_names::STRING)
    }

    /// The collection type.
    pub fn collection() -> Self {
        Self::from_name(type_names::COLLECTION)
    }

    /// The "any reflected value" type, used for declared types that accept
    /// every variant kind (collection elements, untyped generic slots).
    pub fn variant() -> Self {
        Self::from_name(type_names::VARIANT)
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The precomputed name hash.
    pub fn hash(&self) -> NameHash {
        self.hash
    }

    /// Check whether this is the void type.
    pub fn is_void(&self) -> bool {
        self.name.as_ref() == type_names::VOID
    }

    /// Check whether this is the accept-anything type.
    pub fn is_variant(&self) -> bool {
        self.name.as_ref() == type_names::VARIANT
    }
}

impl PartialEq for TypeId {
    fn eq(&self, other: &Self) -> bool {
        // Hash first; full name comparison breaks 64-bit collisions.
        self.hash == other.hash && self.name == other.name
    }
}

impl Eq for TypeId {}

impl PartialOrd for TypeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash
            .cmp(&other.hash)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Hash for TypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.name)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for TypeId {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_type_identity() {
        let a = TypeId::of::<i64>();
        let b = TypeId::of::<i64>();
        assert_eq!(a, b);
        assert_ne!(a, TypeId::of::<f64>());
    }

    #[test]
    fn named_type_identity() {
        let a = TypeId::from_name("Material");
        assert_eq!(a, TypeId::from_name("Material"));
        assert_eq!(a.name(), "Material");
        assert_ne!(a, TypeId::from_name("material"));
    }

    #[test]
    fn builtin_constructors() {
        assert!(TypeId::void().is_void());
        assert!(!TypeId::int64().is_void());
        assert!(TypeId::variant().is_variant());
        assert_eq!(TypeId::string().name(), "string");
    }

    #[test]
    fn ordering_is_total() {
        let mut ids = vec![
            TypeId::from_name("b"),
            TypeId::from_name("a"),
            TypeId::from_name("c"),
        ];
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
