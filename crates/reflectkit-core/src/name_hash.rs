//! Deterministic hash-based name identity.
//!
//! This module provides [`NameHash`], a 64-bit hash that identifies type
//! names, property names and plain identifiers throughout the reflection
//! core. Unlike sequential ids, hashes are computed deterministically from
//! names, enabling:
//!
//! - Stable identity across plugin load/unload order
//! - O(1) lookup in hash-keyed registries without a secondary name→id map
//! - Same name = same hash, in every process
//!
//! # Hash Computation
//!
//! Uses XXHash64 seeded with domain-specific constants so that a type named
//! `Foo` and a property named `Foo` never share an identity.
//!
//! # Examples
//!
//! ```
//! use reflectkit_core::NameHash;
//!
//! let a = NameHash::of_type("PlayerState");
//! let b = NameHash::of_type("PlayerState");
//! assert_eq!(a, b); // Deterministic
//!
//! let p = NameHash::of_property("PlayerState");
//! assert_ne!(a, p); // Different domains = different hashes
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-separation seeds for hash computation.
///
/// Each entity domain gets its own seed so equal names in different domains
/// produce distinct hashes.
pub mod hash_domains {
    /// Seed for type-name hashes.
    pub const TYPE: u64 = 0x6d1f_03a9_45be_c278;

    /// Seed for property-name hashes.
    pub const PROPERTY: u64 = 0x18e4_9c2d_7f06_b35a;

    /// Seed for metadata-kind and other plain identifier hashes.
    pub const IDENT: u64 = 0xa3d2_5e81_0c97_f46b;

    /// Mixing constant used when combining two hashes into one.
    pub const COMBINE: u64 = 0x517c_c1b7_2722_0a95;
}

/// A deterministic 64-bit hash identifying a name within one domain.
///
/// The same (domain, name) pair always produces the same hash. The empty
/// hash is reserved as an "unset" sentinel and never produced for a real
/// name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NameHash(pub u64);

impl NameHash {
    /// Empty/unset hash sentinel.
    pub const EMPTY: NameHash = NameHash(0);

    /// Hash a type name.
    pub fn of_type(name: &str) -> Self {
        Self::seeded(name, hash_domains::TYPE)
    }

    /// Hash a property name.
    pub fn of_property(name: &str) -> Self {
        Self::seeded(name, hash_domains::PROPERTY)
    }

    /// Hash a plain identifier (metadata kinds, context tags).
    pub fn of_ident(name: &str) -> Self {
        Self::seeded(name, hash_domains::IDENT)
    }

    fn seeded(name: &str, seed: u64) -> Self {
        let raw = xxh64(name.as_bytes(), seed);
        // Zero is the reserved sentinel; remap the (vanishingly unlikely)
        // collision onto the seed itself so real names are never empty.
        NameHash(if raw == 0 { seed } else { raw })
    }

    /// Fold another hash into this one, order-sensitively.
    pub fn combine(self, other: NameHash) -> NameHash {
        let mixed = self
            .0
            .rotate_left(17)
            .wrapping_mul(hash_domains::COMBINE)
            .wrapping_add(other.0);
        NameHash(if mixed == 0 { hash_domains::COMBINE } else { mixed })
    }

    /// Check whether this is the unset sentinel.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw hash value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameHash({:#018x})", self.0)
    }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_hash() {
        assert_eq!(NameHash::of_type("Foo"), NameHash::of_type("Foo"));
        assert_eq!(NameHash::of_property("count"), NameHash::of_property("count"));
    }

    #[test]
    fn different_names_differ() {
        assert_ne!(NameHash::of_type("Foo"), NameHash::of_type("Bar"));
    }

    #[test]
    fn domains_are_separated() {
        let name = "Transform";
        assert_ne!(NameHash::of_type(name), NameHash::of_property(name));
        assert_ne!(NameHash::of_type(name), NameHash::of_ident(name));
        assert_ne!(NameHash::of_property(name), NameHash::of_ident(name));
    }

    #[test]
    fn empty_sentinel() {
        assert!(NameHash::EMPTY.is_empty());
        assert!(!NameHash::of_type("").is_empty());
        assert!(!NameHash::of_type("Foo").is_empty());
    }

    #[test]
    fn combine_is_order_sensitive() {
        let a = NameHash::of_type("A");
        let b = NameHash::of_type("B");
        assert_ne!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b), a.combine(b));
    }
}
