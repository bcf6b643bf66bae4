//! Error types for the reflection core.
//!
//! The error surface is intentionally small; most failure modes are not
//! errors at all:
//!
//! - *not-found* and *type-mismatch* never construct errors - lookups
//!   return `Option`/`None`, mutations return `false`, value reads return
//!   an empty `Variant`;
//! - *invariant violations* (duplicate definition names, cyclic parent
//!   graphs) are programmer errors: they return [`RegistrationError`] and
//!   additionally `debug_assert!` at the offending call site;
//! - *stale handles* surface as `is_valid() == false`, never as an error
//!   value.

use thiserror::Error;

/// Errors raised while registering definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A definition with this name is already registered.
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),

    /// Registering this definition would close a cycle in the parent graph.
    #[error("cyclic parent graph: registering '{name}' via parent '{parent}'")]
    CyclicParents {
        /// The definition being registered.
        name: String,
        /// The parent edge that closes the cycle.
        parent: String,
    },

    /// The definition name is empty or otherwise unusable.
    #[error("invalid definition name: {0:?}")]
    InvalidName(String),
}

/// Errors raised by a [`Serializer`](crate::Serializer) round-trip.
///
/// The wire format is the serializer's concern; the core only distinguishes
/// transport failure from data it cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// The underlying stream failed.
    #[error("serialization stream failure: {0}")]
    Stream(String),

    /// Deserialized data did not have the expected shape.
    #[error("malformed definition data: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = RegistrationError::DuplicateDefinition("Foo".to_string());
        assert_eq!(err.to_string(), "duplicate definition: Foo");

        let err = RegistrationError::CyclicParents {
            name: "A".to_string(),
            parent: "B".to_string(),
        };
        assert!(err.to_string().contains("'A'"));
        assert!(err.to_string().contains("'B'"));
    }
}
