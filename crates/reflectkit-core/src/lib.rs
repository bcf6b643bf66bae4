//! reflectkit-core - value and identity types for the reflection layer.
//!
//! This crate is the leaf of the reflectkit workspace: deterministic name
//! hashing, runtime type identity, the [`Variant`] value union,
//! collections, stable object ids, metadata annotations and the
//! object-handle/storage model. The object model itself (definitions,
//! properties, registries) lives in `reflectkit-registry` on top of these
//! types.

pub mod collection;
pub mod error;
pub mod metadata;
pub mod name_hash;
pub mod object_handle;
pub mod ref_object_id;
pub mod serializer;
pub mod type_id;
pub mod variant;

pub use collection::{Collection, CollectionKey};
pub use error::{RegistrationError, SerializeError};
pub use metadata::{MetaData, MetaKind};
pub use name_hash::{NameHash, hash_domains};
pub use object_handle::{ObjectHandle, ObjectStorage, UnmanagedPool};
pub use ref_object_id::{ParseRefObjectIdError, RefObjectId};
pub use serializer::Serializer;
pub use type_id::{TypeId, type_names};
pub use variant::{FromVariant, IntoVariant, Variant};
