//! Serialization boundary.
//!
//! The reflection core does not define a wire format. Everything that
//! persists - definition sets, generic-object state - crosses this trait
//! as [`Variant`] values, and the host application supplies the encoding.

use crate::error::SerializeError;
use crate::variant::Variant;

/// An opaque value sink/source supplied by the host.
///
/// `serialize` and `deserialize` are expected to pair up in order: values
/// are read back in the sequence they were written.
pub trait Serializer {
    /// Write one value.
    fn serialize(&mut self, value: &Variant) -> Result<(), SerializeError>;

    /// Read the next value.
    fn deserialize(&mut self) -> Result<Variant, SerializeError>;
}
