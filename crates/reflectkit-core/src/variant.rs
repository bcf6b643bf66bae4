//! Tagged-union runtime value.
//!
//! [`Variant`] is the unified representation for every value the reflection
//! layer can read or write: primitives, strings, collections and nested
//! object handles. It uses safe Rust constructs only - no raw pointers.
//!
//! An empty [`Variant::Void`] doubles as the universal failure sentinel:
//! failed lookups and failed conversions return it rather than raising.

use std::fmt;

use crate::collection::Collection;
use crate::object_handle::ObjectHandle;
use crate::type_id::{TypeId, type_names};

/// A dynamic value holding any reflected type.
#[derive(Clone, Default, PartialEq)]
pub enum Variant {
    /// Empty value; also the universal failure sentinel.
    #[default]
    Void,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (all signed widths stored as i64).
    Int(i64),
    /// Unsigned integer (all unsigned widths stored as u64).
    UInt(u64),
    /// Floating point (f32 and f64 stored as f64).
    Float(f64),
    /// Owned string.
    String(String),
    /// Collection of variants.
    Collection(Collection),
    /// Reference to another reflected object.
    Object(ObjectHandle),
}

impl Variant {
    /// Check if this is the empty value.
    pub fn is_void(&self) -> bool {
        matches!(self, Variant::Void)
    }

    /// Check if this holds a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, Variant::Collection(_))
    }

    /// Check if this holds an object handle.
    pub fn is_object(&self) -> bool {
        matches!(self, Variant::Object(_))
    }

    /// The type id of the held value.
    ///
    /// Object variants report the handle's referent type.
    pub fn type_id(&self) -> TypeId {
        match self {
            Variant::Void => TypeId::void(),
            Variant::Bool(_) => TypeId::boolean(),
            Variant::Int(_) => TypeId::int64(),
            Variant::UInt(_) => TypeId::uint64(),
            Variant::Float(_) => TypeId::float64(),
            Variant::String(_) => TypeId::string(),
            Variant::Collection(_) => TypeId::collection(),
            Variant::Object(handle) => handle.type_id().clone(),
        }
    }

    /// Borrow the held collection, if any.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Variant::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Borrow the held object handle, if any.
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Variant::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// Extract a typed value, applying the widening conversions.
    pub fn try_cast<T: FromVariant>(&self) -> Option<T> {
        T::from_variant(self)
    }

    /// Convert this value to a declared type.
    ///
    /// Succeeds on exact kind match and on lossless numeric widening
    /// (`int64`→`float64`, `uint64`→`int64`/`float64` in range,
    /// non-negative `int64`→`uint64`). The `variant` declared type accepts
    /// everything. Returns `None` on any other pairing - the caller
    /// surfaces that as a type-mismatch failure.
    pub fn convert_to(&self, declared: &TypeId) -> Option<Variant> {
        if declared.is_variant() {
            return Some(self.clone());
        }
        match (self, declared.name()) {
            (Variant::Void, type_names::VOID) => Some(Variant::Void),
            (Variant::Bool(_), type_names::BOOL) => Some(self.clone()),
            (Variant::Int(_), type_names::INT64) => Some(self.clone()),
            (Variant::UInt(_), type_names::UINT64) => Some(self.clone()),
            (Variant::Float(_), type_names::FLOAT64) => Some(self.clone()),
            (Variant::String(_), type_names::STRING) => Some(self.clone()),
            (Variant::Collection(_), type_names::COLLECTION) => Some(self.clone()),
            (Variant::Int(v), type_names::FLOAT64) => Some(Variant::Float(*v as f64)),
            (Variant::Int(v), type_names::UINT64) if *v >= 0 => {
                Some(Variant::UInt(*v as u64))
            }
            (Variant::UInt(v), type_names::INT64) if *v <= i64::MAX as u64 => {
                Some(Variant::Int(*v as i64))
            }
            (Variant::UInt(v), type_names::FLOAT64) => Some(Variant::Float(*v as f64)),
            (Variant::Object(handle), name) => {
                if handle.type_id().name() == name
                    || handle.definition_name() == Some(name)
                {
                    Some(self.clone())
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Void => write!(f, "Void"),
            Variant::Bool(v) => write!(f, "Bool({v})"),
            Variant::Int(v) => write!(f, "Int({v})"),
            Variant::UInt(v) => write!(f, "UInt({v})"),
            Variant::Float(v) => write!(f, "Float({v})"),
            Variant::String(v) => write!(f, "String({v:?})"),
            Variant::Collection(v) => write!(f, "Collection(len={})", v.len()),
            Variant::Object(v) => write!(f, "Object({v:?})"),
        }
    }
}

// ============================================================================
// Conversion traits
// ============================================================================

/// Construct a [`Variant`] from a typed Rust value.
pub trait IntoVariant {
    fn into_variant(self) -> Variant;
}

/// Extract a typed Rust value out of a [`Variant`].
///
/// Implementations apply the same widening rules as
/// [`Variant::convert_to`]; any other pairing yields `None`.
pub trait FromVariant: Sized {
    fn from_variant(value: &Variant) -> Option<Self>;
}

macro_rules! impl_int_variant {
    ($($ty:ty),*) => {$(
        impl IntoVariant for $ty {
            fn into_variant(self) -> Variant {
                Variant::Int(self as i64)
            }
        }

        impl From<$ty> for Variant {
            fn from(value: $ty) -> Variant {
                value.into_variant()
            }
        }

        impl FromVariant for $ty {
            fn from_variant(value: &Variant) -> Option<Self> {
                match value {
                    Variant::Int(v) => <$ty>::try_from(*v).ok(),
                    Variant::UInt(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_uint_variant {
    ($($ty:ty),*) => {$(
        impl IntoVariant for $ty {
            fn into_variant(self) -> Variant {
                Variant::UInt(self as u64)
            }
        }

        impl From<$ty> for Variant {
            fn from(value: $ty) -> Variant {
                value.into_variant()
            }
        }

        impl FromVariant for $ty {
            fn from_variant(value: &Variant) -> Option<Self> {
                match value {
                    Variant::UInt(v) => <$ty>::try_from(*v).ok(),
                    Variant::Int(v) => u64::try_from(*v).ok().and_then(|v| <$ty>::try_from(v).ok()),
                    _ => None,
                }
            }
        }
    )*};
}

impl_int_variant!(i8, i16, i32, i64);
impl_uint_variant!(u8, u16, u32, u64);

impl IntoVariant for bool {
    fn into_variant(self) -> Variant {
        Variant::Bool(self)
    }
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl IntoVariant for f64 {
    fn into_variant(self) -> Variant {
        Variant::Float(self)
    }
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::Float(v) => Some(*v),
            Variant::Int(v) => Some(*v as f64),
            Variant::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl IntoVariant for f32 {
    fn into_variant(self) -> Variant {
        Variant::Float(f64::from(self))
    }
}

impl FromVariant for f32 {
    fn from_variant(value: &Variant) -> Option<Self> {
        f64::from_variant(value).map(|v| v as f32)
    }
}

impl IntoVariant for String {
    fn into_variant(self) -> Variant {
        Variant::String(self)
    }
}

impl IntoVariant for &str {
    fn into_variant(self) -> Variant {
        Variant::String(self.to_string())
    }
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> Option<Self> {
        match value {
            Variant::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl IntoVariant for Collection {
    fn into_variant(self) -> Variant {
        Variant::Collection(self)
    }
}

impl FromVariant for Collection {
    fn from_variant(value: &Variant) -> Option<Self> {
        value.as_collection().cloned()
    }
}

impl IntoVariant for ObjectHandle {
    fn into_variant(self) -> Variant {
        Variant::Object(self)
    }
}

impl FromVariant for ObjectHandle {
    fn from_variant(value: &Variant) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl IntoVariant for Variant {
    fn into_variant(self) -> Variant {
        self
    }
}

impl FromVariant for Variant {
    fn from_variant(value: &Variant) -> Option<Self> {
        Some(value.clone())
    }
}

macro_rules! impl_from_into_variant {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Variant {
            fn from(value: $ty) -> Variant {
                value.into_variant()
            }
        }
    )*};
}

impl_from_into_variant!(bool, f32, f64, String, &str, Collection, ObjectHandle);
