//! reflectkit - a runtime reflection and object-model core for tooling
//! frameworks.
//!
//! reflectkit lets arbitrary native and runtime-defined types be
//! introspected, bound to properties by path, mutated generically, cast
//! across inheritance, and tracked by stable identity across plugin
//! load/unload boundaries. Property grids, undo stacks, serializers and
//! scripting bridges are consumers of this crate: they ask "what
//! properties does this object have", "set this path to this value", and
//! "tell me when that changed".
//!
//! # Example
//!
//! ```
//! use reflectkit::prelude::*;
//!
//! let objects = ObjectManager::new();
//! let definitions = DefinitionManager::new(objects);
//!
//! // A runtime-defined type.
//! let details = definitions.create_generic_definition(Some("Counter"));
//! let counter = definitions.register(details).unwrap();
//! counter.add_property("count", TypeId::int64(), MetaData::new(), false);
//!
//! // An instance, bound and mutated by path.
//! let object = definitions.create_object(&counter).unwrap();
//! let accessor = counter.bind_property("count", &object);
//! assert!(accessor.set_value(Variant::Int(5)));
//! assert_eq!(accessor.get_value(), Variant::Int(5));
//! ```

pub use reflectkit_core as core;
pub use reflectkit_registry as registry;

pub use reflectkit_core::{
    Collection, CollectionKey, FromVariant, IntoVariant, MetaData, MetaKind, NameHash,
    ObjectHandle, ObjectStorage, ParseRefObjectIdError, RefObjectId, RegistrationError,
    SerializeError, Serializer, TypeId, UnmanagedPool, Variant,
};
pub use reflectkit_registry::{
    AccessorProperty, ClassDefinition, ClassDefinitionDetails, DefinitionManager,
    DefinitionModifier, DefinitionState, GenericDefinition, GenericObject, GenericObjectHandle,
    IterateStrategy, MethodParameters, MethodProperty, NativeDefinition, NativeDefinitionBuilder,
    ObjectLink, ObjectManager, Property, PropertyAccessor, PropertyAccessorListener,
    PropertyIterator, PropertyPtr, PropertyStorage, PropertyTraits,
};

/// Everything a typical consumer needs.
pub mod prelude {
    pub use reflectkit_core::{
        Collection, CollectionKey, FromVariant, IntoVariant, MetaData, MetaKind, ObjectHandle,
        ObjectStorage, RefObjectId, Serializer, TypeId, Variant,
    };
    pub use reflectkit_registry::{
        AccessorProperty, ClassDefinition, DefinitionManager, DefinitionState, GenericDefinition,
        GenericObject, GenericObjectHandle, IterateStrategy, MethodParameters, MethodProperty,
        NativeDefinition, ObjectManager, Property, PropertyAccessor, PropertyAccessorListener,
        PropertyTraits,
    };
}
