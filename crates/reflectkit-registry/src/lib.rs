//! reflectkit-registry - the reflection object model.
//!
//! This crate provides the runtime type system on top of
//! `reflectkit-core`: property contracts and storage, class definitions
//! (native and generic), the definition manager, property accessors bound
//! by path, object handles with explicit ownership, and the object
//! identity registry.
//!
//! # Control Flow
//!
//! A caller asks the [`DefinitionManager`] for a [`ClassDefinition`] by
//! name (or by inspecting an `ObjectHandle`), binds a property path into a
//! [`PropertyAccessor`], and gets/sets through it. Every successful
//! mutation notifies the manager's
//! [`PropertyAccessorListener`]s - the hook the undo/redo
//! and live-UI layers build on.

pub mod definition;
pub mod definition_manager;
pub mod generic_object;
pub mod listener;
pub mod object_manager;
pub mod property;
pub mod property_accessor;
pub mod property_iterator;
pub mod property_path;
pub mod property_storage;

pub use definition::{
    ClassDefinition, ClassDefinitionDetails, DefinitionModifier, DefinitionState,
    GenericDefinition, NativeDefinition, NativeDefinitionBuilder,
};
pub use definition_manager::DefinitionManager;
pub use generic_object::{GenericObject, GenericObjectHandle};
pub use listener::PropertyAccessorListener;
pub use object_manager::{ObjectLink, ObjectManager};
pub use property::{
    AccessorProperty, CollectionElementProperty, GenericProperty, MethodParameters,
    MethodProperty, Property, PropertyPtr, PropertyTraits,
};
pub use property_accessor::PropertyAccessor;
pub use property_iterator::{IterateStrategy, PropertyIterator};
pub use property_path::{PathSegment, parse_path};
pub use property_storage::{PropertyCursor, PropertyStorage};
