//! Instances of runtime-defined types.
//!
//! A [`GenericObject`] is the storage behind one instance of a generic
//! definition: a bag of property values keyed by property-name hash. Each
//! stored value is stamped with the epoch of the property that wrote it,
//! so values written through a since-removed property resolve to "absent"
//! deterministically instead of leaking into a re-added namesake.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use reflectkit_core::{MetaData, NameHash, ObjectHandle, Variant};

use crate::definition::ClassDefinition;
use crate::definition_manager::DefinitionManager;
use crate::property::MethodParameters;

/// Value bag behind one generic-definition instance.
#[derive(Debug, Default)]
pub struct GenericObject {
    definition_name: String,
    values: FxHashMap<NameHash, (u64, Variant)>,
}

impl GenericObject {
    /// Fresh instance of the named generic definition.
    pub fn new(definition_name: impl Into<String>) -> Self {
        Self {
            definition_name: definition_name.into(),
            values: FxHashMap::default(),
        }
    }

    /// Name of the definition this instance was created from.
    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    /// Read a slot through a property of the given epoch.
    ///
    /// Values stamped with a different epoch belong to a property that has
    /// been removed (or not yet written through the current one) and read
    /// as absent.
    pub fn value(&self, name_hash: NameHash, epoch: u64) -> Option<Variant> {
        match self.values.get(&name_hash) {
            Some((stored_epoch, value)) if *stored_epoch == epoch => Some(value.clone()),
            _ => None,
        }
    }

    /// Write a slot, stamping it with the writing property's epoch.
    pub fn set_value(&mut self, name_hash: NameHash, epoch: u64, value: Variant) {
        self.values.insert(name_hash, (epoch, value));
    }

    /// Drop a slot regardless of epoch. No-op when absent.
    pub fn remove_value(&mut self, name_hash: NameHash) {
        self.values.remove(&name_hash);
    }

    /// Number of stored slots (including epoch-stale ones).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Convenience wrapper for working with a generic instance by name.
///
/// Routes everything through `bind_property`, so listener notification
/// behaves exactly as it does for hand-bound accessors.
pub struct GenericObjectHandle {
    handle: ObjectHandle,
    manager: DefinitionManager,
}

impl GenericObjectHandle {
    /// Wrap a handle whose definition is generic. `None` otherwise.
    pub fn new(handle: ObjectHandle, manager: DefinitionManager) -> Option<Self> {
        let definition = manager.get_object_definition(&handle)?;
        if !definition.is_generic() {
            return None;
        }
        Some(Self { handle, manager })
    }

    /// The underlying object handle.
    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    fn definition(&self) -> Option<Arc<ClassDefinition>> {
        self.manager.get_object_definition(&self.handle)
    }

    fn add_and_set(&self, definition: &Arc<ClassDefinition>, name: &str, value: Variant) -> bool {
        let is_collection = value.is_collection();
        if !definition.add_property(name, value.type_id(), MetaData::new(), is_collection) {
            return false;
        }
        definition.bind_property(name, &self.handle).set_value(value)
    }

    /// Add a new property initialized to `value`. Fails if the name is
    /// already bindable.
    pub fn add(&self, name: &str, value: Variant) -> bool {
        let Some(definition) = self.definition() else {
            return false;
        };
        if definition.bind_property(name, &self.handle).is_valid() {
            return false;
        }
        self.add_and_set(&definition, name, value)
    }

    /// Set a property, adding it when missing.
    ///
    /// Setting [`Variant::Void`] removes an existing property instead.
    pub fn set(&self, name: &str, value: Variant) -> bool {
        let Some(definition) = self.definition() else {
            return false;
        };
        let accessor = definition.bind_property(name, &self.handle);
        match (accessor.is_valid(), value.is_void()) {
            (true, false) => accessor.set_value(value),
            (true, true) => {
                definition.remove_property(name);
                false
            }
            (false, false) => self.add_and_set(&definition, name, value),
            (false, true) => false,
        }
    }

    /// Read a property. [`Variant::Void`] when missing.
    pub fn get(&self, name: &str) -> Variant {
        match self.definition() {
            Some(definition) => definition.bind_property(name, &self.handle).get_value(),
            None => Variant::Void,
        }
    }

    /// Invoke a method property.
    pub fn invoke(&self, name: &str, parameters: &MethodParameters) -> Variant {
        match self.definition() {
            Some(definition) => definition
                .bind_property(name, &self.handle)
                .invoke(parameters),
            None => Variant::Void,
        }
    }
}
