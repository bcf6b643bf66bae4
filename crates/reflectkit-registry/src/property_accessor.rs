//! Per-access property binding.
//!
//! A [`PropertyAccessor`] is the short-lived value binding one
//! (definition, property, object) triple, produced by
//! [`ClassDefinition::bind_property`]. It is constructed per access and
//! discarded, never stored.
//!
//! Callers check [`PropertyAccessor::is_valid`] first; every operation on
//! an invalid accessor is a no-op returning a distinguishable failure
//! value (`false` / [`Variant::Void`]). Successful mutations notify the
//! owning manager's listeners exactly once, synchronously, after the
//! mutation has taken effect; failed mutations notify nobody.

use std::sync::Arc;

use reflectkit_core::{CollectionKey, MetaData, ObjectHandle, TypeId, Variant};

use crate::definition::ClassDefinition;
use crate::definition_manager::DefinitionManager;
use crate::property::{MethodParameters, PropertyPtr};

struct AccessorInner {
    manager: DefinitionManager,
    definition: Arc<ClassDefinition>,
    property: PropertyPtr,
    object: ObjectHandle,
    path: String,
}

/// A resolved binding of one property to one object.
pub struct PropertyAccessor {
    inner: Option<AccessorInner>,
}

impl PropertyAccessor {
    pub(crate) fn invalid() -> Self {
        Self { inner: None }
    }

    pub(crate) fn bound(
        manager: DefinitionManager,
        definition: Arc<ClassDefinition>,
        property: PropertyPtr,
        object: ObjectHandle,
        path: String,
    ) -> Self {
        Self {
            inner: Some(AccessorInner {
                manager,
                definition,
                property,
                object,
                path,
            }),
        }
    }

    /// Check the binding resolved and is still usable.
    ///
    /// False when the property or object could not be resolved, the
    /// object handle has gone stale, or the owning definition has been
    /// deregistered.
    pub fn is_valid(&self) -> bool {
        match &self.inner {
            Some(inner) => inner.object.is_valid() && inner.definition.is_registered(),
            None => false,
        }
    }

    /// The bound property's name.
    pub fn name(&self) -> Option<&str> {
        self.inner.as_ref().map(|inner| inner.property.name())
    }

    /// The path this accessor was bound with.
    pub fn path(&self) -> Option<&str> {
        self.inner.as_ref().map(|inner| inner.path.as_str())
    }

    /// The bound property's declared type; void when invalid.
    pub fn declared_type(&self) -> TypeId {
        match &self.inner {
            Some(inner) => inner.property.declared_type().clone(),
            None => TypeId::void(),
        }
    }

    /// The bound property's metadata.
    pub fn metadata(&self) -> Option<&MetaData> {
        self.inner.as_ref().map(|inner| inner.property.metadata())
    }

    /// The bound property.
    pub fn property(&self) -> Option<&PropertyPtr> {
        self.inner.as_ref().map(|inner| &inner.property)
    }

    /// The object the property is bound to.
    pub fn object(&self) -> Option<&ObjectHandle> {
        self.inner.as_ref().map(|inner| &inner.object)
    }

    /// The definition owning the bound property.
    pub fn definition(&self) -> Option<&Arc<ClassDefinition>> {
        self.inner.as_ref().map(|inner| &inner.definition)
    }

    // === Predicates ===

    /// Check a value can be read.
    pub fn can_get_value(&self) -> bool {
        self.is_valid()
            && self
                .inner
                .as_ref()
                .is_some_and(|inner| inner.property.is_value())
    }

    /// Check a value can be written.
    pub fn can_set_value(&self) -> bool {
        self.is_valid()
            && self.inner.as_ref().is_some_and(|inner| {
                !inner.property.read_only() && !inner.property.is_method()
            })
    }

    /// Check the property is invokable.
    pub fn can_invoke(&self) -> bool {
        self.is_valid()
            && self
                .inner
                .as_ref()
                .is_some_and(|inner| inner.property.is_method())
    }

    /// Check the value is a collection accepting inserts.
    pub fn can_insert(&self) -> bool {
        self.can_set_value() && self.get_value().is_collection()
    }

    /// Check the value is a collection accepting erases.
    pub fn can_erase(&self) -> bool {
        self.can_set_value() && self.get_value().is_collection()
    }

    // === Value access ===

    /// Read the bound value. [`Variant::Void`] when unreadable.
    pub fn get_value(&self) -> Variant {
        let Some(inner) = &self.inner else {
            return Variant::Void;
        };
        if !self.can_get_value() {
            return Variant::Void;
        }
        inner.property.get(&inner.object)
    }

    /// Write the bound value, notifying listeners on success.
    ///
    /// The value is converted to the property's declared type first; a
    /// failed conversion fails the set before any listener fires. The
    /// stored value is in place before post hooks run.
    pub fn set_value(&self, value: Variant) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };
        if !self.can_set_value() {
            return false;
        }
        let Some(converted) = value.convert_to(inner.property.declared_type()) else {
            return false;
        };

        let listeners = inner.manager.listeners_snapshot();
        for listener in &listeners {
            listener.pre_set_value(self, &converted);
        }
        let stored = inner.property.set(&inner.object, converted.clone());
        if stored {
            for listener in &listeners {
                listener.post_set_value(self, &converted);
            }
        }
        stored
    }

    /// Write the bound value without notifying listeners.
    ///
    /// Used by collection write-back and by layers (undo restore) that
    /// must not re-record the mutation.
    pub fn set_value_without_notification(&self, value: Variant) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };
        if !self.can_set_value() {
            return false;
        }
        let Some(converted) = value.convert_to(inner.property.declared_type()) else {
            return false;
        };
        inner.property.set(&inner.object, converted)
    }

    /// Invoke a method property.
    ///
    /// Parameter-count mismatches fail with [`Variant::Void`] before any
    /// listener fires.
    pub fn invoke(&self, parameters: &MethodParameters) -> Variant {
        let Some(inner) = &self.inner else {
            return Variant::Void;
        };
        if !self.can_invoke() {
            return Variant::Void;
        }
        if parameters.len() != inner.property.parameter_count() {
            return Variant::Void;
        }

        let listeners = inner.manager.listeners_snapshot();
        for listener in &listeners {
            listener.pre_invoke(self, parameters);
        }
        let result = inner.property.invoke(&inner.object, parameters);
        for listener in &listeners {
            listener.post_invoke(self, &result);
        }
        result
    }

    // === Collection access ===

    /// Insert into a collection-valued property, notifying listeners.
    ///
    /// The mutation is validated against a copy first, so a rejected key
    /// fires nothing; the write-back itself does not re-notify as a set.
    pub fn insert(&self, key: CollectionKey, value: Variant) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };
        if !self.can_insert() {
            return false;
        }
        let Some(mut collection) = self.get_value().as_collection().cloned() else {
            return false;
        };
        if !collection.insert(key.clone(), value) {
            return false;
        }

        let listeners = inner.manager.listeners_snapshot();
        for listener in &listeners {
            listener.pre_insert(self, &key, 1);
        }
        let stored = self.set_value_without_notification(Variant::Collection(collection));
        if stored {
            for listener in &listeners {
                listener.post_inserted(self, &key, 1);
            }
        }
        stored
    }

    /// Erase from a collection-valued property, notifying listeners.
    pub fn erase(&self, key: &CollectionKey) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };
        if !self.can_erase() {
            return false;
        }
        let Some(mut collection) = self.get_value().as_collection().cloned() else {
            return false;
        };
        if collection.get(key).is_none() {
            return false;
        }

        let listeners = inner.manager.listeners_snapshot();
        for listener in &listeners {
            listener.pre_erase(self, key, 1);
        }
        if !collection.erase(key) {
            return false;
        }
        let stored = self.set_value_without_notification(Variant::Collection(collection));
        if stored {
            for listener in &listeners {
                listener.post_erased(self, key, 1);
            }
        }
        stored
    }
}

impl std::fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(inner) => f
                .debug_struct("PropertyAccessor")
                .field("path", &inner.path)
                .field("property", &inner.property.name())
                .field("definition", &inner.definition.name())
                .field("valid", &self.is_valid())
                .finish(),
            None => write!(f, "PropertyAccessor(invalid)"),
        }
    }
}
