//! Type definitions.
//!
//! A [`ClassDefinition`] is the façade over one reflected type. Structural
//! queries delegate to a [`ClassDefinitionDetails`] implementation - an
//! immutable adapter for a statically-known native type
//! ([`NativeDefinition`]) or a runtime-mutable [`GenericDefinition`].
//!
//! Definitions move through a one-way lifecycle:
//! `Unregistered → Registered → Deregistered`. Deregistration is terminal;
//! accessors bound through a deregistered definition report invalid, and a
//! later definition under the same name is a distinct instance.

mod generic;
mod native;

pub use generic::GenericDefinition;
pub use native::{NativeDefinition, NativeDefinitionBuilder};

use std::any::Any;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use reflectkit_core::{MetaData, ObjectHandle, TypeId};

use crate::definition_manager::{DefinitionManager, ManagerInner};
use crate::property::{CollectionElementProperty, PropertyPtr};
use crate::property_accessor::PropertyAccessor;
use crate::property_iterator::{IterateStrategy, PropertyIterator};
use crate::property_path::{PathSegment, parse_path};
use crate::property_storage::PropertyStorage;

/// Structural backing of a [`ClassDefinition`].
///
/// Details objects are consumed by
/// [`DefinitionManager::register_definition`] and owned by the definition
/// from then on.
pub trait ClassDefinitionDetails: Send + Sync {
    /// Definition name, unique within one manager.
    fn name(&self) -> &str;

    /// Parent definition names, in declaration order.
    fn parent_names(&self) -> &[String];

    /// Definition-level annotations.
    fn metadata(&self) -> &MetaData;

    /// Whether instances cannot be created.
    fn is_abstract(&self) -> bool {
        false
    }

    /// Whether the property set can change at runtime.
    fn is_generic(&self) -> bool {
        false
    }

    /// The directly-declared property set.
    fn storage(&self) -> &PropertyStorage;

    /// O(1) lookup of a direct property by name.
    fn direct_lookup(&self, name: &str) -> Option<PropertyPtr> {
        self.storage().find_property(name)
    }

    /// Concrete type id instances of this definition carry.
    fn instance_type_id(&self) -> TypeId;

    /// Allocate a fresh instance, `None` when abstract or not constructible.
    fn create_instance(&self) -> Option<Box<dyn Any + Send + Sync>>;

    /// Runtime mutation capability, `None` for immutable details.
    fn modifier(&self) -> Option<&dyn DefinitionModifier> {
        None
    }
}

/// Runtime property-set mutation, implemented by generic details.
pub trait DefinitionModifier: Send + Sync {
    /// Synthesize and append a property. `None` if the name is taken.
    fn add_property(
        &self,
        name: &str,
        declared_type: TypeId,
        metadata: MetaData,
        is_collection: bool,
    ) -> Option<PropertyPtr>;

    /// Remove a property by name. False if absent.
    fn remove_property(&self, name: &str) -> bool;
}

/// Lifecycle state of a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionState {
    /// Created but not yet owned by a manager.
    Unregistered,
    /// Owned by a manager and resolvable by name.
    Registered,
    /// Removed from its manager. Terminal.
    Deregistered,
}

const STATE_UNREGISTERED: u8 = 0;
const STATE_REGISTERED: u8 = 1;
const STATE_DEREGISTERED: u8 = 2;

/// One reflected type: either a statically-known native type or a
/// runtime-defined generic shape.
pub struct ClassDefinition {
    details: Box<dyn ClassDefinitionDetails>,
    state: AtomicU8,
    manager: RwLock<Weak<ManagerInner>>,
}

impl ClassDefinition {
    pub(crate) fn new(details: Box<dyn ClassDefinitionDetails>) -> Self {
        Self {
            details,
            state: AtomicU8::new(STATE_UNREGISTERED),
            manager: RwLock::new(Weak::new()),
        }
    }

    pub(crate) fn attach(&self, manager: Weak<ManagerInner>) {
        *self.manager.write() = manager;
        self.state.store(STATE_REGISTERED, Ordering::Release);
    }

    pub(crate) fn mark_deregistered(&self) {
        self.state.store(STATE_DEREGISTERED, Ordering::Release);
    }

    /// Definition name.
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Definition-level annotations.
    pub fn metadata(&self) -> &MetaData {
        self.details.metadata()
    }

    /// Parent definition names, in declaration order.
    pub fn parent_names(&self) -> &[String] {
        self.details.parent_names()
    }

    /// Whether the property set can change at runtime.
    pub fn is_generic(&self) -> bool {
        self.details.is_generic()
    }

    /// Whether instances cannot be created.
    pub fn is_abstract(&self) -> bool {
        self.details.is_abstract()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DefinitionState {
        match self.state.load(Ordering::Acquire) {
            STATE_REGISTERED => DefinitionState::Registered,
            STATE_DEREGISTERED => DefinitionState::Deregistered,
            _ => DefinitionState::Unregistered,
        }
    }

    /// Check the definition is currently owned by a manager.
    pub fn is_registered(&self) -> bool {
        self.state() == DefinitionState::Registered
    }

    /// The structural details backing this definition.
    pub fn details(&self) -> &dyn ClassDefinitionDetails {
        self.details.as_ref()
    }

    /// The manager this definition is registered with.
    pub fn definition_manager(&self) -> Option<DefinitionManager> {
        self.manager.read().upgrade().map(DefinitionManager::from_inner)
    }

    /// Concrete type id instances of this definition carry.
    pub fn instance_type_id(&self) -> TypeId {
        self.details.instance_type_id()
    }

    /// Allocate a fresh instance, `None` when abstract.
    pub fn create_instance(&self) -> Option<Box<dyn Any + Send + Sync>> {
        self.details.create_instance()
    }

    // === Property queries ===

    /// Find a property by name on this definition or any ancestor.
    pub fn find_property(&self, name: &str) -> Option<PropertyPtr> {
        if let Some(property) = self.details.direct_lookup(name) {
            return Some(property);
        }
        let manager = self.definition_manager()?;
        for parent in self.parent_names() {
            if let Some(parent_def) = manager.get_definition(parent) {
                if let Some(property) = parent_def.find_property(name) {
                    return Some(property);
                }
            }
        }
        None
    }

    /// Iterate directly-declared properties.
    pub fn direct_properties(self: &Arc<Self>) -> PropertyIterator {
        PropertyIterator::new(self, IterateStrategy::SelfOnly)
    }

    /// Iterate directly-declared properties, then each ancestor's,
    /// depth-first in declaration order.
    pub fn all_properties(self: &Arc<Self>) -> PropertyIterator {
        PropertyIterator::new(self, IterateStrategy::Parents)
    }

    // === Runtime mutation (generic definitions) ===

    /// Add a property to a generic definition.
    ///
    /// Fires pre-added then post-added notifications through the owning
    /// manager's listeners. Returns false for non-generic definitions and
    /// taken names.
    pub fn add_property(
        &self,
        name: &str,
        declared_type: TypeId,
        metadata: MetaData,
        is_collection: bool,
    ) -> bool {
        let Some(modifier) = self.details.modifier() else {
            return false;
        };
        if self.details.direct_lookup(name).is_some() {
            return false;
        }
        let listeners = self.listeners_snapshot();
        for listener in &listeners {
            listener.pre_property_added(self.name(), name);
        }
        let added = modifier
            .add_property(name, declared_type, metadata, is_collection)
            .is_some();
        if added {
            for listener in &listeners {
                listener.post_property_added(self.name(), name);
            }
        }
        added
    }

    /// Remove a property from a generic definition.
    ///
    /// The pre-removed notification fires strictly before the storage
    /// entry disappears, so listeners can still read the old value.
    pub fn remove_property(&self, name: &str) -> bool {
        let Some(modifier) = self.details.modifier() else {
            return false;
        };
        if self.details.direct_lookup(name).is_none() {
            return false;
        }
        let listeners = self.listeners_snapshot();
        for listener in &listeners {
            listener.pre_property_removed(self.name(), name);
        }
        let removed = modifier.remove_property(name);
        if removed {
            for listener in &listeners {
                listener.post_property_removed(self.name(), name);
            }
        }
        removed
    }

    // === Binding ===

    /// Resolve a property path against an object into an accessor.
    ///
    /// Any unresolvable step - unknown name, non-object intermediate
    /// value, missing collection, deregistered definition - yields an
    /// invalid accessor; there is no error channel.
    pub fn bind_property(self: &Arc<Self>, path: &str, object: &ObjectHandle) -> PropertyAccessor {
        let Some(manager) = self.definition_manager() else {
            return PropertyAccessor::invalid();
        };
        if !self.is_registered() {
            return PropertyAccessor::invalid();
        }
        let Some(segments) = parse_path(path) else {
            return PropertyAccessor::invalid();
        };

        let mut definition = self.clone();
        let mut current = object.clone();
        let mut bound: Option<PropertyPtr> = None;

        for segment in segments {
            match segment {
                PathSegment::Property(name) => {
                    if let Some(parent) = bound.take() {
                        // Descend into the sub-object produced by the
                        // previously-bound property.
                        let value = parent.get(&current);
                        let Some(child) = value.as_object().cloned() else {
                            return PropertyAccessor::invalid();
                        };
                        let Some(child_def) = manager.get_object_definition(&child) else {
                            return PropertyAccessor::invalid();
                        };
                        definition = child_def;
                        current = child;
                    }
                    let Some(property) = definition.find_property(&name) else {
                        return PropertyAccessor::invalid();
                    };
                    bound = Some(property);
                }
                PathSegment::Element(key) => {
                    let Some(parent) = bound.take() else {
                        return PropertyAccessor::invalid();
                    };
                    bound = Some(Arc::new(CollectionElementProperty::new(parent, key)));
                }
            }
        }

        match bound {
            Some(property) => PropertyAccessor::bound(
                manager,
                definition,
                property,
                current,
                path.to_string(),
            ),
            None => PropertyAccessor::invalid(),
        }
    }

    // === Casting ===

    /// Walk the parent chain to decide whether values of this definition
    /// can be treated as `target`.
    ///
    /// Deterministic and terminating: the parent graph is validated
    /// cycle-free at registration.
    pub fn can_be_cast_to(&self, target: &ClassDefinition) -> bool {
        if self.name() == target.name() {
            return true;
        }
        let Some(manager) = self.definition_manager() else {
            return false;
        };
        for parent in self.parent_names() {
            if let Some(parent_def) = manager.get_definition(parent) {
                if parent_def.can_be_cast_to(target) {
                    return true;
                }
            }
        }
        false
    }

    /// Re-tag a handle as `target` when the cast is legal.
    ///
    /// With no physical inheritance offsets this is pure bookkeeping: the
    /// payload is untouched.
    pub fn cast_to(&self, target: &ClassDefinition, handle: &ObjectHandle) -> Option<ObjectHandle> {
        if self.can_be_cast_to(target) {
            Some(handle.clone().with_definition(target.name().to_string()))
        } else {
            None
        }
    }

    pub(crate) fn listeners_snapshot(
        &self,
    ) -> Vec<Arc<dyn crate::listener::PropertyAccessorListener>> {
        match self.manager.read().upgrade() {
            Some(inner) => inner.listeners_snapshot(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for ClassDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDefinition")
            .field("name", &self.name())
            .field("generic", &self.is_generic())
            .field("state", &self.state())
            .finish()
    }
}
