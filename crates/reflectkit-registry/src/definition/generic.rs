//! Runtime-defined types.
//!
//! A [`GenericDefinition`] is a mutable details object: properties can be
//! added and removed after registration. Each add stamps the synthesized
//! property with a fresh epoch, which is what keeps a re-added name from
//! aliasing values written through its removed predecessor.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reflectkit_core::{MetaData, TypeId};

use super::{ClassDefinitionDetails, DefinitionModifier};
use crate::generic_object::GenericObject;
use crate::property::{GenericProperty, PropertyPtr};
use crate::property_storage::PropertyStorage;

/// Mutable details for a runtime-defined type.
pub struct GenericDefinition {
    name: String,
    parents: Vec<String>,
    metadata: MetaData,
    storage: PropertyStorage,
    epoch: AtomicU64,
}

impl GenericDefinition {
    /// A fresh generic definition with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            metadata: MetaData::new(),
            storage: PropertyStorage::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Append a parent definition name. Only meaningful before
    /// registration.
    pub fn with_parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    /// Attach definition-level metadata.
    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }
}

impl ClassDefinitionDetails for GenericDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent_names(&self) -> &[String] {
        &self.parents
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn is_generic(&self) -> bool {
        true
    }

    fn storage(&self) -> &PropertyStorage {
        &self.storage
    }

    fn instance_type_id(&self) -> TypeId {
        TypeId::from_name(&self.name)
    }

    fn create_instance(&self) -> Option<Box<dyn Any + Send + Sync>> {
        Some(Box::new(GenericObject::new(self.name.clone())))
    }

    fn modifier(&self) -> Option<&dyn DefinitionModifier> {
        Some(self)
    }
}

impl DefinitionModifier for GenericDefinition {
    fn add_property(
        &self,
        name: &str,
        declared_type: TypeId,
        metadata: MetaData,
        is_collection: bool,
    ) -> Option<PropertyPtr> {
        if self.storage.find_property(name).is_some() {
            return None;
        }
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;
        let property: PropertyPtr = Arc::new(GenericProperty::new(
            name,
            declared_type,
            metadata,
            is_collection,
            epoch,
        ));
        self.storage.add_property(property.clone());
        Some(property)
    }

    fn remove_property(&self, name: &str) -> bool {
        self.storage.remove_property(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_find() {
        let details = GenericDefinition::new("Widget");
        assert!(
            details
                .add_property("count", TypeId::int64(), MetaData::new(), false)
                .is_some()
        );
        assert!(details.direct_lookup("count").is_some());
        assert!(details.is_generic());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let details = GenericDefinition::new("Widget");
        details.add_property("count", TypeId::int64(), MetaData::new(), false);
        assert!(
            details
                .add_property("count", TypeId::int64(), MetaData::new(), false)
                .is_none()
        );
    }

    #[test]
    fn remove_then_find_fails() {
        let details = GenericDefinition::new("Widget");
        details.add_property("count", TypeId::int64(), MetaData::new(), false);
        assert!(details.remove_property("count"));
        assert!(details.direct_lookup("count").is_none());
        assert!(!details.remove_property("count"));
    }

    #[test]
    fn readd_is_a_distinct_property() {
        let details = GenericDefinition::new("Widget");
        let first = details
            .add_property("count", TypeId::int64(), MetaData::new(), false)
            .unwrap();
        details.remove_property("count");
        let second = details
            .add_property("count", TypeId::int64(), MetaData::new(), false)
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        let current = details.direct_lookup("count").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[test]
    fn instances_are_generic_objects() {
        let details = GenericDefinition::new("Widget");
        let instance = details.create_instance().unwrap();
        assert!(instance.downcast_ref::<GenericObject>().is_some());
    }
}
