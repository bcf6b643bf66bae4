//! Definitions for statically-known native types.
//!
//! Built once through [`NativeDefinitionBuilder`], immutable afterwards.
//! Properties are closure-backed accessors over the concrete `T`; the
//! optional factory lets the object manager allocate instances.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use reflectkit_core::{MetaData, TypeId};

use super::ClassDefinitionDetails;
use crate::property::{AccessorProperty, MethodProperty};
use crate::property_storage::PropertyStorage;

type Factory = Box<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Immutable details for a native type.
pub struct NativeDefinition {
    name: String,
    parents: Vec<String>,
    metadata: MetaData,
    is_abstract: bool,
    storage: PropertyStorage,
    instance_type: TypeId,
    factory: Option<Factory>,
}

impl NativeDefinition {
    /// Start building a definition reflecting the native type `T`.
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> NativeDefinitionBuilder<T> {
        NativeDefinitionBuilder {
            name: name.into(),
            parents: Vec::new(),
            metadata: MetaData::new(),
            is_abstract: false,
            storage: PropertyStorage::new(),
            factory: None,
            _marker: PhantomData,
        }
    }
}

impl ClassDefinitionDetails for NativeDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent_names(&self) -> &[String] {
        &self.parents
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn storage(&self) -> &PropertyStorage {
        &self.storage
    }

    fn instance_type_id(&self) -> TypeId {
        self.instance_type.clone()
    }

    fn create_instance(&self) -> Option<Box<dyn Any + Send + Sync>> {
        if self.is_abstract {
            return None;
        }
        self.factory.as_ref().map(|factory| factory())
    }
}

/// Builder for [`NativeDefinition`].
pub struct NativeDefinitionBuilder<T> {
    name: String,
    parents: Vec<String>,
    metadata: MetaData,
    is_abstract: bool,
    storage: PropertyStorage,
    factory: Option<Factory>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> NativeDefinitionBuilder<T> {
    /// Append a parent definition name.
    pub fn with_parent(mut self, name: impl Into<String>) -> Self {
        self.parents.push(name.into());
        self
    }

    /// Attach definition-level metadata.
    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the definition abstract: no instances can be created.
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declare a value property.
    pub fn with_property(self, property: AccessorProperty<T>) -> Self {
        self.storage.add_property(Arc::new(property));
        self
    }

    /// Declare a method.
    pub fn with_method(self, method: MethodProperty<T>) -> Self {
        self.storage.add_property(Arc::new(method));
        self
    }

    /// Supply the instance factory used by the object manager.
    pub fn with_factory(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.factory = Some(Box::new(move || Box::new(factory())));
        self
    }

    /// Finish the immutable definition details.
    pub fn build(self) -> NativeDefinition {
        NativeDefinition {
            name: self.name,
            parents: self.parents,
            metadata: self.metadata,
            is_abstract: self.is_abstract,
            storage: self.storage,
            instance_type: TypeId::of::<T>(),
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{MethodParameters, Property};
    use reflectkit_core::Variant;

    #[derive(Default)]
    struct Sprite {
        x: f64,
        visible: bool,
    }

    fn sprite_definition() -> NativeDefinition {
        NativeDefinition::builder::<Sprite>("Sprite")
            .with_parent("Node")
            .with_metadata(MetaData::new().with_display_name("Sprite"))
            .with_property(
                AccessorProperty::getter("x", TypeId::float64(), |s: &Sprite| s.x)
                    .with_setter(|s: &mut Sprite, v: f64| s.x = v),
            )
            .with_property(
                AccessorProperty::getter("visible", TypeId::boolean(), |s: &Sprite| s.visible)
                    .with_setter(|s: &mut Sprite, v: bool| s.visible = v),
            )
            .with_method(MethodProperty::new(
                "hide",
                TypeId::void(),
                0,
                |s: &mut Sprite, _: &MethodParameters| {
                    s.visible = false;
                    Variant::Void
                },
            ))
            .with_factory(Sprite::default)
            .build()
    }

    #[test]
    fn details_report_structure() {
        let details = sprite_definition();
        assert_eq!(details.name(), "Sprite");
        assert_eq!(details.parent_names(), ["Node".to_string()]);
        assert!(!details.is_abstract());
        assert!(!details.is_generic());
        assert_eq!(details.storage().len(), 3);
        assert!(details.direct_lookup("x").is_some());
        assert!(details.direct_lookup("hide").unwrap().is_method());
        assert!(details.direct_lookup("missing").is_none());
    }

    #[test]
    fn factory_creates_instances() {
        let details = sprite_definition();
        assert!(details.create_instance().is_some());
    }

    #[test]
    fn abstract_definitions_refuse_instances() {
        let details = NativeDefinition::builder::<Sprite>("AbstractSprite")
            .as_abstract()
            .with_factory(Sprite::default)
            .build();
        assert!(details.is_abstract());
        assert!(details.create_instance().is_none());
    }

    #[test]
    fn no_factory_means_no_instances() {
        let details = NativeDefinition::builder::<Sprite>("Sprite").build();
        assert!(details.create_instance().is_none());
    }
}
