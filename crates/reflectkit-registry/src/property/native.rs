//! Properties over statically-known native types.
//!
//! [`AccessorProperty`] wraps closure getter/setter pairs over a concrete
//! `T`; [`MethodProperty`] wraps an invokable body. Both reconcile the
//! object at access time by downcasting the handle's storage - a handle of
//! the wrong concrete type fails softly.

use std::any::Any;

use reflectkit_core::{
    FromVariant, IntoVariant, MetaData, NameHash, ObjectHandle, TypeId, Variant,
};

use super::{MethodParameters, Property, PropertyTraits};

type Getter<T> = Box<dyn Fn(&T) -> Variant + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Variant) -> bool + Send + Sync>;
type MethodBody<T> = Box<dyn Fn(&mut T, &MethodParameters) -> Variant + Send + Sync>;

/// A value property backed by native accessor closures.
pub struct AccessorProperty<T> {
    name: String,
    name_hash: NameHash,
    declared_type: TypeId,
    metadata: MetaData,
    traits: PropertyTraits,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T: Any + Send + Sync> AccessorProperty<T> {
    /// A read-only property from a typed getter.
    ///
    /// `declared_type` is what `set` converts incoming values to; it
    /// should match the setter's value type.
    pub fn getter<V: IntoVariant>(
        name: impl Into<String>,
        declared_type: TypeId,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let name_hash = NameHash::of_property(&name);
        Self {
            name,
            name_hash,
            declared_type,
            metadata: MetaData::new(),
            traits: PropertyTraits::VALUE | PropertyTraits::READ_ONLY,
            getter: Box::new(move |object| get(object).into_variant()),
            setter: None,
        }
    }

    /// Add a typed setter, making the property writable.
    ///
    /// The incoming variant is converted through [`FromVariant`]; values
    /// that do not convert leave the object unchanged.
    pub fn with_setter<V: FromVariant>(
        mut self,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        self.traits -= PropertyTraits::READ_ONLY;
        self.setter = Some(Box::new(move |object, value| {
            match V::from_variant(&value) {
                Some(typed) => {
                    set(object, typed);
                    true
                }
                None => false,
            }
        }));
        self
    }

    /// Replace the declared type.
    pub fn with_declared_type(mut self, declared_type: TypeId) -> Self {
        self.declared_type = declared_type;
        self
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }

    /// Flag the value as a collection.
    pub fn as_collection(mut self) -> Self {
        self.traits |= PropertyTraits::COLLECTION;
        self
    }
}

impl<T: Any + Send + Sync> Property for AccessorProperty<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    fn declared_type(&self) -> &TypeId {
        &self.declared_type
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn traits(&self) -> PropertyTraits {
        self.traits
    }

    fn get(&self, object: &ObjectHandle) -> Variant {
        object
            .with_ref(|value: &T| (self.getter)(value))
            .unwrap_or(Variant::Void)
    }

    fn set(&self, object: &ObjectHandle, value: Variant) -> bool {
        if self.read_only() {
            return false;
        }
        let Some(setter) = &self.setter else {
            return false;
        };
        object
            .with_mut(|target: &mut T| setter(target, value))
            .unwrap_or(false)
    }
}

/// An invokable method property over a native type.
pub struct MethodProperty<T> {
    name: String,
    name_hash: NameHash,
    return_type: TypeId,
    metadata: MetaData,
    parameter_count: usize,
    body: MethodBody<T>,
}

impl<T: Any + Send + Sync> MethodProperty<T> {
    /// A method from its body closure.
    ///
    /// `parameter_count` is enforced at invocation: mismatched packs fail
    /// without calling the body.
    pub fn new(
        name: impl Into<String>,
        return_type: TypeId,
        parameter_count: usize,
        body: impl Fn(&mut T, &MethodParameters) -> Variant + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let name_hash = NameHash::of_property(&name);
        Self {
            name,
            name_hash,
            return_type,
            metadata: MetaData::new(),
            parameter_count,
            body: Box::new(body),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = metadata;
        self
    }
}

impl<T: Any + Send + Sync> Property for MethodProperty<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    fn declared_type(&self) -> &TypeId {
        &self.return_type
    }

    fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    fn traits(&self) -> PropertyTraits {
        PropertyTraits::METHOD
    }

    fn get(&self, _object: &ObjectHandle) -> Variant {
        Variant::Void
    }

    fn set(&self, _object: &ObjectHandle, _value: Variant) -> bool {
        false
    }

    fn invoke(&self, object: &ObjectHandle, parameters: &MethodParameters) -> Variant {
        if parameters.len() != self.parameter_count {
            log::warn!(
                "method '{}' invoked with {} parameters, expected {}",
                self.name,
                parameters.len(),
                self.parameter_count
            );
            return Variant::Void;
        }
        object
            .with_mut(|target: &mut T| (self.body)(target, parameters))
            .unwrap_or(Variant::Void)
    }

    fn parameter_count(&self) -> usize {
        self.parameter_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player {
        health: i64,
        name: String,
    }

    fn health_property() -> AccessorProperty<Player> {
        AccessorProperty::getter("health", TypeId::int64(), |p: &Player| p.health)
            .with_setter(|p: &mut Player, v: i64| p.health = v)
    }

    #[test]
    fn get_set_round_trip() {
        let object = ObjectHandle::managed(Player {
            health: 10,
            name: "p1".to_string(),
        });
        let prop = health_property();

        assert_eq!(prop.get(&object), Variant::Int(10));
        assert!(prop.set(&object, Variant::Int(25)));
        assert_eq!(prop.get(&object), Variant::Int(25));
    }

    #[test]
    fn read_only_rejects_set() {
        let object = ObjectHandle::managed(Player {
            health: 10,
            name: "p1".to_string(),
        });
        let prop =
            AccessorProperty::getter("name", TypeId::string(), |p: &Player| p.name.clone());

        assert!(prop.read_only());
        assert!(!prop.set(&object, Variant::from("other")));
        assert_eq!(prop.get(&object), Variant::from("p1"));
    }

    #[test]
    fn type_mismatch_rejects_set() {
        let object = ObjectHandle::managed(Player {
            health: 10,
            name: "p1".to_string(),
        });
        let prop = health_property();

        assert!(!prop.set(&object, Variant::from("not a number")));
        assert_eq!(prop.get(&object), Variant::Int(10));
    }

    #[test]
    fn wrong_object_type_fails_softly() {
        let object = ObjectHandle::managed(42i64);
        let prop = health_property();

        assert_eq!(prop.get(&object), Variant::Void);
        assert!(!prop.set(&object, Variant::Int(1)));
    }

    #[test]
    fn method_invocation() {
        let object = ObjectHandle::managed(Player {
            health: 10,
            name: "p1".to_string(),
        });
        let heal = MethodProperty::new(
            "heal",
            TypeId::int64(),
            1,
            |p: &mut Player, params: &MethodParameters| {
                let amount = params.get(0).and_then(|v| v.try_cast::<i64>()).unwrap_or(0);
                p.health += amount;
                Variant::Int(p.health)
            },
        );

        assert!(heal.is_method());
        assert!(!heal.is_value());
        let result = heal.invoke(&object, &MethodParameters::new().with(5i64));
        assert_eq!(result, Variant::Int(15));
    }

    #[test]
    fn method_parameter_mismatch_returns_void() {
        let object = ObjectHandle::managed(Player {
            health: 10,
            name: "p1".to_string(),
        });
        let heal = MethodProperty::new("heal", TypeId::int64(), 1, |p: &mut Player, _| {
            Variant::Int(p.health)
        });

        assert_eq!(heal.invoke(&object, &MethodParameters::new()), Variant::Void);
        assert_eq!(object.with_ref(|p: &Player| p.health), Some(10));
    }
}
