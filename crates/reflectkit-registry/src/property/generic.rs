//! Properties synthesized for runtime-defined types.
//!
//! A [`GenericProperty`] is a slot into a [`GenericObject`] value bag.
//! It carries the epoch its definition assigned at add time; the epoch is
//! what separates it from an earlier, since-removed property of the same
//! name (see `generic_object`).

use reflectkit_core::{MetaData, NameHash, ObjectHandle, TypeId, Variant};

use super::{Property, PropertyTraits};
use crate::generic_object::GenericObject;

/// A dynamically-added property on a generic definition.
pub struct GenericProperty {
    name: String,
    name_hash: NameHash,
    declared_type: TypeId,
    metadata: MetaData,
    traits: PropertyTraits,
    epoch: u64,
}

impl GenericProperty {
    /// Synthesize a property slot.
    ///
    /// Called by the generic definition when a property is added; `epoch`
    /// is the definition's add counter at that moment.
    pub fn new(
        name: impl Into<String>,
        declared_type: TypeId,
        metadata: MetaData,
        is_collection: bool,
        epoch: u64,
    ) -> Self {
        let name = name.into();
        let name_hash = NameHash::of_property(&name);
        let mut traits = PropertyTraits::VALUE;
        if is_collection {
            traits |= PropertyTraits::COLLECTION;
        }
        Self {
            name,
            name_hash,
            declared_type,
            metadata,
            traits,
            epoch,
        }
    }

    /// The definition add-counter value this property was created at.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Property for GenericProperty {
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
            .with_ref(|bag: &GenericObject| bag.value(self.name_hash, self.epoch))
            .flatten()
            .unwrap_or(Variant::Void)
    }

    fn set(&self, object: &ObjectHandle, value: Variant) -> bool {
        let Some(converted) = value.convert_to(&self.declared_type) else {
            return false;
        };
        object
            .with_mut(|bag: &mut GenericObject| {
                bag.set_value(self.name_hash, self.epoch, converted);
            })
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> ObjectHandle {
        ObjectHandle::managed(GenericObject::new("Widget")).with_definition("Widget")
    }

    #[test]
    fn unset_slot_reads_void() {
        let object = widget();
        let prop = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 1);
        assert_eq!(prop.get(&object), Variant::Void);
    }

    #[test]
    fn set_then_get() {
        let object = widget();
        let prop = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 1);
        assert!(prop.set(&object, Variant::Int(5)));
        assert_eq!(prop.get(&object), Variant::Int(5));
    }

    #[test]
    fn declared_type_is_enforced() {
        let object = widget();
        let prop = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 1);
        assert!(!prop.set(&object, Variant::from("five")));
        assert_eq!(prop.get(&object), Variant::Void);
    }

    #[test]
    fn distinct_epochs_do_not_alias() {
        let object = widget();
        let old = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 1);
        let new = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 2);

        assert!(old.set(&object, Variant::Int(5)));
        // The re-added namesake starts absent; the stale one stops seeing
        // the slot once the new property writes it.
        assert_eq!(new.get(&object), Variant::Void);
        assert!(new.set(&object, Variant::Int(9)));
        assert_eq!(old.get(&object), Variant::Void);
        assert_eq!(new.get(&object), Variant::Int(9));
    }

    #[test]
    fn non_generic_object_fails_softly() {
        let object = ObjectHandle::managed(3i64);
        let prop = GenericProperty::new("count", TypeId::int64(), MetaData::new(), false, 1);
        assert_eq!(prop.get(&object), Variant::Void);
        assert!(!prop.set(&object, Variant::Int(5)));
    }
}
