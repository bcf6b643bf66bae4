//! Object identity and storage allocation.
//!
//! The [`ObjectManager`] is the identity registry: it maps
//! [`RefObjectId`]s to live objects, allocates storage for definitions,
//! owns the unmanaged-handle pool, partitions everything by context (one
//! context per definition manager, so a plugin's objects tear down
//! together), and keeps parent/child identity links for nested object
//! graphs.
//!
//! The registry never extends object lifetime: entries hold weak
//! references, and managed objects die when their last owning handle
//! drops.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use reflectkit_core::{ObjectHandle, ObjectStorage, RefObjectId, UnmanagedPool};

use crate::definition::ClassDefinition;

/// A parent/child identity link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLink {
    /// Identity of the parent object.
    pub parent: RefObjectId,
    /// Property path from the parent to the child.
    pub path: String,
}

struct ObjectEntry {
    storage: std::sync::Weak<ObjectStorage>,
    definition_name: Option<Arc<str>>,
    context: u64,
}

#[derive(Default)]
struct ObjectManagerInner {
    objects: RwLock<FxHashMap<RefObjectId, ObjectEntry>>,
    links: RwLock<FxHashMap<RefObjectId, Vec<ObjectLink>>>,
    next_context: AtomicU64,
}

/// Identity registry and storage allocator.
#[derive(Clone)]
pub struct ObjectManager {
    inner: Arc<ObjectManagerInner>,
    pool: Arc<UnmanagedPool>,
}

impl ObjectManager {
    /// A fresh, empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ObjectManagerInner::default()),
            pool: UnmanagedPool::new(),
        }
    }

    // === Contexts ===

    /// Allocate a context id. One per definition manager.
    pub fn register_context(&self) -> u64 {
        self.inner.next_context.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Tear down a context: drop its identity entries and invalidate its
    /// unmanaged handles.
    pub fn deregister_context(&self, context: u64) {
        self.inner
            .objects
            .write()
            .retain(|_, entry| entry.context != context);
        self.pool.deregister_context(context);
    }

    // === Managed objects ===

    /// Allocate storage for a fresh instance of `definition`.
    ///
    /// The returned handle is the first owner; the registry tracks the
    /// object weakly under a generated identity. `None` when the
    /// definition is abstract or has no factory.
    pub fn create_object_storage(
        &self,
        definition: &Arc<ClassDefinition>,
        context: u64,
    ) -> Option<ObjectHandle> {
        let instance = definition.create_instance()?;
        let storage = ObjectStorage::from_boxed(definition.instance_type_id(), instance);
        let id = RefObjectId::generate();
        let definition_name: Arc<str> = Arc::from(definition.name());

        self.inner.objects.write().insert(
            id,
            ObjectEntry {
                storage: Arc::downgrade(&storage),
                definition_name: Some(definition_name.clone()),
                context,
            },
        );

        Some(
            ObjectHandle::from_storage(storage)
                .with_definition(definition_name)
                .with_id(id),
        )
    }

    /// Track an externally-created managed object under its identity.
    ///
    /// False when the handle has no identity or no live storage.
    pub fn register_object(&self, handle: &ObjectHandle, context: u64) -> bool {
        if handle.id().is_zero() {
            return false;
        }
        let Some(storage) = handle.storage() else {
            return false;
        };
        self.inner.objects.write().insert(
            handle.id(),
            ObjectEntry {
                storage: Arc::downgrade(&storage),
                definition_name: handle.definition_name().map(Arc::from),
                context,
            },
        );
        true
    }

    /// Resolve an identity to a live object handle.
    ///
    /// `None` when the id was never registered or the object has since
    /// died.
    pub fn get_object(&self, id: RefObjectId) -> Option<ObjectHandle> {
        let objects = self.inner.objects.read();
        let entry = objects.get(&id)?;
        let storage = entry.storage.upgrade()?;
        let mut handle = ObjectHandle::from_storage(storage).with_id(id);
        if let Some(name) = &entry.definition_name {
            handle = handle.with_definition(name.clone());
        }
        Some(handle)
    }

    /// Forget an identity. The object itself is untouched.
    pub fn deregister_object(&self, id: RefObjectId) -> bool {
        self.inner.objects.write().remove(&id).is_some()
    }

    // === Unmanaged objects ===

    /// Register a caller-owned object and hand out an unmanaged handle.
    ///
    /// The caller keeps sole ownership of `storage` and must call
    /// [`ObjectManager::deregister_unmanaged`] (or tear down the context)
    /// before freeing it; outstanding handles then report invalid.
    pub fn register_unmanaged(&self, storage: &Arc<ObjectStorage>, context: u64) -> ObjectHandle {
        let (slot, generation) = self.pool.register(storage, context);
        ObjectHandle::unmanaged(&self.pool, slot, generation, storage.type_id().clone())
    }

    /// Invalidate all handles to one unmanaged object.
    pub fn deregister_unmanaged(&self, handle: &ObjectHandle) -> bool {
        match handle.unmanaged_slot() {
            Some((slot, generation)) => self.pool.deregister(slot, generation),
            None => false,
        }
    }

    // === Object links ===

    /// Record that `child` lives at `path` under `parent`.
    pub fn add_object_links(&self, child: RefObjectId, parent: RefObjectId, path: &str) {
        let link = ObjectLink {
            parent,
            path: path.to_string(),
        };
        let mut links = self.inner.links.write();
        let entries = links.entry(child).or_default();
        if !entries.contains(&link) {
            entries.push(link);
        }
    }

    /// Links recorded for `child`, in insertion order.
    pub fn object_links(&self, child: RefObjectId) -> Vec<ObjectLink> {
        self.inner
            .links
            .read()
            .get(&child)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflectkit_core::TypeId;

    #[test]
    fn context_ids_are_unique() {
        let manager = ObjectManager::new();
        let a = manager.register_context();
        let b = manager.register_context();
        assert_ne!(a, b);
    }

    #[test]
    fn register_and_resolve_identity() {
        let manager = ObjectManager::new();
        let context = manager.register_context();
        let id = RefObjectId::generate();
        let handle = ObjectHandle::managed(5i64).with_id(id);

        assert!(manager.register_object(&handle, context));
        let resolved = manager.get_object(id).unwrap();
        assert_eq!(resolved, handle);
        assert_eq!(resolved.id(), id);
    }

    #[test]
    fn identity_does_not_extend_lifetime() {
        let manager = ObjectManager::new();
        let context = manager.register_context();
        let id = RefObjectId::generate();
        let handle = ObjectHandle::managed(5i64).with_id(id);
        manager.register_object(&handle, context);

        drop(handle);
        assert!(manager.get_object(id).is_none());
    }

    #[test]
    fn zero_identity_is_rejected() {
        let manager = ObjectManager::new();
        let context = manager.register_context();
        let handle = ObjectHandle::managed(5i64);
        assert!(!manager.register_object(&handle, context));
    }

    #[test]
    fn context_teardown_drops_identities() {
        let manager = ObjectManager::new();
        let context = manager.register_context();
        let other = manager.register_context();

        let id_a = RefObjectId::generate();
        let id_b = RefObjectId::generate();
        let a = ObjectHandle::managed(1i64).with_id(id_a);
        let b = ObjectHandle::managed(2i64).with_id(id_b);
        manager.register_object(&a, context);
        manager.register_object(&b, other);

        manager.deregister_context(context);
        assert!(manager.get_object(id_a).is_none());
        assert!(manager.get_object(id_b).is_some());
    }

    #[test]
    fn unmanaged_round_trip_and_teardown() {
        let manager = ObjectManager::new();
        let context = manager.register_context();
        let storage = ObjectStorage::new(String::from("owned elsewhere"));
        let handle = manager.register_unmanaged(&storage, context);

        assert!(handle.is_valid());
        assert_eq!(handle.type_id(), &TypeId::of::<String>());
        assert!(manager.deregister_unmanaged(&handle));
        assert!(!handle.is_valid());
        assert!(!manager.deregister_unmanaged(&handle));
    }

    #[test]
    fn object_links_accumulate() {
        let manager = ObjectManager::new();
        let parent = RefObjectId::generate();
        let child = RefObjectId::generate();

        manager.add_object_links(child, parent, "materials[0]");
        manager.add_object_links(child, parent, "materials[0]");
        let links = manager.object_links(child);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].parent, parent);
        assert_eq!(links[0].path, "materials[0]");
        assert!(manager.object_links(parent).is_empty());
    }
}
