//! Opaque object references with explicit ownership.
//!
//! [`ObjectHandle`] is a copyable reference to an object of unknown
//! concrete type. Ownership is explicit per storage mode:
//!
//! - **Managed**: the handle is one of possibly many shared owners of an
//!   [`ObjectStorage`]; the value lives until the last owner drops.
//! - **Unmanaged**: the handle is a back-reference only - a slot index and
//!   generation stamp into an [`UnmanagedPool`]. The owner that exposed the
//!   object must deregister it before freeing, which bumps the slot
//!   generation so every outstanding handle goes detectably stale instead
//!   of dangling.
//!
//! A handle with no payload is invalid; a valid handle's [`TypeId`] always
//! matches the concrete type actually stored.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::ref_object_id::RefObjectId;
use crate::type_id::TypeId;

// ============================================================================
// Storage
// ============================================================================

/// Shared storage for one reflected object.
///
/// Holds the boxed value behind a lock; typed access goes through
/// [`ObjectStorage::with_ref`] / [`ObjectStorage::with_mut`], which fail
/// softly on a type mismatch.
pub struct ObjectStorage {
    type_id: TypeId,
    value: RwLock<Box<dyn Any + Send + Sync>>,
}

impl ObjectStorage {
    /// Store a value, deriving its type id from the Rust type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Arc<Self> {
        Arc::new(Self {
            type_id: TypeId::of::<T>(),
            value: RwLock::new(Box::new(value)),
        })
    }

    /// Store an already-boxed value under an explicit type id.
    ///
    /// Used for runtime-defined types whose identity is a definition name
    /// rather than a Rust type name.
    pub fn from_boxed(type_id: TypeId, value: Box<dyn Any + Send + Sync>) -> Arc<Self> {
        Arc::new(Self {
            type_id,
            value: RwLock::new(value),
        })
    }

    /// The stored value's type id.
    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    /// Run `f` against the stored value. `None` if `T` is not the stored type.
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.value.read();
        guard.downcast_ref::<T>().map(f)
    }

    /// Run `f` against the stored value mutably. `None` on type mismatch.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.value.write();
        guard.downcast_mut::<T>().map(f)
    }
}

impl fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Unmanaged pool
// ============================================================================

struct PoolSlot {
    generation: u32,
    value: Option<Weak<ObjectStorage>>,
    context: u64,
}

/// Generational slot registry for unmanaged objects.
///
/// The pool never owns a referent: slots hold weak back-references, and
/// deregistration bumps the slot generation so stale handles fail a cheap
/// comparison even if the slot is later reused.
#[derive(Default)]
pub struct UnmanagedPool {
    slots: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    slots: Vec<PoolSlot>,
    free: Vec<u32>,
}

impl UnmanagedPool {
    /// Create an empty pool.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a caller-owned storage, tagged with an owning context.
    ///
    /// Returns the (slot, generation) pair the handle carries.
    pub fn register(&self, storage: &Arc<ObjectStorage>, context: u64) -> (u32, u32) {
        let mut state = self.slots.lock();
        if let Some(index) = state.free.pop() {
            let slot = &mut state.slots[index as usize];
            slot.value = Some(Arc::downgrade(storage));
            slot.context = context;
            (index, slot.generation)
        } else {
            let index = state.slots.len() as u32;
            state.slots.push(PoolSlot {
                generation: 0,
                value: Some(Arc::downgrade(storage)),
                context,
            });
            (index, 0)
        }
    }

    /// Invalidate one slot. Every handle stamped with the old generation
    /// resolves to `None` from now on. Returns false if already stale.
    pub fn deregister(&self, slot: u32, generation: u32) -> bool {
        let mut state = self.slots.lock();
        match state.slots.get_mut(slot as usize) {
            Some(entry) if entry.generation == generation && entry.value.is_some() => {
                entry.value = None;
                entry.generation = entry.generation.wrapping_add(1);
                state.free.push(slot);
                true
            }
            _ => false,
        }
    }

    /// Invalidate every slot registered under `context`.
    pub fn deregister_context(&self, context: u64) {
        let mut state = self.slots.lock();
        let mut freed = Vec::new();
        for (index, entry) in state.slots.iter_mut().enumerate() {
            if entry.context == context && entry.value.is_some() {
                entry.value = None;
                entry.generation = entry.generation.wrapping_add(1);
                freed.push(index as u32);
            }
        }
        state.free.extend(freed);
    }

    /// Resolve a slot to its storage; `None` when stale or gone.
    pub fn resolve(&self, slot: u32, generation: u32) -> Option<Arc<ObjectStorage>> {
        let state = self.slots.lock();
        let entry = state.slots.get(slot as usize)?;
        if entry.generation != generation {
            return None;
        }
        entry.value.as_ref()?.upgrade()
    }
}

// ============================================================================
// Handle
// ============================================================================

#[derive(Clone)]
enum HandleStorage {
    Null,
    Managed(Arc<ObjectStorage>),
    Unmanaged {
        pool: Weak<UnmanagedPool>,
        slot: u32,
        generation: u32,
    },
}

/// A copyable, opaque reference to a reflected object.
#[derive(Clone)]
pub struct ObjectHandle {
    storage: HandleStorage,
    type_id: TypeId,
    definition_name: Option<Arc<str>>,
    id: RefObjectId,
}

impl ObjectHandle {
    /// An invalid handle with no payload.
    pub fn null() -> Self {
        Self {
            storage: HandleStorage::Null,
            type_id: TypeId::void(),
            definition_name: None,
            id: RefObjectId::zero(),
        }
    }

    /// Managed handle over a fresh value.
    pub fn managed<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_storage(ObjectStorage::new(value))
    }

    /// Managed handle sharing ownership of existing storage.
    pub fn from_storage(storage: Arc<ObjectStorage>) -> Self {
        let type_id = ObjectStorage::type_id(&storage).clone();
        Self {
            storage: HandleStorage::Managed(storage),
            type_id,
            definition_name: None,
            id: RefObjectId::zero(),
        }
    }

    /// Unmanaged handle referencing a pool slot.
    pub fn unmanaged(pool: &Arc<UnmanagedPool>, slot: u32, generation: u32, type_id: TypeId) -> Self {
        Self {
            storage: HandleStorage::Unmanaged {
                pool: Arc::downgrade(pool),
                slot,
                generation,
            },
            type_id,
            definition_name: None,
            id: RefObjectId::zero(),
        }
    }

    /// Tag the handle with the definition it was created from.
    pub fn with_definition(mut self, name: impl Into<Arc<str>>) -> Self {
        self.definition_name = Some(name.into());
        self
    }

    /// Tag the handle with a stable identity.
    pub fn with_id(mut self, id: RefObjectId) -> Self {
        self.id = id;
        self
    }

    /// The referent's type id.
    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    /// The definition this handle was created from, if any.
    pub fn definition_name(&self) -> Option<&str> {
        self.definition_name.as_deref()
    }

    /// The stable identity, [`RefObjectId::zero`] when untracked.
    pub fn id(&self) -> RefObjectId {
        self.id
    }

    /// The (slot, generation) pair of an unmanaged handle.
    pub fn unmanaged_slot(&self) -> Option<(u32, u32)> {
        match &self.storage {
            HandleStorage::Unmanaged {
                slot, generation, ..
            } => Some((*slot, *generation)),
            _ => None,
        }
    }

    /// Resolve the backing storage; `None` when null or stale.
    pub fn storage(&self) -> Option<Arc<ObjectStorage>> {
        match &self.storage {
            HandleStorage::Null => None,
            HandleStorage::Managed(storage) => Some(storage.clone()),
            HandleStorage::Unmanaged {
                pool,
                slot,
                generation,
            } => pool.upgrade()?.resolve(*slot, *generation),
        }
    }

    /// Check whether the handle currently refers to a live object.
    ///
    /// Unmanaged handles whose owner tore down resolve false here, never
    /// a dangling access.
    pub fn is_valid(&self) -> bool {
        self.storage().is_some()
    }

    /// Run `f` against the referent. `None` when invalid or `T` mismatches.
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.storage()?.with_ref(f)
    }

    /// Run `f` against the referent mutably. `None` when invalid or `T`
    /// mismatches.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.storage()?.with_mut(f)
    }

    /// Snapshot the referent by clone. `None` when invalid or `T` mismatches.
    pub fn get_copy<T: Any + Clone>(&self) -> Option<T> {
        self.with_ref(|value: &T| value.clone())
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        match (&self.storage, &other.storage) {
            (HandleStorage::Null, HandleStorage::Null) => true,
            (HandleStorage::Managed(a), HandleStorage::Managed(b)) => Arc::ptr_eq(a, b),
            (
                HandleStorage::Unmanaged {
                    pool: pa,
                    slot: sa,
                    generation: ga,
                },
                HandleStorage::Unmanaged {
                    pool: pb,
                    slot: sb,
                    generation: gb,
                },
            ) => sa == sb && ga == gb && Weak::ptr_eq(pa, pb),
            _ => false,
        }
    }
}

impl Eq for ObjectHandle {}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &self.storage {
            HandleStorage::Null => "null",
            HandleStorage::Managed(_) => "managed",
            HandleStorage::Unmanaged { .. } => "unmanaged",
        };
        f.debug_struct("ObjectHandle")
            .field("mode", &mode)
            .field("type_id", &self.type_id)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        value: i64,
    }

    #[test]
    fn null_handle_is_invalid() {
        let handle = ObjectHandle::null();
        assert!(!handle.is_valid());
        assert!(handle.with_ref(|_: &Probe| ()).is_none());
    }

    #[test]
    fn managed_handle_round_trip() {
        let handle = ObjectHandle::managed(Probe { value: 7 });
        assert!(handle.is_valid());
        assert_eq!(handle.with_ref(|p: &Probe| p.value), Some(7));
        handle.with_mut(|p: &mut Probe| p.value = 9);
        assert_eq!(handle.get_copy::<Probe>(), Some(Probe { value: 9 }));
    }

    #[test]
    fn managed_copies_share_storage() {
        let a = ObjectHandle::managed(Probe { value: 1 });
        let b = a.clone();
        assert_eq!(a, b);
        b.with_mut(|p: &mut Probe| p.value = 2);
        assert_eq!(a.with_ref(|p: &Probe| p.value), Some(2));
    }

    #[test]
    fn distinct_storages_compare_unequal() {
        let a = ObjectHandle::managed(Probe { value: 1 });
        let b = ObjectHandle::managed(Probe { value: 1 });
        assert_ne!(a, b);
    }

    #[test]
    fn type_mismatch_fails_softly() {
        let handle = ObjectHandle::managed(Probe { value: 1 });
        assert!(handle.with_ref(|_: &String| ()).is_none());
    }

    #[test]
    fn unmanaged_handle_goes_stale_on_deregister() {
        let pool = UnmanagedPool::new();
        let storage = ObjectStorage::new(Probe { value: 42 });
        let (slot, generation) = pool.register(&storage, 1);
        let handle =
            ObjectHandle::unmanaged(&pool, slot, generation, storage.type_id().clone());

        assert!(handle.is_valid());
        assert_eq!(handle.with_ref(|p: &Probe| p.value), Some(42));

        assert!(pool.deregister(slot, generation));
        assert!(!handle.is_valid());
        // Second deregistration reports failure, not a crash.
        assert!(!pool.deregister(slot, generation));
        // The owner still holds the value untouched.
        assert_eq!(storage.with_ref(|p: &Probe| p.value), Some(42));
    }

    #[test]
    fn slot_reuse_does_not_resurrect_stale_handles() {
        let pool = UnmanagedPool::new();
        let first = ObjectStorage::new(Probe { value: 1 });
        let (slot, generation) = pool.register(&first, 1);
        let stale =
            ObjectHandle::unmanaged(&pool, slot, generation, first.type_id().clone());
        pool.deregister(slot, generation);

        let second = ObjectStorage::new(Probe { value: 2 });
        let (slot2, gen2) = pool.register(&second, 1);
        assert_eq!(slot, slot2);
        assert_ne!(generation, gen2);
        assert!(!stale.is_valid());
    }

    #[test]
    fn context_teardown_invalidates_only_that_context() {
        let pool = UnmanagedPool::new();
        let a = ObjectStorage::new(Probe { value: 1 });
        let b = ObjectStorage::new(Probe { value: 2 });
        let (sa, ga) = pool.register(&a, 1);
        let (sb, gb) = pool.register(&b, 2);
        let ha = ObjectHandle::unmanaged(&pool, sa, ga, a.type_id().clone());
        let hb = ObjectHandle::unmanaged(&pool, sb, gb, b.type_id().clone());

        pool.deregister_context(1);
        assert!(!ha.is_valid());
        assert!(hb.is_valid());
    }

    #[test]
    fn owner_drop_is_detectable_without_deregistration() {
        let pool = UnmanagedPool::new();
        let storage = ObjectStorage::new(Probe { value: 1 });
        let (slot, generation) = pool.register(&storage, 1);
        let handle =
            ObjectHandle::unmanaged(&pool, slot, generation, storage.type_id().clone());
        drop(storage);
        assert!(!handle.is_valid());
    }
}
