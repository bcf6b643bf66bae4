//! Ordered property storage with mutation-safe cursors.
//!
//! Each definition owns one [`PropertyStorage`]: the ordered sequence of
//! its directly-declared properties plus a name-hash index for O(1)
//! lookup. Storage can be mutated while cursors are outstanding -
//! removing an element *before* a cursor's position shifts that cursor
//! down instead of invalidating it, so live iteration (UI models,
//! serializers) survives concurrent add/remove.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use reflectkit_core::NameHash;

use crate::property::{Property, PropertyPtr};

/// Ordered, hash-indexed set of one definition's direct properties.
#[derive(Clone, Default)]
pub struct PropertyStorage {
    inner: Arc<Mutex<StorageInner>>,
}

#[derive(Default)]
struct StorageInner {
    properties: Vec<PropertyPtr>,
    by_hash: FxHashMap<NameHash, usize>,
    cursors: Vec<Weak<CursorState>>,
}

struct CursorState {
    position: Mutex<usize>,
}

impl StorageInner {
    fn rebuild_index(&mut self) {
        self.by_hash.clear();
        for (index, property) in self.properties.iter().enumerate() {
            self.by_hash.entry(property.name_hash()).or_insert(index);
        }
    }

    /// Index of the property with this exact name.
    ///
    /// The hash index answers most lookups; a full-name check guards
    /// against 64-bit collisions, falling back to a scan when the hashed
    /// slot names something else.
    fn position_of(&self, name: &str) -> Option<usize> {
        let hash = NameHash::of_property(name);
        if let Some(&index) = self.by_hash.get(&hash) {
            if self.properties[index].name() == name {
                return Some(index);
            }
        }
        self.properties.iter().position(|p| p.name() == name)
    }
}

impl PropertyStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property to the ordered sequence.
    ///
    /// An existing property with the same name is replaced in place,
    /// keeping its position.
    pub fn add_property(&self, property: PropertyPtr) {
        let mut inner = self.inner.lock();
        if let Some(index) = inner.position_of(property.name()) {
            inner.properties[index] = property;
            return;
        }
        let index = inner.properties.len();
        let hash = property.name_hash();
        inner.properties.push(property);
        inner.by_hash.entry(hash).or_insert(index);
    }

    /// Remove a property by name. No-op if absent.
    ///
    /// Outstanding cursors positioned after the removed element shift
    /// down by one; a cursor positioned *at* it will yield the next
    /// element.
    pub fn remove_property(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let Some(index) = inner.position_of(name) else {
            return false;
        };
        inner.properties.remove(index);
        inner.rebuild_index();

        inner.cursors.retain(|weak| weak.upgrade().is_some());
        for cursor in &inner.cursors {
            if let Some(state) = cursor.upgrade() {
                let mut position = state.position.lock();
                if *position > index {
                    *position -= 1;
                }
            }
        }
        true
    }

    /// Look up a property by name. `None` on miss, never an error.
    pub fn find_property(&self, name: &str) -> Option<PropertyPtr> {
        let inner = self.inner.lock();
        inner
            .position_of(name)
            .map(|index| inner.properties[index].clone())
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.inner.lock().properties.len()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A restartable cursor over the ordered sequence.
    ///
    /// The cursor tracks a logical index and is adjusted - not
    /// invalidated - by concurrent mutation.
    pub fn cursor(&self) -> PropertyCursor {
        let state = Arc::new(CursorState {
            position: Mutex::new(0),
        });
        self.inner.lock().cursors.push(Arc::downgrade(&state));
        PropertyCursor {
            storage: self.inner.clone(),
            state,
        }
    }
}

/// Forward-only cursor over a [`PropertyStorage`].
pub struct PropertyCursor {
    storage: Arc<Mutex<StorageInner>>,
    state: Arc<CursorState>,
}

impl Iterator for PropertyCursor {
    type Item = PropertyPtr;

    fn next(&mut self) -> Option<PropertyPtr> {
        let inner = self.storage.lock();
        let mut position = self.state.position.lock();
        let property = inner.properties.get(*position)?.clone();
        *position += 1;
        Some(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::AccessorProperty;
    use reflectkit_core::TypeId;

    fn prop(name: &str) -> PropertyPtr {
        Arc::new(AccessorProperty::getter(name, TypeId::int64(), |_: &()| 0i64))
    }

    fn names(storage: &PropertyStorage) -> Vec<String> {
        storage.cursor().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn ordered_add_and_lookup() {
        let storage = PropertyStorage::new();
        storage.add_property(prop("a"));
        storage.add_property(prop("b"));
        storage.add_property(prop("c"));

        assert_eq!(storage.len(), 3);
        assert_eq!(names(&storage), vec!["a", "b", "c"]);
        assert!(storage.find_property("b").is_some());
        assert!(storage.find_property("missing").is_none());
    }

    #[test]
    fn same_name_replaces_in_place() {
        let storage = PropertyStorage::new();
        storage.add_property(prop("a"));
        storage.add_property(prop("b"));
        storage.add_property(prop("a"));

        assert_eq!(storage.len(), 2);
        assert_eq!(names(&storage), vec!["a", "b"]);
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let storage = PropertyStorage::new();
        storage.add_property(prop("a"));
        assert!(!storage.remove_property("b"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn removal_before_cursor_shifts_it() {
        let storage = PropertyStorage::new();
        for name in ["a", "b", "c", "d"] {
            storage.add_property(prop(name));
        }

        let mut cursor = storage.cursor();
        assert_eq!(cursor.next().unwrap().name(), "a");
        assert_eq!(cursor.next().unwrap().name(), "b");

        // Removing an already-visited element must not skip "c".
        assert!(storage.remove_property("a"));
        assert_eq!(cursor.next().unwrap().name(), "c");
        assert_eq!(cursor.next().unwrap().name(), "d");
        assert!(cursor.next().is_none());
    }

    #[test]
    fn removal_at_cursor_yields_next_element() {
        let storage = PropertyStorage::new();
        for name in ["a", "b", "c"] {
            storage.add_property(prop(name));
        }

        let mut cursor = storage.cursor();
        assert_eq!(cursor.next().unwrap().name(), "a");
        assert!(storage.remove_property("b"));
        assert_eq!(cursor.next().unwrap().name(), "c");
        assert!(cursor.next().is_none());
    }

    #[test]
    fn insert_during_iteration_is_visible() {
        let storage = PropertyStorage::new();
        storage.add_property(prop("a"));

        let mut cursor = storage.cursor();
        assert_eq!(cursor.next().unwrap().name(), "a");
        storage.add_property(prop("b"));
        assert_eq!(cursor.next().unwrap().name(), "b");
    }

    #[test]
    fn fresh_cursor_restarts() {
        let storage = PropertyStorage::new();
        storage.add_property(prop("a"));

        let mut first = storage.cursor();
        assert!(first.next().is_some());
        assert!(first.next().is_none());

        let mut second = storage.cursor();
        assert_eq!(second.next().unwrap().name(), "a");
    }
}
