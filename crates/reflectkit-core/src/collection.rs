//! Collection values for collection-typed properties.
//!
//! A [`Collection`] is either an ordered list or an ordered map of
//! [`Variant`]s. Collection-valued properties hand these out by value;
//! mutations are written back through the owning property. Keys are
//! integers (list indices, map keys) or strings (map keys only).

use std::collections::BTreeMap;
use std::fmt;

use crate::variant::Variant;

/// A key addressing one element of a [`Collection`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKey {
    /// Positional or integer key.
    Index(i64),
    /// String key (maps only).
    Key(String),
}

impl CollectionKey {
    /// Parse a key from its path-segment form.
    ///
    /// Integers parse as [`CollectionKey::Index`]; quoted or bare text
    /// parses as [`CollectionKey::Key`]. Empty input is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        if let Ok(index) = text.parse::<i64>() {
            return Some(CollectionKey::Index(index));
        }
        let unquoted = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        if unquoted.is_empty() {
            return None;
        }
        Some(CollectionKey::Key(unquoted.to_string()))
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKey::Index(i) => write!(f, "{i}"),
            CollectionKey::Key(k) => write!(f, "\"{k}\""),
        }
    }
}

impl From<i64> for CollectionKey {
    fn from(index: i64) -> Self {
        CollectionKey::Index(index)
    }
}

impl From<usize> for CollectionKey {
    fn from(index: usize) -> Self {
        CollectionKey::Index(index as i64)
    }
}

impl From<&str> for CollectionKey {
    fn from(key: &str) -> Self {
        CollectionKey::Key(key.to_string())
    }
}

impl From<String> for CollectionKey {
    fn from(key: String) -> Self {
        CollectionKey::Key(key)
    }
}

/// An ordered list or map of reflected values.
#[derive(Clone, Debug, PartialEq)]
pub enum Collection {
    /// Positionally indexed sequence.
    List(Vec<Variant>),
    /// Key-ordered mapping.
    Map(BTreeMap<CollectionKey, Variant>),
}

impl Default for Collection {
    fn default() -> Self {
        Collection::List(Vec::new())
    }
}

impl Collection {
    /// Create an empty list collection.
    pub fn list() -> Self {
        Collection::List(Vec::new())
    }

    /// Create an empty map collection.
    pub fn map() -> Self {
        Collection::Map(BTreeMap::new())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Collection::List(items) => items.len(),
            Collection::Map(entries) => entries.len(),
        }
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is a list collection.
    pub fn is_list(&self) -> bool {
        matches!(self, Collection::List(_))
    }

    /// Check if this is a map collection.
    pub fn is_map(&self) -> bool {
        matches!(self, Collection::Map(_))
    }

    /// Get as a list.
    pub fn as_list(&self) -> Option<&Vec<Variant>> {
        match self {
            Collection::List(items) => Some(items),
            Collection::Map(_) => None,
        }
    }

    /// Get as a map.
    pub fn as_map(&self) -> Option<&BTreeMap<CollectionKey, Variant>> {
        match self {
            Collection::Map(entries) => Some(entries),
            Collection::List(_) => None,
        }
    }

    /// Look up an element; `None` on missing key or kind mismatch.
    pub fn get(&self, key: &CollectionKey) -> Option<&Variant> {
        match (self, key) {
            (Collection::List(items), CollectionKey::Index(index)) => {
                usize::try_from(*index).ok().and_then(|i| items.get(i))
            }
            (Collection::Map(entries), key) => entries.get(key),
            (Collection::List(_), CollectionKey::Key(_)) => None,
        }
    }

    /// Insert an element.
    ///
    /// Lists accept indices `0..=len` (insertion shifts later elements);
    /// maps accept any key (overwriting an existing entry). Returns false
    /// when the key cannot address this collection kind.
    pub fn insert(&mut self, key: CollectionKey, value: Variant) -> bool {
        match (self, key) {
            (Collection::List(items), CollectionKey::Index(index)) => {
                match usize::try_from(index) {
                    Ok(i) if i <= items.len() => {
                        items.insert(i, value);
                        true
                    }
                    _ => false,
                }
            }
            (Collection::Map(entries), key) => {
                entries.insert(key, value);
                true
            }
            (Collection::List(_), CollectionKey::Key(_)) => false,
        }
    }

    /// Overwrite the element at an existing key. Returns false on miss.
    pub fn replace(&mut self, key: &CollectionKey, value: Variant) -> bool {
        match (self, key) {
            (Collection::List(items), CollectionKey::Index(index)) => {
                match usize::try_from(*index).ok().and_then(|i| items.get_mut(i)) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
            (Collection::Map(entries), key) => match entries.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            (Collection::List(_), CollectionKey::Key(_)) => false,
        }
    }

    /// Remove the element at a key. Returns false on miss.
    pub fn erase(&mut self, key: &CollectionKey) -> bool {
        match (self, key) {
            (Collection::List(items), CollectionKey::Index(index)) => {
                match usize::try_from(*index) {
                    Ok(i) if i < items.len() => {
                        items.remove(i);
                        true
                    }
                    _ => false,
                }
            }
            (Collection::Map(entries), key) => entries.remove(key).is_some(),
            (Collection::List(_), CollectionKey::Key(_)) => false,
        }
    }

    /// Append to a list collection. Returns false for maps.
    pub fn push(&mut self, value: Variant) -> bool {
        match self {
            Collection::List(items) => {
                items.push(value);
                true
            }
            Collection::Map(_) => false,
        }
    }

    /// Iterate elements in order as (key, value) pairs.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (CollectionKey, &Variant)> + '_> {
        match self {
            Collection::List(items) => Box::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (CollectionKey::from(i), v)),
            ),
            Collection::Map(entries) => {
                Box::new(entries.iter().map(|(k, v)| (k.clone(), v)))
            }
        }
    }
}

impl From<Vec<Variant>> for Collection {
    fn from(items: Vec<Variant>) -> Self {
        Collection::List(items)
    }
}

impl From<BTreeMap<CollectionKey, Variant>> for Collection {
    fn from(entries: BTreeMap<CollectionKey, Variant>) -> Self {
        Collection::Map(entries)
    }
}
