//! Lazy property traversal across inheritance.
//!
//! [`PropertyIterator`] walks a definition's properties in a defined
//! order: directly-declared properties first, then - under
//! [`IterateStrategy::Parents`] - each parent definition's full traversal,
//! depth-first in declaration order. Ancestors reachable through more
//! than one path (diamond graphs) are visited once.
//!
//! This is the traversal behind whole-object serialization, generic UI
//! property listing, and "does any ancestor define this name" queries.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::definition::{ClassDefinition, ClassDefinitionDetails};
use crate::definition_manager::DefinitionManager;
use crate::property::PropertyPtr;
use crate::property_storage::PropertyCursor;

/// Traversal scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterateStrategy {
    /// Directly-declared properties only.
    SelfOnly,
    /// Direct properties, then ancestors depth-first in declaration order.
    Parents,
}

/// Forward-only property sequence over a definition.
///
/// A fresh iterator can always be constructed from the same
/// (definition, strategy) pair; one instance is consumed by iteration.
/// Underlying storage mutation during iteration adjusts positions instead
/// of invalidating them (see `property_storage`).
pub struct PropertyIterator {
    manager: Option<DefinitionManager>,
    current: Option<PropertyCursor>,
    pending: Vec<String>,
    visited: FxHashSet<String>,
}

impl PropertyIterator {
    pub(crate) fn new(definition: &Arc<ClassDefinition>, strategy: IterateStrategy) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(definition.name().to_string());

        let mut pending = Vec::new();
        if strategy == IterateStrategy::Parents {
            for parent in definition.parent_names().iter().rev() {
                pending.push(parent.clone());
            }
        }

        Self {
            manager: definition.definition_manager(),
            current: Some(definition.details().storage().cursor()),
            pending,
            visited,
        }
    }
}

impl Iterator for PropertyIterator {
    type Item = PropertyPtr;

    fn next(&mut self) -> Option<PropertyPtr> {
        loop {
            if let Some(cursor) = &mut self.current {
                if let Some(property) = cursor.next() {
                    return Some(property);
                }
                self.current = None;
            }

            let name = self.pending.pop()?;
            if !self.visited.insert(name.clone()) {
                continue;
            }
            // Unresolvable parents are skipped, not an error.
            let Some(manager) = &self.manager else {
                continue;
            };
            let Some(definition) = manager.get_definition(&name) else {
                continue;
            };
            for parent in definition.parent_names().iter().rev() {
                self.pending.push(parent.clone());
            }
            self.current = Some(definition.details().storage().cursor());
        }
    }
}
