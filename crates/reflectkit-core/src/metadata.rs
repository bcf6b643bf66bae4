//! Opaque metadata annotations for definitions and properties.
//!
//! [`MetaData`] is an ordered set of (kind → value) annotations - display
//! names, grouping, visibility hints and the like. The reflection core
//! stores and returns these values; it never interprets them. Consumers
//! (property grids, serializers) look annotations up by [`MetaKind`].

use std::fmt;

use crate::name_hash::NameHash;
use crate::variant::{IntoVariant, Variant};

/// Identifier for one kind of metadata annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetaKind(NameHash);

impl MetaKind {
    /// A metadata kind from its identifier name.
    pub fn named(name: &str) -> Self {
        MetaKind(NameHash::of_ident(name))
    }

    /// Human-facing name shown instead of the property name.
    pub fn display_name() -> Self {
        Self::named("DisplayName")
    }

    /// Longer description / tooltip text.
    pub fn description() -> Self {
        Self::named("Description")
    }

    /// Grouping header the property is listed under.
    pub fn group() -> Self {
        Self::named("Group")
    }

    /// Hidden-from-UI hint.
    pub fn hidden() -> Self {
        Self::named("Hidden")
    }

    /// Read-only-in-UI hint.
    pub fn read_only() -> Self {
        Self::named("ReadOnly")
    }

    /// Lower bound for numeric editors.
    pub fn minimum() -> Self {
        Self::named("Minimum")
    }

    /// Upper bound for numeric editors.
    pub fn maximum() -> Self {
        Self::named("Maximum")
    }
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaKind({})", self.0)
    }
}

/// Annotation set attached to a definition or property.
///
/// Lookup is first-match over insertion order; duplicate kinds are allowed
/// and later entries are shadowed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaData {
    entries: Vec<(MetaKind, Variant)>,
}

impl MetaData {
    /// Empty annotation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check for emptiness.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the first annotation of a kind.
    pub fn get(&self, kind: MetaKind) -> Option<&Variant> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v)
    }

    /// Check whether an annotation of a kind is present.
    pub fn contains(&self, kind: MetaKind) -> bool {
        self.get(kind).is_some()
    }

    /// Iterate annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MetaKind, &Variant)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    // === Builder Methods ===

    /// Append an annotation of any kind.
    pub fn with(mut self, kind: MetaKind, value: impl IntoVariant) -> Self {
        self.entries.push((kind, value.into_variant()));
        self
    }

    /// Append a display name.
    pub fn with_display_name(self, name: &str) -> Self {
        self.with(MetaKind::display_name(), name)
    }

    /// Append a description.
    pub fn with_description(self, text: &str) -> Self {
        self.with(MetaKind::description(), text)
    }

    /// Append a group.
    pub fn with_group(self, group: &str) -> Self {
        self.with(MetaKind::group(), group)
    }

    /// Mark hidden.
    pub fn with_hidden(self) -> Self {
        self.with(MetaKind::hidden(), true)
    }

    /// Mark read-only in UI.
    pub fn with_read_only(self) -> Self {
        self.with(MetaKind::read_only(), true)
    }

    /// Append a numeric lower bound.
    pub fn with_minimum(self, value: f64) -> Self {
        self.with(MetaKind::minimum(), value)
    }

    /// Append a numeric upper bound.
    pub fn with_maximum(self, value: f64) -> Self {
        self.with(MetaKind::maximum(), value)
    }
}
