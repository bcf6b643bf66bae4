//! The per-context definition registry.
//!
//! A [`DefinitionManager`] owns the name → definition map for one context
//! (typically one plugin), mediates generic-definition creation, and holds
//! the listener list every accessor notifies through. Registration
//! validates name uniqueness and rejects parent graphs that would close a
//! cycle; deregistration is terminal for the definition instance, and the
//! same name may later be reused by a distinct one.
//!
//! Lifecycle is explicit: construct over an [`ObjectManager`] (which
//! assigns the context), operate, then [`DefinitionManager::teardown`] -
//! deregistering every definition and invalidating the context's objects.
//! Multiple managers coexist over one object manager and tear down
//! independently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use reflectkit_core::{
    Collection, MetaData, ObjectHandle, RefObjectId, RegistrationError, SerializeError,
    Serializer, TypeId, Variant,
};

use crate::definition::{
    ClassDefinition, ClassDefinitionDetails, DefinitionModifier, GenericDefinition,
};
use crate::generic_object::GenericObject;
use crate::listener::PropertyAccessorListener;
use crate::object_manager::ObjectManager;

#[derive(Default)]
struct DefinitionTable {
    by_name: FxHashMap<String, Arc<ClassDefinition>>,
    /// Registration order, for deterministic scans.
    order: Vec<String>,
}

#[derive(Default)]
struct ParentGraph {
    graph: DiGraph<String, ()>,
    nodes: FxHashMap<String, NodeIndex>,
}

impl ParentGraph {
    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.nodes.get(name) {
            return node;
        }
        let node = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), node);
        node
    }
}

pub(crate) struct ManagerInner {
    definitions: RwLock<DefinitionTable>,
    graph: Mutex<ParentGraph>,
    listeners: RwLock<Vec<Arc<dyn PropertyAccessorListener>>>,
    object_manager: ObjectManager,
    context: u64,
    torn_down: AtomicBool,
}

impl ManagerInner {
    pub(crate) fn listeners_snapshot(&self) -> Vec<Arc<dyn PropertyAccessorListener>> {
        self.listeners.read().clone()
    }

    fn deregister_all(&self) {
        let mut table = self.definitions.write();
        for definition in table.by_name.values() {
            definition.mark_deregistered();
        }
        table.by_name.clear();
        table.order.clear();
        self.graph.lock().graph.clear_edges();
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        if !self.torn_down.load(Ordering::Acquire) {
            self.deregister_all();
            self.object_manager.deregister_context(self.context);
        }
    }
}

/// The registry mapping type names to definitions for one context.
#[derive(Clone)]
pub struct DefinitionManager {
    inner: Arc<ManagerInner>,
}

impl DefinitionManager {
    /// Create a manager registered as a context of `object_manager`.
    pub fn new(object_manager: ObjectManager) -> Self {
        let context = object_manager.register_context();
        Self {
            inner: Arc::new(ManagerInner {
                definitions: RwLock::new(DefinitionTable::default()),
                graph: Mutex::new(ParentGraph::default()),
                listeners: RwLock::new(Vec::new()),
                object_manager,
                context,
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ManagerInner>) -> Self {
        Self { inner }
    }

    /// The object manager this context allocates through.
    pub fn object_manager(&self) -> &ObjectManager {
        &self.inner.object_manager
    }

    /// Deregister every definition and invalidate this context's objects.
    ///
    /// The manager remains constructed but empty; outstanding definition
    /// and object references report themselves invalid.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.deregister_all();
        self.inner
            .object_manager
            .deregister_context(self.inner.context);
    }

    // === Lookup ===

    /// Exact-name lookup. `None` on miss.
    pub fn get_definition(&self, name: &str) -> Option<Arc<ClassDefinition>> {
        self.inner.definitions.read().by_name.get(name).cloned()
    }

    /// Fuzzy lookup: exact match first, then the first registered name
    /// containing `fragment` as a component.
    pub fn find_definition(&self, fragment: &str) -> Option<Arc<ClassDefinition>> {
        if let Some(definition) = self.get_definition(fragment) {
            return Some(definition);
        }
        let table = self.inner.definitions.read();
        table
            .order
            .iter()
            .find(|name| name.contains(fragment))
            .and_then(|name| table.by_name.get(name).cloned())
    }

    /// Resolve the actual definition for a handle.
    ///
    /// Prefers the definition the handle was created from; generic
    /// instances resolve through their own value bag (two instances of a
    /// shared base name can carry distinct shapes); native handles fall
    /// back to their concrete type name.
    pub fn get_object_definition(&self, handle: &ObjectHandle) -> Option<Arc<ClassDefinition>> {
        if let Some(name) = handle.definition_name() {
            if let Some(definition) = self.get_definition(name) {
                return Some(definition);
            }
        }
        if let Some(name) =
            handle.with_ref(|bag: &GenericObject| bag.definition_name().to_string())
        {
            return self.get_definition(&name);
        }
        self.get_definition(handle.type_id().name())
    }

    /// All non-abstract definitions deriving from `base`, transitively,
    /// including `base` itself when concrete.
    pub fn definitions_of_type(&self, base: &str) -> Vec<Arc<ClassDefinition>> {
        let table = self.inner.definitions.read();
        let Some(base_def) = table.by_name.get(base) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        if !base_def.is_abstract() {
            result.push(base_def.clone());
        }

        let mut matched = vec![base.to_string()];
        let mut cursor = 0;
        while cursor < matched.len() {
            let current = matched[cursor].clone();
            cursor += 1;
            for name in &table.order {
                let definition = &table.by_name[name];
                if definition.parent_names().iter().any(|p| *p == current)
                    && !matched.contains(name)
                {
                    matched.push(name.clone());
                    result.push(definition.clone());
                }
            }
        }
        result
    }

    // === Registration ===

    /// Register a definition, taking ownership of its details.
    ///
    /// Fails on duplicate names and on parent declarations that would
    /// close a cycle; both indicate a programmer error and additionally
    /// assert in debug builds (duplicates) or roll the registration back
    /// (cycles).
    pub fn register_definition(
        &self,
        details: Box<dyn ClassDefinitionDetails>,
    ) -> Result<Arc<ClassDefinition>, RegistrationError> {
        let name = details.name().to_string();
        if name.is_empty() {
            debug_assert!(false, "definition registered with an empty name");
            return Err(RegistrationError::InvalidName(name));
        }
        let parents = details.parent_names().to_vec();

        let mut table = self.inner.definitions.write();
        if table.by_name.contains_key(&name) {
            debug_assert!(false, "duplicate definition registered: {name}");
            return Err(RegistrationError::DuplicateDefinition(name));
        }

        {
            let mut graph = self.inner.graph.lock();
            let node = graph.ensure_node(&name);
            let mut added = Vec::new();
            for parent in &parents {
                let parent_node = graph.ensure_node(parent);
                added.push(graph.graph.add_edge(node, parent_node, ()));
                if is_cyclic_directed(&graph.graph) {
                    for edge in added.into_iter().rev() {
                        graph.graph.remove_edge(edge);
                    }
                    return Err(RegistrationError::CyclicParents {
                        name,
                        parent: parent.clone(),
                    });
                }
            }
        }

        let definition = Arc::new(ClassDefinition::new(details));
        definition.attach(Arc::downgrade(&self.inner));
        table.by_name.insert(name.clone(), definition.clone());
        table.order.push(name);
        Ok(definition)
    }

    /// Convenience over [`DefinitionManager::register_definition`] for a
    /// concrete details value.
    pub fn register(
        &self,
        details: impl ClassDefinitionDetails + 'static,
    ) -> Result<Arc<ClassDefinition>, RegistrationError> {
        self.register_definition(Box::new(details))
    }

    /// Remove one definition. Idempotent: only the first call for a given
    /// instance has effect, later calls report false.
    pub fn deregister_definition(&self, definition: &Arc<ClassDefinition>) -> bool {
        let mut table = self.inner.definitions.write();
        match table.by_name.get(definition.name()) {
            Some(existing) if Arc::ptr_eq(existing, definition) => {
                table.by_name.remove(definition.name());
                table.order.retain(|name| name != definition.name());
                definition.mark_deregistered();

                let mut graph = self.inner.graph.lock();
                if let Some(&node) = graph.nodes.get(definition.name()) {
                    let edges: Vec<_> = graph
                        .graph
                        .edges(node)
                        .map(|edge| petgraph::visit::EdgeRef::id(&edge))
                        .collect();
                    for edge in edges {
                        graph.graph.remove_edge(edge);
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Remove every definition.
    pub fn deregister_definitions(&self) {
        self.inner.deregister_all();
    }

    // === Generic definitions and objects ===

    /// A fresh generic definition, with a generated unique name when none
    /// is supplied.
    pub fn create_generic_definition(&self, name: Option<&str>) -> GenericDefinition {
        match name {
            Some(name) => GenericDefinition::new(name),
            None => GenericDefinition::new(RefObjectId::generate().to_string()),
        }
    }

    /// Allocate an instance of a registered definition in this context.
    pub fn create_object(&self, definition: &Arc<ClassDefinition>) -> Option<ObjectHandle> {
        self.inner
            .object_manager
            .create_object_storage(definition, self.inner.context)
    }

    // === Listeners ===

    /// Subscribe to every successful mutation and invocation under this
    /// manager.
    pub fn register_property_accessor_listener(
        &self,
        listener: Arc<dyn PropertyAccessorListener>,
    ) {
        self.inner.listeners.write().push(listener);
    }

    /// Remove a previously-registered listener.
    pub fn deregister_property_accessor_listener(
        &self,
        listener: &Arc<dyn PropertyAccessorListener>,
    ) {
        self.inner
            .listeners
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, listener));
    }

    pub(crate) fn listeners_snapshot(&self) -> Vec<Arc<dyn PropertyAccessorListener>> {
        self.inner.listeners_snapshot()
    }

    // === Serialization ===

    /// Write every generic definition through `serializer`.
    ///
    /// Native definitions are process-constructed and skipped; they are
    /// expected to be registered before the matching deserialize runs.
    pub fn serialize_definitions(
        &self,
        serializer: &mut dyn Serializer,
    ) -> Result<(), SerializeError> {
        let records = {
            let table = self.inner.definitions.read();
            let mut records = Collection::list();
            for name in &table.order {
                let definition = &table.by_name[name];
                if !definition.is_generic() {
                    continue;
                }

                let mut parents = Collection::list();
                for parent in definition.parent_names() {
                    parents.push(Variant::from(parent.as_str()));
                }

                let mut properties = Collection::list();
                for property in definition.details().storage().cursor() {
                    let mut record = Collection::map();
                    record.insert("name".into(), Variant::from(property.name()));
                    record.insert(
                        "type".into(),
                        Variant::from(property.declared_type().name()),
                    );
                    record.insert("collection".into(), Variant::from(property.is_collection()));
                    properties.push(Variant::Collection(record));
                }

                let mut record = Collection::map();
                record.insert("name".into(), Variant::from(definition.name()));
                record.insert("parents".into(), Variant::Collection(parents));
                record.insert("properties".into(), Variant::Collection(properties));
                records.push(Variant::Collection(record));
            }
            records
        };
        serializer.serialize(&Variant::Collection(records))
    }

    /// Read definitions written by
    /// [`DefinitionManager::serialize_definitions`] and register them.
    ///
    /// Returns the number of definitions registered.
    pub fn deserialize_definitions(
        &self,
        serializer: &mut dyn Serializer,
    ) -> Result<usize, SerializeError> {
        let value = serializer.deserialize()?;
        let Variant::Collection(Collection::List(records)) = value else {
            return Err(SerializeError::Malformed(
                "expected a list of definition records".to_string(),
            ));
        };

        let mut registered = 0;
        for record in records {
            let Some(record) = record.as_collection() else {
                return Err(SerializeError::Malformed(
                    "definition record is not a collection".to_string(),
                ));
            };
            let Some(name) = record.get(&"name".into()).and_then(|v| v.try_cast::<String>())
            else {
                return Err(SerializeError::Malformed(
                    "definition record has no name".to_string(),
                ));
            };

            let mut details = GenericDefinition::new(&name);
            if let Some(parents) = record.get(&"parents".into()).and_then(|v| v.as_collection())
            {
                for (_, parent) in parents.iter() {
                    if let Some(parent) = parent.try_cast::<String>() {
                        details = details.with_parent(parent);
                    }
                }
            }

            if let Some(properties) = record
                .get(&"properties".into())
                .and_then(|v| v.as_collection())
            {
                for (_, property) in properties.iter() {
                    let Some(property) = property.as_collection() else {
                        continue;
                    };
                    let Some(prop_name) = property
                        .get(&"name".into())
                        .and_then(|v| v.try_cast::<String>())
                    else {
                        continue;
                    };
                    let type_name = property
                        .get(&"type".into())
                        .and_then(|v| v.try_cast::<String>())
                        .unwrap_or_else(|| "variant".to_string());
                    let is_collection = property
                        .get(&"collection".into())
                        .and_then(|v| v.try_cast::<bool>())
                        .unwrap_or(false);
                    details.add_property(
                        &prop_name,
                        TypeId::from_name(&type_name),
                        MetaData::new(),
                        is_collection,
                    );
                }
            }

            self.register_definition(Box::new(details))
                .map_err(|error| SerializeError::Malformed(error.to_string()))?;
            registered += 1;
        }
        Ok(registered)
    }
}
