//! Session registry mapping identifiers to schema nodes.
//!
//! The registry only grows: entries are inserted (or replaced, depending on the
//! session's [`IdentifierPolicy`](crate::IdentifierPolicy)) and never removed.
//! It is owned by one [`TypeBuilder`](crate::TypeBuilder), so independent
//! builders have independent schema universes.

use indexmap::IndexMap;

use crate::node::SchemaNode;

/// Identifier → node mapping, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: IndexMap<String, SchemaNode>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `id`, returning the entry it replaced.
    pub fn insert(&mut self, id: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.schemas.insert(id.into(), node)
    }

    /// Get a node by identifier.
    pub fn get(&self, id: &str) -> Option<&SchemaNode> {
        self.schemas.get(id)
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// Registered identifiers, in first-insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Iterate over `(identifier, node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Get the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
