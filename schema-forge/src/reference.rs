//! Namespaces, references, recursive nodes and dereferencing.
//!
//! A `Ref` names its target by path instead of embedding it. Two path forms
//! exist: a plain identifier (`"User"`) and a definition inside a registered
//! container (`"Shapes#/$defs/Point"`). Targets are checked when the reference
//! is created and again, lazily, when it is followed.

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::builder::TypeBuilder;
use crate::error::{SchemaError, SchemaResult};
use crate::node::{split_ref_path, SchemaKind, SchemaNode, DEFS_SEPARATOR, SELF_KEY};
use crate::options::Annotations;

impl TypeBuilder {
    /// Group related definitions into one node, registered under its own
    /// identifier when set.
    pub fn namespace<I, K>(&mut self, defs: I, options: Annotations) -> SchemaResult<SchemaNode>
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        let defs: IndexMap<String, SchemaNode> =
            defs.into_iter().map(|(key, node)| (key.into(), node)).collect();
        self.store(SchemaNode::new(SchemaKind::Namespace(defs), options))
    }

    /// Reference the definition `key` of a registered namespace.
    ///
    /// The key itself is not checked; a missing definition surfaces when the
    /// reference is dereferenced.
    pub fn ref_namespace(&self, namespace: &SchemaNode, key: &str) -> SchemaResult<SchemaNode> {
        let id = namespace.id().ok_or(SchemaError::MissingNamespaceId)?;
        if !self.registry.contains(id) {
            return Err(SchemaError::UnknownNamespace { id: id.to_string() });
        }
        let path = format!("{id}{DEFS_SEPARATOR}{key}");
        trace!(path = %path, "Constructed reference");
        Ok(SchemaNode::reference(path))
    }

    /// Reference a registered schema by its identifier.
    pub fn ref_schema(&self, schema: &SchemaNode) -> SchemaResult<SchemaNode> {
        let id = schema.id().ok_or(SchemaError::MissingSchemaId)?;
        if !self.registry.contains(id) {
            return Err(SchemaError::UnknownSchema { id: id.to_string() });
        }
        trace!(path = %id, "Constructed reference");
        Ok(SchemaNode::reference(id))
    }

    /// Build a recursive node.
    ///
    /// `body` receives a placeholder `Ref` to `"<id>#/$defs/self"` standing in
    /// for the node being defined, and returns the body. The result stores that
    /// body under `$defs/self` and points its own `$ref` at it.
    ///
    /// ```rust
    /// use schema_forge::{Annotations, ArrayOptions, ObjectOptions, StringOptions, TypeBuilder};
    ///
    /// # fn main() -> schema_forge::SchemaResult<()> {
    /// let mut t = TypeBuilder::new();
    /// let node = t.rec(
    ///     |t, this| {
    ///         let name = t.string(StringOptions::new())?;
    ///         let children = t.array(this, ArrayOptions::new())?;
    ///         t.object([("name", name), ("children", children)], ObjectOptions::new())
    ///     },
    ///     Annotations::new().with_id("Tree"),
    /// )?;
    ///
    /// assert_eq!(node.ref_path(), Some("Tree#/$defs/self"));
    /// assert_eq!(t.dereference(&node)?.kind.name(), "Object");
    /// # Ok(())
    /// # }
    /// ```
    pub fn rec<F>(&mut self, body: F, options: Annotations) -> SchemaResult<SchemaNode>
    where
        F: FnOnce(&mut TypeBuilder, SchemaNode) -> SchemaResult<SchemaNode>,
    {
        let reference = format!(
            "{}{DEFS_SEPARATOR}{SELF_KEY}",
            options.identifier().unwrap_or_default()
        );
        let body = body(self, SchemaNode::reference(reference.clone()))?;
        self.store(SchemaNode::new(
            SchemaKind::Rec {
                reference,
                body: Box::new(body),
            },
            options,
        ))
    }

    /// Look up a reference path in the registry.
    ///
    /// A path is first tried as a plain identifier, then as
    /// `"<id>#/$defs/<key>"` against the `$defs` of the node registered as
    /// `<id>`.
    pub fn resolve_path(&self, path: &str) -> SchemaResult<&SchemaNode> {
        if let Some(node) = self.registry.get(path) {
            return Ok(node);
        }
        split_ref_path(path)
            .and_then(|(id, key)| self.registry.get(id)?.def(key))
            .ok_or_else(|| SchemaError::unresolved(path))
    }

    /// Follow `node` to a concrete node.
    ///
    /// Non-reference nodes are returned unchanged. A `Ref` is replaced by its
    /// registry target and a `Rec` by its body, repeatedly. Revisiting a path
    /// fails with `CyclicReference`.
    pub fn dereference<'a>(&'a self, node: &'a SchemaNode) -> SchemaResult<&'a SchemaNode> {
        let mut visited: IndexSet<&'a str> = IndexSet::new();
        let mut current = node;
        loop {
            let (path, next) = match &current.kind {
                SchemaKind::Ref(path) => (path.as_str(), None),
                SchemaKind::Rec { reference, body } => (reference.as_str(), Some(body.as_ref())),
                _ => return Ok(current),
            };
            if !visited.insert(path) {
                return Err(SchemaError::CyclicReference {
                    path: path.to_string(),
                });
            }
            if self.config.trace_dereference {
                trace!(path = %path, kind = current.kind.name(), hop = visited.len(), "Following reference");
            }
            current = match next {
                Some(body) => body,
                None => self.resolve_path(path)?,
            };
        }
    }
}
