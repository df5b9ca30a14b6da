//! Structural transforms over object schemas.
//!
//! `pick`, `omit`, `partial` and `required` accept an Object node or a
//! reference that dereferences to one. Each builds a new Object from the
//! source, never touching the registered original, then merges the caller's
//! options on top and registers the result if it carries an identifier.
//!
//! The derived node keeps the source's annotation bag, identifier included.
//! Under the default policy a derivation of a registered object therefore
//! replaces that registry entry unless the caller supplies a new `$id`.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::builder::TypeBuilder;
use crate::error::{SchemaError, SchemaResult};
use crate::node::{SchemaKind, SchemaNode};
use crate::options::{Annotations, ObjectConstraints, ObjectOptions};

type Properties = IndexMap<String, SchemaNode>;

impl TypeBuilder {
    /// A `KeyOf` node listing the object's property names in declaration order.
    pub fn key_of(&mut self, object: &SchemaNode, options: Annotations) -> SchemaResult<SchemaNode> {
        let keys: Vec<String> = self.object_properties(object)?.keys().cloned().collect();
        self.store(SchemaNode::new(SchemaKind::KeyOf(keys), options))
    }

    /// Keep only the properties named in `keys`.
    pub fn pick<K: AsRef<str>>(
        &mut self,
        object: &SchemaNode,
        keys: &[K],
        options: ObjectOptions,
    ) -> SchemaResult<SchemaNode> {
        let keys = key_set(keys);
        self.derive_object("pick", object, options, |properties, required| {
            let properties = properties
                .iter()
                .filter(|(name, _)| keys.contains(name.as_str()))
                .map(|(name, node)| (name.clone(), node.clone()))
                .collect();
            let required = required
                .iter()
                .filter(|name| keys.contains(name.as_str()))
                .cloned()
                .collect();
            (properties, required)
        })
    }

    /// Drop the properties named in `keys`.
    pub fn omit<K: AsRef<str>>(
        &mut self,
        object: &SchemaNode,
        keys: &[K],
        options: ObjectOptions,
    ) -> SchemaResult<SchemaNode> {
        let keys = key_set(keys);
        self.derive_object("omit", object, options, |properties, required| {
            let properties = properties
                .iter()
                .filter(|(name, _)| !keys.contains(name.as_str()))
                .map(|(name, node)| (name.clone(), node.clone()))
                .collect();
            let required = required
                .iter()
                .filter(|name| !keys.contains(name.as_str()))
                .cloned()
                .collect();
            (properties, required)
        })
    }

    /// Make every property optional, keeping readonly-ness.
    pub fn partial(&mut self, object: &SchemaNode, options: ObjectOptions) -> SchemaResult<SchemaNode> {
        self.derive_object("partial", object, options, |properties, _| {
            let properties = properties
                .iter()
                .map(|(name, node)| (name.clone(), node.with_modifier(node.modifier.to_optional())))
                .collect();
            (properties, IndexSet::new())
        })
    }

    /// Make every property required, keeping readonly-ness.
    pub fn required(&mut self, object: &SchemaNode, options: ObjectOptions) -> SchemaResult<SchemaNode> {
        self.derive_object("required", object, options, |properties, _| {
            let properties: Properties = properties
                .iter()
                .map(|(name, node)| (name.clone(), node.with_modifier(node.modifier.to_required())))
                .collect();
            let required = properties.keys().cloned().collect();
            (properties, required)
        })
    }

    /// Properties of the Object that `object` dereferences to.
    fn object_properties<'a>(&'a self, object: &'a SchemaNode) -> SchemaResult<&'a Properties> {
        let source = self.dereference(object)?;
        source.properties().ok_or_else(|| SchemaError::ExpectedObject {
            kind: source.kind.name().to_string(),
        })
    }

    fn derive_object<F>(
        &mut self,
        operation: &'static str,
        object: &SchemaNode,
        options: ObjectOptions,
        edit: F,
    ) -> SchemaResult<SchemaNode>
    where
        F: FnOnce(&Properties, &IndexSet<String>) -> (Properties, IndexSet<String>),
    {
        let source = self.dereference(object)?;
        let SchemaKind::Object {
            properties,
            required,
            constraints,
        } = &source.kind
        else {
            return Err(SchemaError::ExpectedObject {
                kind: source.kind.name().to_string(),
            });
        };

        let (properties, required) = edit(properties, required);
        let constraints = ObjectConstraints {
            additional_properties: options
                .constraints
                .additional_properties
                .or(constraints.additional_properties),
        };
        let mut annotations = source.annotations.clone();
        annotations.merge(&options.annotations);

        debug!(
            operation,
            properties = properties.len(),
            required = required.len(),
            "Derived object schema"
        );

        let node = SchemaNode {
            kind: SchemaKind::Object {
                properties,
                required,
                constraints,
            },
            annotations,
            modifier: source.modifier,
        };
        self.store(node)
    }
}

fn key_set<K: AsRef<str>>(keys: &[K]) -> IndexSet<&str> {
    keys.iter().map(AsRef::as_ref).collect()
}
