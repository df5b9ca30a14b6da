//! The builder session: primitives, combinators and modifiers.
//!
//! [`TypeBuilder`] owns the session [`Registry`] and [`BuilderConfig`]. Every
//! construction returns a fresh [`SchemaNode`]; when the node carries a
//! non-empty identifier it is also registered under it. Structural transforms
//! live in [`crate::transform`], namespaces and references in
//! [`crate::reference`].
//!
//! # Example
//! ```rust
//! use schema_forge::{Annotations, ObjectOptions, StringOptions, TypeBuilder};
//!
//! # fn main() -> schema_forge::SchemaResult<()> {
//! let mut t = TypeBuilder::new();
//!
//! let name = t.string(StringOptions::new().with_min_length(1))?;
//! let nickname = t.string(StringOptions::new())?;
//! let user = t.object(
//!     [("name", name), ("nickname", t.optional(&nickname))],
//!     ObjectOptions::new().with_id("User"),
//! )?;
//!
//! let required: Vec<_> = user.required().unwrap().iter().cloned().collect();
//! assert_eq!(required, vec!["name"]);
//! assert!(t.registry().contains("User"));
//! # Ok(())
//! # }
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::{BuilderConfig, IdentifierPolicy};
use crate::error::{SchemaError, SchemaResult};
use crate::node::{
    json_type_name, required_names, EnumMember, LiteralValue, Modifier, SchemaKind, SchemaNode,
};
use crate::options::{
    Annotations, ArrayOptions, IntersectOptions, NumberOptions, ObjectOptions, StringConstraints,
    StringOptions,
};
use crate::registry::Registry;

/// Property pattern for records keyed by any string.
pub const ANY_STRING_PATTERN: &str = "^.*$";

/// Property pattern for records keyed by non-negative integers.
pub const NUMBER_KEY_PATTERN: &str = "^(0|[1-9][0-9]*)$";

/// One schema-building session.
#[derive(Debug, Clone, Default)]
pub struct TypeBuilder {
    pub(crate) config: BuilderConfig,
    pub(crate) registry: Registry,
}

impl TypeBuilder {
    /// Start a session with the default configuration and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with the given configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registers `node` under its identifier, if it has one, and returns it.
    pub(crate) fn store(&mut self, node: SchemaNode) -> SchemaResult<SchemaNode> {
        trace!(kind = node.kind.name(), "Constructed schema node");

        let Some(id) = node.id().map(str::to_owned) else {
            return Ok(node);
        };

        if self.registry.contains(&id) {
            match self.config.identifier_policy {
                IdentifierPolicy::Reject => {
                    debug!(id = %id, "Rejected duplicate identifier");
                    return Err(SchemaError::DuplicateIdentifier { id });
                }
                IdentifierPolicy::Overwrite => {
                    warn!(id = %id, "Overwriting registered schema");
                }
            }
        }

        debug!(id = %id, kind = node.kind.name(), "Registered schema");
        self.registry.insert(id, node.clone());
        Ok(node)
    }

    fn build(&mut self, kind: SchemaKind, annotations: Annotations) -> SchemaResult<SchemaNode> {
        self.store(SchemaNode::new(kind, annotations))
    }

    // ==========================================================================
    // Modifiers
    // ==========================================================================

    /// A copy of `node` marked optional when used as an object property.
    pub fn optional(&self, node: &SchemaNode) -> SchemaNode {
        node.with_modifier(Modifier::Optional)
    }

    /// A copy of `node` marked readonly when used as an object property.
    pub fn readonly(&self, node: &SchemaNode) -> SchemaNode {
        node.with_modifier(Modifier::Readonly)
    }

    /// A copy of `node` marked readonly and optional.
    pub fn readonly_optional(&self, node: &SchemaNode) -> SchemaNode {
        node.with_modifier(Modifier::ReadonlyOptional)
    }

    // ==========================================================================
    // Primitives
    // ==========================================================================

    pub fn any(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Any, options)
    }

    pub fn unknown(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Unknown, options)
    }

    pub fn never(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Never, options)
    }

    pub fn null(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Null, options)
    }

    pub fn void(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Void, options)
    }

    pub fn undefined(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Undefined, options)
    }

    pub fn boolean(&mut self, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Boolean, options)
    }

    pub fn number(&mut self, options: NumberOptions) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Number(options.constraints), options.annotations)
    }

    pub fn integer(&mut self, options: NumberOptions) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Integer(options.constraints), options.annotations)
    }

    pub fn string(&mut self, options: StringOptions) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::String(options.constraints), options.annotations)
    }

    /// A string schema whose `pattern` is the source text of `expr`.
    pub fn regex(&mut self, expr: &Regex, options: Annotations) -> SchemaResult<SchemaNode> {
        let constraints = StringConstraints {
            pattern: Some(expr.as_str().to_string()),
            ..Default::default()
        };
        self.build(SchemaKind::String(constraints), options)
    }

    /// A literal schema. `value` must be a string, number or boolean.
    pub fn literal(
        &mut self,
        value: impl Into<Value>,
        options: Annotations,
    ) -> SchemaResult<SchemaNode> {
        let value = LiteralValue::try_from(value.into())?;
        self.build(SchemaKind::Literal(value), options)
    }

    /// An enumeration built from a name → value mapping.
    ///
    /// Entries whose name is a non-negative integer literal are skipped, so
    /// reverse-mapped numeric enumerations (`{"A": 0, "0": "A"}`) yield only
    /// their forward members.
    pub fn enumeration<I, K, V>(&mut self, mapping: I, options: Annotations) -> SchemaResult<SchemaNode>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut members = Vec::new();
        for (key, value) in mapping {
            let key = key.as_ref();
            if is_index_key(key) {
                continue;
            }
            let member = match value.into() {
                Value::String(s) => EnumMember::String(s),
                Value::Number(n) => EnumMember::Number(n),
                other => {
                    return Err(SchemaError::InvalidEnumValue {
                        key: key.to_string(),
                        found: json_type_name(&other).to_string(),
                    })
                }
            };
            members.push(member);
        }
        self.build(SchemaKind::Enum(members), options)
    }

    // ==========================================================================
    // Combinators
    // ==========================================================================

    pub fn array(&mut self, items: SchemaNode, options: ArrayOptions) -> SchemaResult<SchemaNode> {
        self.build(
            SchemaKind::Array {
                items: Box::new(items),
                constraints: options.constraints,
            },
            options.annotations,
        )
    }

    pub fn tuple(&mut self, items: Vec<SchemaNode>, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Tuple(items), options)
    }

    /// An object schema. Requiredness is derived from the property modifiers.
    pub fn object<I, K>(&mut self, properties: I, options: ObjectOptions) -> SchemaResult<SchemaNode>
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        let properties: IndexMap<String, SchemaNode> = properties
            .into_iter()
            .map(|(name, node)| (name.into(), node))
            .collect();
        let required = required_names(&properties);
        self.build(
            SchemaKind::Object {
                properties,
                required,
                constraints: options.constraints,
            },
            options.annotations,
        )
    }

    /// A map-like object whose property names match a pattern derived from `key`.
    pub fn record(
        &mut self,
        key: &SchemaNode,
        value: SchemaNode,
        options: ObjectOptions,
    ) -> SchemaResult<SchemaNode> {
        let pattern = record_pattern(key)?;
        self.build(
            SchemaKind::Record {
                pattern,
                value: Box::new(value),
                constraints: options.constraints,
            },
            options.annotations,
        )
    }

    pub fn union(&mut self, variants: Vec<SchemaNode>, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Union(variants), options)
    }

    pub fn intersect(
        &mut self,
        variants: Vec<SchemaNode>,
        options: IntersectOptions,
    ) -> SchemaResult<SchemaNode> {
        self.build(
            SchemaKind::Intersect {
                variants,
                constraints: options.constraints,
            },
            options.annotations,
        )
    }

    pub fn function(
        &mut self,
        parameters: Vec<SchemaNode>,
        returns: SchemaNode,
        options: Annotations,
    ) -> SchemaResult<SchemaNode> {
        self.build(
            SchemaKind::Function {
                parameters,
                returns: Box::new(returns),
            },
            options,
        )
    }

    pub fn constructor(
        &mut self,
        parameters: Vec<SchemaNode>,
        returns: SchemaNode,
        options: Annotations,
    ) -> SchemaResult<SchemaNode> {
        self.build(
            SchemaKind::Constructor {
                parameters,
                returns: Box::new(returns),
            },
            options,
        )
    }

    pub fn promise(&mut self, item: SchemaNode, options: Annotations) -> SchemaResult<SchemaNode> {
        self.build(SchemaKind::Promise(Box::new(item)), options)
    }
}

/// True for keys made only of ASCII digits.
fn is_index_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Property-name pattern for a record keyed by `key`.
fn record_pattern(key: &SchemaNode) -> SchemaResult<String> {
    match &key.kind {
        SchemaKind::String(constraints) => Ok(constraints
            .pattern
            .clone()
            .filter(|pattern| !pattern.is_empty())
            .unwrap_or_else(|| ANY_STRING_PATTERN.to_string())),
        SchemaKind::Number(_) => Ok(NUMBER_KEY_PATTERN.to_string()),
        SchemaKind::KeyOf(keys) => Ok(format!("^{}$", keys.join("|"))),
        SchemaKind::Union(variants) => {
            let alternatives = variants
                .iter()
                .map(|variant| match &variant.kind {
                    SchemaKind::Literal(value) => Ok(value.pattern_text()),
                    other => Err(SchemaError::InvalidRecordKey {
                        kind: format!("Union containing {}", other.name()),
                    }),
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            Ok(format!("^{}$", alternatives.join("|")))
        }
        other => Err(SchemaError::InvalidRecordKey {
            kind: other.name().to_string(),
        }),
    }
}
