//! Schema node model.
//!
//! A [`SchemaNode`] is one schema descriptor: a [`SchemaKind`] carrying the
//! kind-specific structure, an [`Annotations`] bag, and a [`Modifier`] that only
//! matters when the node is used as an object property. Kind and modifier are
//! internal bookkeeping; neither is part of the wire form (see [`crate::wire`]).

use indexmap::{IndexMap, IndexSet};
use serde_json::{Number, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::options::{
    Annotations, ArrayConstraints, IntersectConstraints, NumberConstraints, ObjectConstraints,
    StringConstraints,
};

/// Separator between a container identifier and a definition key in a
/// reference path, e.g. `Shapes#/$defs/Point`.
pub const DEFS_SEPARATOR: &str = "#/$defs/";

/// Definition key under which a recursive node stores its body.
pub const SELF_KEY: &str = "self";

/// Splits `"<id>#/$defs/<key>"` into `(id, key)`. The id may be empty.
pub fn split_ref_path(path: &str) -> Option<(&str, &str)> {
    let (id, key) = path.split_once(DEFS_SEPARATOR)?;
    if key.is_empty() {
        return None;
    }
    Some((id, key))
}

/// Per-property modifier tag.
///
/// Controls requiredness (Optional, ReadonlyOptional) and readonly-ness
/// (Readonly, ReadonlyOptional) of a node nested in an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    #[default]
    None,
    Optional,
    Readonly,
    ReadonlyOptional,
}

impl Modifier {
    /// True for `Optional` and `ReadonlyOptional`.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional | Self::ReadonlyOptional)
    }

    /// True for `Readonly` and `ReadonlyOptional`.
    pub fn is_readonly(&self) -> bool {
        matches!(self, Self::Readonly | Self::ReadonlyOptional)
    }

    /// The modifier a property takes under `Partial`: optional, keeping readonly.
    pub fn to_optional(self) -> Self {
        if self.is_readonly() {
            Self::ReadonlyOptional
        } else {
            Self::Optional
        }
    }

    /// The modifier a property takes under `Required`: not optional, keeping readonly.
    pub fn to_required(self) -> Self {
        if self.is_readonly() {
            Self::Readonly
        } else {
            Self::None
        }
    }
}

/// Value of a `Literal` node.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl LiteralValue {
    /// Wire `type` of the literal.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Textual form used when joining literals into a property pattern.
    pub fn pattern_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

impl TryFrom<Value> for LiteralValue {
    type Error = SchemaError;

    fn try_from(value: Value) -> SchemaResult<Self> {
        match value {
            Value::String(s) => Ok(Self::String(s)),
            Value::Number(n) => Ok(Self::Number(n)),
            Value::Bool(b) => Ok(Self::Boolean(b)),
            other => Err(SchemaError::InvalidLiteral {
                found: json_type_name(&other).to_string(),
            }),
        }
    }
}

/// One member of an `Enum` node.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumMember {
    String(String),
    Number(Number),
}

impl EnumMember {
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Kind-specific structure of a node. One variant per node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    // ==========================================================================
    // Primitives
    // ==========================================================================
    Any,
    Unknown,
    Never,
    Null,
    Void,
    Undefined,
    Boolean,
    Number(NumberConstraints),
    Integer(NumberConstraints),
    String(StringConstraints),
    Literal(LiteralValue),

    // ==========================================================================
    // Composites
    // ==========================================================================
    Array {
        items: Box<SchemaNode>,
        constraints: ArrayConstraints,
    },
    Tuple(Vec<SchemaNode>),
    Object {
        /// Properties in declaration order
        properties: IndexMap<String, SchemaNode>,
        /// Required property names; empty means the field is omitted
        required: IndexSet<String>,
        constraints: ObjectConstraints,
    },
    Record {
        pattern: String,
        value: Box<SchemaNode>,
        constraints: ObjectConstraints,
    },
    Union(Vec<SchemaNode>),
    Intersect {
        variants: Vec<SchemaNode>,
        constraints: IntersectConstraints,
    },
    KeyOf(Vec<String>),
    Enum(Vec<EnumMember>),
    Function {
        parameters: Vec<SchemaNode>,
        returns: Box<SchemaNode>,
    },
    Constructor {
        parameters: Vec<SchemaNode>,
        returns: Box<SchemaNode>,
    },
    Promise(Box<SchemaNode>),

    // ==========================================================================
    // References
    // ==========================================================================
    Namespace(IndexMap<String, SchemaNode>),
    Ref(String),
    /// Recursive node: `$ref` to its own `$defs/self`, and that body.
    Rec {
        reference: String,
        body: Box<SchemaNode>,
    },
}

impl SchemaKind {
    /// Kind name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Unknown => "Unknown",
            Self::Never => "Never",
            Self::Null => "Null",
            Self::Void => "Void",
            Self::Undefined => "Undefined",
            Self::Boolean => "Boolean",
            Self::Number(_) => "Number",
            Self::Integer(_) => "Integer",
            Self::String(_) => "String",
            Self::Literal(_) => "Literal",
            Self::Array { .. } => "Array",
            Self::Tuple(_) => "Tuple",
            Self::Object { .. } => "Object",
            Self::Record { .. } => "Record",
            Self::Union(_) => "Union",
            Self::Intersect { .. } => "Intersect",
            Self::KeyOf(_) => "KeyOf",
            Self::Enum(_) => "Enum",
            Self::Function { .. } => "Function",
            Self::Constructor { .. } => "Constructor",
            Self::Promise(_) => "Promise",
            Self::Namespace(_) => "Namespace",
            Self::Ref(_) => "Ref",
            Self::Rec { .. } => "Rec",
        }
    }

    /// Check if this kind is followed by dereferencing.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Ref(_) | Self::Rec { .. })
    }
}

/// One schema descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub annotations: Annotations,
    /// Only meaningful for object properties; never serialized
    pub modifier: Modifier,
}

impl SchemaNode {
    /// Create a node with the given kind and annotations and no modifier.
    pub fn new(kind: SchemaKind, annotations: Annotations) -> Self {
        Self {
            kind,
            annotations,
            modifier: Modifier::None,
        }
    }

    /// Create a bare `Ref` node. The target is not checked.
    pub fn reference(path: impl Into<String>) -> Self {
        Self::new(SchemaKind::Ref(path.into()), Annotations::default())
    }

    /// The identifier, if set and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.annotations.identifier()
    }

    /// A copy of this node carrying `modifier`.
    pub fn with_modifier(&self, modifier: Modifier) -> Self {
        Self {
            modifier,
            ..self.clone()
        }
    }

    /// Target path of a `Ref` or `Rec` node.
    pub fn ref_path(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Ref(path) => Some(path),
            SchemaKind::Rec { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Object properties, in declaration order.
    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match &self.kind {
            SchemaKind::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required property names of an object.
    pub fn required(&self) -> Option<&IndexSet<String>> {
        match &self.kind {
            SchemaKind::Object { required, .. } => Some(required),
            _ => None,
        }
    }

    /// Looks up `key` in this node's `$defs` (Namespace definitions, or the
    /// `self` body of a Rec).
    pub fn def(&self, key: &str) -> Option<&SchemaNode> {
        match &self.kind {
            SchemaKind::Namespace(defs) => defs.get(key),
            SchemaKind::Rec { body, .. } if key == SELF_KEY => Some(body),
            _ => None,
        }
    }

    /// Resolves a `"<id>#/$defs/<key>"` path against this node's own `$defs`.
    ///
    /// The id part must be empty or equal this node's identifier.
    pub fn resolve_local(&self, path: &str) -> Option<&SchemaNode> {
        let (id, key) = split_ref_path(path)?;
        if !id.is_empty() && self.id() != Some(id) {
            return None;
        }
        self.def(key)
    }
}

/// Names whose value's modifier is neither Optional nor ReadonlyOptional.
pub fn required_names(properties: &IndexMap<String, SchemaNode>) -> IndexSet<String> {
    properties
        .iter()
        .filter(|(_, node)| !node.modifier.is_optional())
        .map(|(name, _)| name.clone())
        .collect()
}
