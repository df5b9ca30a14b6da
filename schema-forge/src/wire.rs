//! JSON wire form of schema nodes.
//!
//! [`SchemaNode::to_value`] writes an explicit field list: the annotation bag
//! (`$id`, `title`, `description`, `default`, `examples`, extensions), the
//! kind's constraints, then its structural fields. The kind and the modifier
//! are never written.
//!
//! [`SchemaNode::from_value`] rebuilds a node from those fields alone. A `$ref`
//! makes a reference. Otherwise `type` decides the kind, refined by shape
//! (`const`, `enum`, `items`, `allOf`, `patternProperties`); without a `type`,
//! `$defs`, `anyOf` and `not` are tried in that order. Keywords that do not
//! fit the chosen kind stay in the annotation bag as extensions. Two wire
//! shapes are shared by more than one kind; reconstruction picks one:
//!
//! | Wire shape                    | Built by       | Read back as        |
//! |-------------------------------|----------------|---------------------|
//! | `{}`                          | Any, Unknown   | Unknown             |
//! | `anyOf` of `{type, const}`    | Enum           | Union of Literals   |
//!
//! Property modifiers are reconstructed from `required`: a property missing
//! from it becomes Optional. Readonly-ness has no wire field and is lost.

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::builder::TypeBuilder;
use crate::error::{SchemaError, SchemaResult};
use crate::node::{
    json_type_name, required_names, EnumMember, LiteralValue, Modifier, SchemaKind, SchemaNode,
    DEFS_SEPARATOR, SELF_KEY,
};
use crate::options::{
    Annotations, ArrayConstraints, IntersectConstraints, NumberConstraints, ObjectConstraints,
    Options, StringConstraints,
};

// =============================================================================
// Writing
// =============================================================================

/// Appends the fields of a plain options struct to `map`.
fn insert_fields<T: Serialize>(map: &mut Map<String, Value>, fields: &T) {
    if let Ok(Value::Object(fields)) = serde_json::to_value(fields) {
        map.extend(fields);
    }
}

fn node_array(nodes: &[SchemaNode]) -> Value {
    Value::Array(nodes.iter().map(SchemaNode::to_value).collect())
}

fn node_object(nodes: &IndexMap<String, SchemaNode>) -> Value {
    Value::Object(
        nodes
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect(),
    )
}

impl SchemaNode {
    /// The wire form of this node.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        insert_fields(&mut map, &self.annotations);

        match &self.kind {
            SchemaKind::Any | SchemaKind::Unknown => {}
            SchemaKind::Never => {
                map.insert("not".into(), Value::Object(Map::new()));
            }
            SchemaKind::Null => {
                map.insert("type".into(), "null".into());
            }
            SchemaKind::Void => {
                map.insert("type".into(), "void".into());
            }
            SchemaKind::Undefined => {
                map.insert("type".into(), "undefined".into());
            }
            SchemaKind::Boolean => {
                map.insert("type".into(), "boolean".into());
            }
            SchemaKind::Number(constraints) => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "number".into());
            }
            SchemaKind::Integer(constraints) => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "integer".into());
            }
            SchemaKind::String(constraints) => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "string".into());
            }
            SchemaKind::Literal(value) => {
                map.insert("const".into(), value.to_value());
                map.insert("type".into(), value.value_type().into());
            }
            SchemaKind::Array { items, constraints } => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "array".into());
                map.insert("items".into(), items.to_value());
            }
            SchemaKind::Tuple(items) => {
                map.insert("type".into(), "array".into());
                if !items.is_empty() {
                    map.insert("items".into(), node_array(items));
                    map.insert("additionalItems".into(), Value::Bool(false));
                }
                map.insert("minItems".into(), items.len().into());
                map.insert("maxItems".into(), items.len().into());
            }
            SchemaKind::Object {
                properties,
                required,
                constraints,
            } => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "object".into());
                map.insert("properties".into(), node_object(properties));
                if !required.is_empty() {
                    map.insert(
                        "required".into(),
                        required.iter().cloned().map(Value::String).collect(),
                    );
                }
            }
            SchemaKind::Record {
                pattern,
                value,
                constraints,
            } => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "object".into());
                let mut pattern_properties = Map::new();
                pattern_properties.insert(pattern.clone(), value.to_value());
                map.insert(
                    "patternProperties".into(),
                    Value::Object(pattern_properties),
                );
            }
            SchemaKind::Union(variants) => {
                map.insert("anyOf".into(), node_array(variants));
            }
            SchemaKind::Intersect {
                variants,
                constraints,
            } => {
                insert_fields(&mut map, constraints);
                map.insert("type".into(), "object".into());
                map.insert("allOf".into(), node_array(variants));
            }
            SchemaKind::KeyOf(keys) => {
                map.insert("type".into(), "string".into());
                map.insert(
                    "enum".into(),
                    keys.iter().cloned().map(Value::String).collect(),
                );
            }
            SchemaKind::Enum(members) => {
                let any_of = members
                    .iter()
                    .map(|member| {
                        let mut option = Map::new();
                        option.insert("type".into(), member.value_type().into());
                        option.insert("const".into(), member.to_value());
                        Value::Object(option)
                    })
                    .collect();
                map.insert("anyOf".into(), Value::Array(any_of));
            }
            SchemaKind::Function {
                parameters,
                returns,
            } => {
                map.insert("type".into(), "function".into());
                map.insert("arguments".into(), node_array(parameters));
                map.insert("returns".into(), returns.to_value());
            }
            SchemaKind::Constructor {
                parameters,
                returns,
            } => {
                map.insert("type".into(), "constructor".into());
                map.insert("arguments".into(), node_array(parameters));
                map.insert("returns".into(), returns.to_value());
            }
            SchemaKind::Promise(item) => {
                map.insert("type".into(), "promise".into());
                map.insert("item".into(), item.to_value());
            }
            SchemaKind::Namespace(defs) => {
                map.insert("$defs".into(), node_object(defs));
            }
            SchemaKind::Ref(path) => {
                map.insert("$ref".into(), path.clone().into());
            }
            SchemaKind::Rec { reference, body } => {
                map.insert("$ref".into(), reference.clone().into());
                let mut defs = Map::new();
                defs.insert(SELF_KEY.into(), body.to_value());
                map.insert("$defs".into(), Value::Object(defs));
            }
        }

        Value::Object(map)
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

// =============================================================================
// Reading
// =============================================================================

fn expected(field: &str, shape: &str, found: &Value) -> SchemaError {
    SchemaError::wire(format!(
        "'{field}' must be {shape}, got {}",
        json_type_name(found)
    ))
}

fn take(map: &mut Map<String, Value>, field: &str) -> SchemaResult<Value> {
    map.remove(field)
        .ok_or_else(|| SchemaError::wire(format!("missing '{field}'")))
}

fn into_string(field: &str, value: Value) -> SchemaResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(expected(field, "a string", &other)),
    }
}

fn string_list(field: &str, value: Value) -> SchemaResult<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| into_string(field, item))
            .collect(),
        other => Err(expected(field, "an array", &other)),
    }
}

fn node_list(field: &str, value: Value) -> SchemaResult<Vec<SchemaNode>> {
    match value {
        Value::Array(items) => items.into_iter().map(SchemaNode::from_value).collect(),
        other => Err(expected(field, "an array", &other)),
    }
}

fn node_map(field: &str, value: Value) -> SchemaResult<IndexMap<String, SchemaNode>> {
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .map(|(name, node)| Ok((name, SchemaNode::from_value(node)?)))
            .collect(),
        other => Err(expected(field, "an object", &other)),
    }
}

/// Removes `field` when it holds exactly `value`.
fn remove_if(map: &mut Map<String, Value>, field: &str, value: &Value) {
    if map.get(field) == Some(value) {
        map.remove(field);
    }
}

/// The remaining fields as an annotation bag.
fn with_annotations(kind: SchemaKind, map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    let annotations: Annotations = serde_json::from_value(Value::Object(map))?;
    Ok(SchemaNode::new(kind, annotations))
}

/// The remaining fields as constraints plus an annotation bag.
fn split_options<C: DeserializeOwned>(
    map: Map<String, Value>,
) -> SchemaResult<(C, Annotations)> {
    let options: Options<C> = serde_json::from_value(Value::Object(map))?;
    Ok((options.constraints, options.annotations))
}

/// Takes the `$defs/self` body of a recursive node, if `map` is one.
fn take_self_def(map: &mut Map<String, Value>, reference: &str) -> SchemaResult<Option<SchemaNode>> {
    let is_rec = reference.ends_with(&format!("{DEFS_SEPARATOR}{SELF_KEY}"))
        && matches!(map.get("$defs"), Some(Value::Object(defs)) if defs.len() == 1 && defs.contains_key(SELF_KEY));
    if !is_rec {
        return Ok(None);
    }
    let body = match map.remove("$defs") {
        Some(Value::Object(mut defs)) => defs.remove(SELF_KEY),
        _ => None,
    };
    body.map(SchemaNode::from_value).transpose()
}

fn read_array(mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    match map.remove("items") {
        Some(Value::Object(items)) => {
            let items = SchemaNode::from_value(Value::Object(items))?;
            let (constraints, annotations) = split_options::<ArrayConstraints>(map)?;
            Ok(SchemaNode::new(
                SchemaKind::Array {
                    items: Box::new(items),
                    constraints,
                },
                annotations,
            ))
        }
        Some(Value::Array(items)) => {
            let items = node_list("items", Value::Array(items))?;
            read_tuple(items, map)
        }
        None => read_tuple(Vec::new(), map),
        Some(other) => Err(expected("items", "an object or an array", &other)),
    }
}

fn read_tuple(items: Vec<SchemaNode>, mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    let len = Value::from(items.len());
    remove_if(&mut map, "additionalItems", &Value::Bool(false));
    remove_if(&mut map, "minItems", &len);
    remove_if(&mut map, "maxItems", &len);
    with_annotations(SchemaKind::Tuple(items), map)
}

/// Takes the single `(pattern, schema)` entry of a record's
/// `patternProperties`. Any other shape is left in place.
fn take_record_pattern(map: &mut Map<String, Value>) -> Option<(String, Value)> {
    if map.contains_key("properties") {
        return None;
    }
    match map.get("patternProperties") {
        Some(Value::Object(patterns)) if patterns.len() == 1 => {}
        _ => return None,
    }
    match map.remove("patternProperties") {
        Some(Value::Object(patterns)) => patterns.into_iter().next(),
        _ => None,
    }
}

fn read_object(mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    if let Some((pattern, value)) = take_record_pattern(&mut map) {
        let value = SchemaNode::from_value(value)?;
        let (constraints, annotations) = split_options::<ObjectConstraints>(map)?;
        return Ok(SchemaNode::new(
            SchemaKind::Record {
                pattern,
                value: Box::new(value),
                constraints,
            },
            annotations,
        ));
    }

    let properties = match map.remove("properties") {
        Some(properties) => node_map("properties", properties)?,
        None => IndexMap::new(),
    };
    let listed: IndexSet<String> = match map.remove("required") {
        Some(required) => string_list("required", required)?.into_iter().collect(),
        None => IndexSet::new(),
    };
    let properties: IndexMap<String, SchemaNode> = properties
        .into_iter()
        .map(|(name, mut node)| {
            if !listed.contains(&name) {
                node.modifier = Modifier::Optional;
            }
            (name, node)
        })
        .collect();
    let required = required_names(&properties);
    let (constraints, annotations) = split_options::<ObjectConstraints>(map)?;
    Ok(SchemaNode::new(
        SchemaKind::Object {
            properties,
            required,
            constraints,
        },
        annotations,
    ))
}

fn read_signature(
    mut map: Map<String, Value>,
    constructor: bool,
) -> SchemaResult<SchemaNode> {
    let parameters = match map.remove("arguments") {
        Some(arguments) => node_list("arguments", arguments)?,
        None => Vec::new(),
    };
    let returns = Box::new(SchemaNode::from_value(take(&mut map, "returns")?)?);
    let kind = if constructor {
        SchemaKind::Constructor {
            parameters,
            returns,
        }
    } else {
        SchemaKind::Function {
            parameters,
            returns,
        }
    };
    with_annotations(kind, map)
}

impl SchemaNode {
    /// Rebuild a node from its wire form.
    ///
    /// A `type` decides the kind first; keywords that do not belong to that
    /// type are kept as extensions. Unrecognized fields become extensions of
    /// the annotation bag.
    pub fn from_value(value: Value) -> SchemaResult<SchemaNode> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(expected("schema", "a JSON object", &other)),
        };

        if let Some(reference) = map.remove("$ref") {
            let reference = into_string("$ref", reference)?;
            let kind = match take_self_def(&mut map, &reference)? {
                Some(body) => SchemaKind::Rec {
                    reference,
                    body: Box::new(body),
                },
                None => SchemaKind::Ref(reference),
            };
            return with_annotations(kind, map);
        }

        match map.remove("type") {
            Some(Value::String(name)) => read_typed(&name, map),
            Some(other) => Err(expected("type", "a string", &other)),
            None => read_untyped(map),
        }
    }
}

/// Takes `const` when it is a literal whose wire type is `type_name`.
fn take_literal(map: &mut Map<String, Value>, type_name: &str) -> Option<LiteralValue> {
    let literal = LiteralValue::try_from(map.get("const")?.clone()).ok()?;
    if literal.value_type() != type_name {
        return None;
    }
    map.remove("const");
    Some(literal)
}

fn has_array(map: &Map<String, Value>, field: &str) -> bool {
    matches!(map.get(field), Some(Value::Array(_)))
}

/// An `object` typed map written by `Intersect`: `allOf` without the
/// structural fields of an object or a record.
fn is_intersect(map: &Map<String, Value>) -> bool {
    has_array(map, "allOf")
        && !map.contains_key("properties")
        && !map.contains_key("patternProperties")
}

fn read_typed(type_name: &str, mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    if let Some(literal) = take_literal(&mut map, type_name) {
        return with_annotations(SchemaKind::Literal(literal), map);
    }

    match type_name {
        "null" => with_annotations(SchemaKind::Null, map),
        "void" => with_annotations(SchemaKind::Void, map),
        "undefined" => with_annotations(SchemaKind::Undefined, map),
        "boolean" => with_annotations(SchemaKind::Boolean, map),
        "number" => {
            let (constraints, annotations) = split_options::<NumberConstraints>(map)?;
            Ok(SchemaNode::new(SchemaKind::Number(constraints), annotations))
        }
        "integer" => {
            let (constraints, annotations) = split_options::<NumberConstraints>(map)?;
            Ok(SchemaNode::new(SchemaKind::Integer(constraints), annotations))
        }
        "string" => read_string(map),
        "array" => read_array(map),
        "object" if is_intersect(&map) => {
            let variants = node_list("allOf", take(&mut map, "allOf")?)?;
            let (constraints, annotations) = split_options::<IntersectConstraints>(map)?;
            Ok(SchemaNode::new(
                SchemaKind::Intersect {
                    variants,
                    constraints,
                },
                annotations,
            ))
        }
        "object" => read_object(map),
        "function" => read_signature(map, false),
        "constructor" => read_signature(map, true),
        "promise" => {
            let item = SchemaNode::from_value(take(&mut map, "item")?)?;
            with_annotations(SchemaKind::Promise(Box::new(item)), map)
        }
        other => Err(SchemaError::wire(format!("unknown type '{other}'"))),
    }
}

/// Wire keys of string constraints; their presence rules out `KeyOf`.
const STRING_CONSTRAINT_KEYS: [&str; 6] = [
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "contentEncoding",
    "contentMediaType",
];

fn read_string(mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    let is_key_of = matches!(map.get("enum"), Some(Value::Array(keys)) if keys.iter().all(Value::is_string))
        && !STRING_CONSTRAINT_KEYS.iter().any(|key| map.contains_key(*key));
    if is_key_of {
        let keys = string_list("enum", take(&mut map, "enum")?)?;
        return with_annotations(SchemaKind::KeyOf(keys), map);
    }
    let (constraints, annotations) = split_options::<StringConstraints>(map)?;
    Ok(SchemaNode::new(SchemaKind::String(constraints), annotations))
}

fn read_untyped(mut map: Map<String, Value>) -> SchemaResult<SchemaNode> {
    if matches!(map.get("$defs"), Some(Value::Object(_))) {
        let defs = node_map("$defs", take(&mut map, "$defs")?)?;
        return with_annotations(SchemaKind::Namespace(defs), map);
    }
    if has_array(&map, "anyOf") {
        let variants = node_list("anyOf", take(&mut map, "anyOf")?)?;
        return with_annotations(SchemaKind::Union(variants), map);
    }
    if matches!(map.get("not"), Some(Value::Object(not)) if not.is_empty()) {
        map.remove("not");
        return with_annotations(SchemaKind::Never, map);
    }
    with_annotations(SchemaKind::Unknown, map)
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaNode::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Keys the kind itself writes; an extension under one of them is hidden
/// by the structural field in the wire form.
fn structural_keys(kind: &SchemaKind) -> IndexSet<String> {
    match SchemaNode::new(kind.clone(), Annotations::new()).to_value() {
        Value::Object(map) => map.into_iter().map(|(key, _)| key).collect(),
        _ => IndexSet::new(),
    }
}

fn portable_list(nodes: &[SchemaNode]) -> Vec<SchemaNode> {
    nodes.iter().map(portable).collect()
}

fn portable_map(nodes: &IndexMap<String, SchemaNode>) -> IndexMap<String, SchemaNode> {
    nodes
        .iter()
        .map(|(name, node)| (name.clone(), portable(node)))
        .collect()
}

/// The node as its wire form reads back: no modifier, no readonly-ness,
/// `Any` as `Unknown`, an enumeration as a union of literals, and no
/// extensions hidden by structural fields. The kind is otherwise kept.
fn portable(node: &SchemaNode) -> SchemaNode {
    let kind = match &node.kind {
        SchemaKind::Any => SchemaKind::Unknown,
        SchemaKind::Enum(members) => SchemaKind::Union(
            members
                .iter()
                .map(|member| {
                    let literal = match member {
                        EnumMember::String(s) => LiteralValue::String(s.clone()),
                        EnumMember::Number(n) => LiteralValue::Number(n.clone()),
                    };
                    SchemaNode::new(SchemaKind::Literal(literal), Annotations::new())
                })
                .collect(),
        ),
        SchemaKind::Array { items, constraints } => SchemaKind::Array {
            items: Box::new(portable(items)),
            constraints: constraints.clone(),
        },
        SchemaKind::Tuple(items) => SchemaKind::Tuple(portable_list(items)),
        SchemaKind::Object {
            properties,
            constraints,
            ..
        } => {
            let properties: IndexMap<String, SchemaNode> = properties
                .iter()
                .map(|(name, property)| {
                    let mut copy = portable(property);
                    if property.modifier.is_optional() {
                        copy.modifier = Modifier::Optional;
                    }
                    (name.clone(), copy)
                })
                .collect();
            SchemaKind::Object {
                required: required_names(&properties),
                properties,
                constraints: constraints.clone(),
            }
        }
        SchemaKind::Record {
            pattern,
            value,
            constraints,
        } => SchemaKind::Record {
            pattern: pattern.clone(),
            value: Box::new(portable(value)),
            constraints: constraints.clone(),
        },
        SchemaKind::Union(variants) => SchemaKind::Union(portable_list(variants)),
        SchemaKind::Intersect {
            variants,
            constraints,
        } => SchemaKind::Intersect {
            variants: portable_list(variants),
            constraints: constraints.clone(),
        },
        SchemaKind::Function {
            parameters,
            returns,
        } => SchemaKind::Function {
            parameters: portable_list(parameters),
            returns: Box::new(portable(returns)),
        },
        SchemaKind::Constructor {
            parameters,
            returns,
        } => SchemaKind::Constructor {
            parameters: portable_list(parameters),
            returns: Box::new(portable(returns)),
        },
        SchemaKind::Promise(item) => SchemaKind::Promise(Box::new(portable(item))),
        SchemaKind::Namespace(defs) => SchemaKind::Namespace(portable_map(defs)),
        SchemaKind::Rec { reference, body } => SchemaKind::Rec {
            reference: reference.clone(),
            body: Box::new(portable(body)),
        },
        other => other.clone(),
    };

    let mut annotations = node.annotations.clone();
    let hidden = structural_keys(&kind);
    annotations.extensions.retain(|key, _| !hidden.contains(key));
    SchemaNode::new(kind, annotations)
}

impl TypeBuilder {
    /// A wire-portable copy of `node` with `options` merged underneath.
    ///
    /// The node's own fields win over `options`. The copy keeps the node's
    /// kind and carries no modifier or anything else its wire form cannot
    /// express; see [`SchemaNode::from_value`] for what reads back
    /// differently. It is not registered.
    pub fn strict(&self, node: &SchemaNode, options: Annotations) -> SchemaNode {
        let mut annotations = options;
        annotations.merge(&node.annotations);
        let merged = SchemaNode::new(node.kind.clone(), annotations);

        let copy = portable(&merged);
        trace!(
            kind = copy.kind.name(),
            extensions = copy.annotations.extensions.len(),
            "Normalized schema"
        );
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::options::{ArrayOptions, NumberOptions, ObjectOptions, StringOptions};
    use serde_json::json;

    fn round_trip(node: &SchemaNode) -> SchemaNode {
        SchemaNode::from_value(node.to_value()).unwrap()
    }

    #[test]
    fn test_primitive_wire_forms() {
        let mut t = TypeBuilder::new();
        assert_eq!(t.any(Annotations::new()).unwrap().to_value(), json!({}));
        assert_eq!(t.never(Annotations::new()).unwrap().to_value(), json!({ "not": {} }));
        assert_eq!(
            t.null(Annotations::new()).unwrap().to_value(),
            json!({ "type": "null" })
        );
        assert_eq!(
            t.string(StringOptions::new().with_format("email"))
                .unwrap()
                .to_value(),
            json!({ "format": "email", "type": "string" })
        );
    }

    #[test]
    fn test_literal_wire_form() {
        let mut t = TypeBuilder::new();
        let node = t.literal("on", Annotations::new()).unwrap();
        assert_eq!(node.to_value(), json!({ "const": "on", "type": "string" }));
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_object_omits_empty_required() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let node = t
            .object([("a", t.optional(&s))], ObjectOptions::new())
            .unwrap();
        assert_eq!(
            node.to_value(),
            json!({ "type": "object", "properties": { "a": { "type": "string" } } })
        );
    }

    #[test]
    fn test_modifier_is_never_written() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let value = t.readonly_optional(&s).to_value();
        assert_eq!(value, json!({ "type": "string" }));
    }

    #[test]
    fn test_object_round_trip_restores_optional_modifiers() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let node = t
            .object(
                [("a", s.clone()), ("b", t.optional(&s))],
                ObjectOptions::new().with_additional_properties(false),
            )
            .unwrap();
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_tuple_wire_form() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let pair = t.tuple(vec![s.clone(), s], Annotations::new()).unwrap();
        assert_eq!(
            pair.to_value(),
            json!({
                "type": "array",
                "items": [{ "type": "string" }, { "type": "string" }],
                "additionalItems": false,
                "minItems": 2,
                "maxItems": 2
            })
        );
        assert_eq!(round_trip(&pair), pair);

        let empty = t.tuple(Vec::new(), Annotations::new()).unwrap();
        assert_eq!(
            empty.to_value(),
            json!({ "type": "array", "minItems": 0, "maxItems": 0 })
        );
        assert_eq!(round_trip(&empty), empty);
    }

    #[test]
    fn test_array_round_trip() {
        let mut t = TypeBuilder::new();
        let n = t.number(NumberOptions::new().with_minimum(1.5)).unwrap();
        let node = t
            .array(n, ArrayOptions::new().with_max_items(3).with_id("Scores"))
            .unwrap();
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_enum_reads_back_as_union_of_literals() {
        let mut t = TypeBuilder::new();
        let node = t
            .enumeration([("A", "a"), ("B", "b")], Annotations::new())
            .unwrap();
        let back = round_trip(&node);

        let a = t.literal("a", Annotations::new()).unwrap();
        let b = t.literal("b", Annotations::new()).unwrap();
        assert_eq!(back.kind, SchemaKind::Union(vec![a, b]));
        assert_eq!(back.to_value(), node.to_value());
    }

    #[test]
    fn test_any_reads_back_as_unknown() {
        let mut t = TypeBuilder::new();
        let node = t.any(Annotations::new().with_title("anything")).unwrap();
        assert_eq!(round_trip(&node).kind, SchemaKind::Unknown);
    }

    #[test]
    fn test_ref_with_foreign_defs_keeps_them_as_extensions() {
        let node = SchemaNode::from_value(json!({
            "$ref": "Other",
            "$defs": { "self": { "type": "null" } }
        }))
        .unwrap();
        assert_eq!(node.kind, SchemaKind::Ref("Other".into()));
        assert!(node.annotations.extensions.contains_key("$defs"));
    }

    #[test]
    fn test_rec_round_trip() {
        let mut t = TypeBuilder::new();
        let node = t
            .rec(
                |t, this| t.array(this, ArrayOptions::new()),
                Annotations::new().with_id("Nested"),
            )
            .unwrap();
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_extensions_pass_through() {
        let node = SchemaNode::from_value(json!({
            "type": "string",
            "minLength": 2,
            "x-label": "Code"
        }))
        .unwrap();
        let SchemaKind::String(constraints) = &node.kind else {
            panic!("expected string");
        };
        assert_eq!(constraints.min_length, Some(2));
        assert_eq!(node.annotations.extensions["x-label"], json!("Code"));
    }

    #[test]
    fn test_invalid_documents() {
        let err = SchemaNode::from_value(json!([1])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidWireFormat);

        let err = SchemaNode::from_value(json!({ "type": "tensor" })).unwrap_err();
        assert_eq!(err, SchemaError::wire("unknown type 'tensor'"));

        let err = SchemaNode::from_value(json!({ "type": "promise" })).unwrap_err();
        assert_eq!(err, SchemaError::wire("missing 'item'"));

        let err = SchemaNode::from_value(json!({ "type": "string", "title": 3 })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidWireFormat);
    }

    #[test]
    fn test_serde_impls_use_wire_form() {
        let mut t = TypeBuilder::new();
        let node = t.boolean(Annotations::new().with_id("Flag")).unwrap();
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"$id":"Flag","type":"boolean"}"#);

        let back: SchemaNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_strict_drops_modifier_and_keeps_node_fields() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new().with_id("Name")).unwrap();
        let optional = t.optional(&s);

        let strict = t
            .strict(
                &optional,
                Annotations::new()
                    .with_id("Ignored")
                    .with_description("added"),
            );

        assert_eq!(strict.modifier, Modifier::None);
        assert_eq!(strict.id(), Some("Name"));
        assert_eq!(strict.annotations.description.as_deref(), Some("added"));
    }

    #[test]
    fn test_strict_keeps_string_with_enum_extension() {
        let mut t = TypeBuilder::new();
        let node = t
            .string(
                StringOptions::new()
                    .with_min_length(1)
                    .with_extension("enum", json!(["a", "b"])),
            )
            .unwrap();

        let strict = t.strict(&node, Annotations::new());
        assert_eq!(strict, node);
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_strict_keeps_object_with_pattern_properties_extension() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let node = t
            .object(
                [("a", s)],
                ObjectOptions::new()
                    .with_extension("patternProperties", json!({ "^x": {}, "^y": {} })),
            )
            .unwrap();

        let strict = t.strict(&node, Annotations::new());
        assert_eq!(strict, node);
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_strict_options_do_not_change_the_kind() {
        let mut t = TypeBuilder::new();
        let s = t.string(StringOptions::new()).unwrap();
        let node = t
            .object([("a", s.clone()), ("b", s)], ObjectOptions::new())
            .unwrap();

        let strict = t.strict(&node, Annotations::new().with_extension("allOf", json!([])));
        assert_eq!(strict.kind, node.kind);
        assert_eq!(strict.annotations.extensions["allOf"], json!([]));
        assert_eq!(round_trip(&strict), strict);

        let picked = t.pick(&strict, &["a"], ObjectOptions::new()).unwrap();
        assert_eq!(picked.properties().unwrap().len(), 1);
    }

    #[test]
    fn test_strict_keeps_kind_with_const_extension() {
        let mut t = TypeBuilder::new();
        let flag = t
            .boolean(Annotations::new().with_extension("const", "on"))
            .unwrap();
        let strict = t.strict(&flag, Annotations::new());
        assert_eq!(strict.kind, SchemaKind::Boolean);
        assert_eq!(round_trip(&flag), flag);

        let literal = t
            .literal(3, Annotations::new().with_extension("const", "shadowed"))
            .unwrap();
        let strict = t.strict(&literal, Annotations::new());
        assert!(strict.annotations.extensions.is_empty());
        assert_eq!(strict.to_value(), json!({ "const": 3, "type": "number" }));
    }

    #[test]
    fn test_strict_drops_option_fields_hidden_by_the_node() {
        let mut t = TypeBuilder::new();
        let node = t.null(Annotations::new()).unwrap();
        let strict = t.strict(
            &node,
            Annotations::new()
                .with_extension("type", "string")
                .with_extension("x-origin", "import"),
        );
        assert_eq!(strict.kind, SchemaKind::Null);
        assert_eq!(
            strict.to_value(),
            json!({ "x-origin": "import", "type": "null" })
        );
    }

    #[test]
    fn test_typed_keywords_outside_the_type_become_extensions() {
        let node = SchemaNode::from_value(json!({
            "anyOf": [{ "type": "null" }],
            "$defs": { "Unused": { "type": "null" } },
            "const": "text",
            "type": "integer"
        }))
        .unwrap();
        assert!(matches!(node.kind, SchemaKind::Integer(_)));
        let keys: Vec<_> = node.annotations.extensions.keys().cloned().collect();
        assert_eq!(keys, vec!["anyOf", "$defs", "const"]);
    }
}
