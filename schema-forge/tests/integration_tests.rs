//! Integration tests for schema-forge.
//!
//! These tests drive the public API end to end: building, deriving,
//! referencing and normalizing schemas within one session.

use serde_json::json;

use schema_forge::{
    Annotations, ArrayOptions, BuilderConfig, ErrorCode, IdentifierPolicy, Modifier,
    NumberOptions, ObjectOptions, SchemaError, SchemaKind, SchemaNode, StringOptions, TypeBuilder,
};

/// `User { id, name, email?, createdAt (readonly) }`, registered as `User`.
fn user(t: &mut TypeBuilder) -> SchemaNode {
    let id = t.integer(NumberOptions::new().with_minimum(1)).unwrap();
    let name = t.string(StringOptions::new().with_min_length(1)).unwrap();
    let email = t.string(StringOptions::new().with_format("email")).unwrap();
    let created_at = t.string(StringOptions::new().with_format("date-time")).unwrap();
    t.object(
        [
            ("id", id),
            ("name", name),
            ("email", t.optional(&email)),
            ("createdAt", t.readonly(&created_at)),
        ],
        ObjectOptions::new().with_id("User"),
    )
    .unwrap()
}

fn names(node: &SchemaNode) -> Vec<&str> {
    node.properties()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect()
}

// =============================================================================
// Transforms
// =============================================================================

#[test]
fn test_transforms_through_reference() {
    let mut t = TypeBuilder::new();
    let user = user(&mut t);
    let user_ref = t.ref_schema(&user).unwrap();

    let summary = t
        .pick(&user_ref, &["id", "name"], ObjectOptions::new().with_id("UserSummary"))
        .unwrap();
    assert_eq!(names(&summary), vec!["id", "name"]);
    assert_eq!(summary.to_value()["required"], json!(["id", "name"]));

    let update = t
        .partial(&user_ref, ObjectOptions::new().with_id("UserUpdate"))
        .unwrap();
    assert!(update.to_value().get("required").is_none());
    assert_eq!(
        update.properties().unwrap()["createdAt"].modifier,
        Modifier::ReadonlyOptional
    );

    let keys = t.key_of(&user_ref, Annotations::new()).unwrap();
    assert_eq!(
        keys.to_value(),
        json!({ "type": "string", "enum": ["id", "name", "email", "createdAt"] })
    );

    assert_eq!(t.registry().get("User"), Some(&user));
    let ids: Vec<_> = t.registry().ids().collect();
    assert_eq!(ids, vec!["User", "UserSummary", "UserUpdate"]);
}

#[test]
fn test_transform_without_new_identifier_replaces_source() {
    let mut t = TypeBuilder::new();
    let user = user(&mut t);

    let reduced = t.omit(&user, &["email"], ObjectOptions::new()).unwrap();
    assert_eq!(reduced.id(), Some("User"));
    assert_eq!(t.registry().get("User"), Some(&reduced));
}

#[test]
fn test_transform_collision_under_reject_policy() {
    let config = BuilderConfig::new().with_identifier_policy(IdentifierPolicy::Reject);
    let mut t = TypeBuilder::with_config(config);
    let user = user(&mut t);

    let err = t.omit(&user, &["email"], ObjectOptions::new()).unwrap_err();
    assert_eq!(err, SchemaError::DuplicateIdentifier { id: "User".into() });
    assert_eq!(t.registry().get("User"), Some(&user));

    let renamed = t
        .omit(&user, &["email"], ObjectOptions::new().with_id("UserNoEmail"))
        .unwrap();
    assert_eq!(t.registry().get("UserNoEmail"), Some(&renamed));
}

#[test]
fn test_pick_through_unregistered_reference() {
    let mut t = TypeBuilder::new();
    let dangling = SchemaNode::reference("Account");

    let err = t.pick(&dangling, &["id"], ObjectOptions::new()).unwrap_err();
    assert_eq!(err, SchemaError::UnresolvedReference { path: "Account".into() });
    assert!(err.code().is_reference_error());
    assert!(t.registry().is_empty());
}

// =============================================================================
// Namespaces and References
// =============================================================================

#[test]
fn test_namespace_reference() {
    let mut t = TypeBuilder::new();
    let x = t.number(NumberOptions::new()).unwrap();
    let y = t.number(NumberOptions::new()).unwrap();
    let point = t
        .object([("x", x), ("y", y)], ObjectOptions::new())
        .unwrap();
    let shapes = t
        .namespace([("Point", point.clone())], Annotations::new().with_id("Shapes"))
        .unwrap();

    let point_ref = t.ref_namespace(&shapes, "Point").unwrap();
    assert_eq!(point_ref.to_value(), json!({ "$ref": "Shapes#/$defs/Point" }));
    assert_eq!(t.dereference(&point_ref).unwrap(), &point);

    let line = t
        .object(
            [("from", point_ref.clone()), ("to", point_ref.clone())],
            ObjectOptions::new(),
        )
        .unwrap();
    assert_eq!(line.required().unwrap().len(), 2);

    let keys = t.key_of(&point_ref, Annotations::new()).unwrap();
    assert_eq!(keys.kind, SchemaKind::KeyOf(vec!["x".into(), "y".into()]));
}

#[test]
fn test_namespace_missing_definition() {
    let mut t = TypeBuilder::new();
    let shapes = t
        .namespace(Vec::<(String, SchemaNode)>::new(), Annotations::new().with_id("Shapes"))
        .unwrap();

    let circle = t.ref_namespace(&shapes, "Circle").unwrap();
    let err = t.dereference(&circle).unwrap_err();
    assert_eq!(err.to_string(), "unable to resolve reference 'Shapes#/$defs/Circle'");
}

#[test]
fn test_reference_errors() {
    let mut t = TypeBuilder::new();
    let anonymous = t.boolean(Annotations::new()).unwrap();
    assert_eq!(t.ref_schema(&anonymous).unwrap_err().code(), ErrorCode::MissingSchemaId);

    let ns = t
        .namespace(Vec::<(String, SchemaNode)>::new(), Annotations::new())
        .unwrap();
    assert_eq!(
        t.ref_namespace(&ns, "k").unwrap_err().code(),
        ErrorCode::MissingNamespaceId
    );

    let other_session = {
        let mut other = TypeBuilder::new();
        other.boolean(Annotations::new().with_id("Flag")).unwrap()
    };
    assert_eq!(
        t.ref_schema(&other_session).unwrap_err(),
        SchemaError::UnknownSchema { id: "Flag".into() }
    );
}

#[test]
fn test_cyclic_namespace_references() {
    let config = BuilderConfig::new().with_trace_dereference(true);
    let mut t = TypeBuilder::with_config(config);
    let ns = t
        .namespace(
            [
                ("A", SchemaNode::reference("Loop#/$defs/B")),
                ("B", SchemaNode::reference("Loop#/$defs/A")),
            ],
            Annotations::new().with_id("Loop"),
        )
        .unwrap();

    let a = t.ref_namespace(&ns, "A").unwrap();
    let err = t.dereference(&a).unwrap_err();
    assert_eq!(err, SchemaError::CyclicReference { path: "Loop#/$defs/A".into() });
}

// =============================================================================
// Recursive Types
// =============================================================================

#[test]
fn test_recursive_tree() {
    let mut t = TypeBuilder::new();
    let node = t
        .rec(
            |t, this| {
                let label = t.string(StringOptions::new())?;
                let children = t.array(this, ArrayOptions::new())?;
                t.object(
                    [("label", label), ("children", children)],
                    ObjectOptions::new(),
                )
            },
            Annotations::new().with_id("Tree"),
        )
        .unwrap();

    assert_eq!(t.registry().get("Tree"), Some(&node));

    let body = t.dereference(&node).unwrap();
    let children = &body.properties().unwrap()["children"];
    let SchemaKind::Array { items, .. } = &children.kind else {
        panic!("expected array");
    };
    assert_eq!(t.dereference(items).unwrap(), body);
    assert_eq!(node.resolve_local(items.ref_path().unwrap()), Some(body));

    let forest = t
        .pick(&node, &["children"], ObjectOptions::new().with_id("Forest"))
        .unwrap();
    assert_eq!(names(&forest), vec!["children"]);
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn test_record_key_patterns() {
    let mut t = TypeBuilder::new();
    let value = t.boolean(Annotations::new()).unwrap();

    let pattern = |node: &SchemaNode| match &node.kind {
        SchemaKind::Record { pattern, .. } => pattern.clone(),
        other => panic!("expected record, got {}", other.name()),
    };

    let key = t.string(StringOptions::new()).unwrap();
    let record = t.record(&key, value.clone(), ObjectOptions::new()).unwrap();
    assert_eq!(pattern(&record), "^.*$");

    let key = t.number(NumberOptions::new()).unwrap();
    let record = t.record(&key, value.clone(), ObjectOptions::new()).unwrap();
    assert_eq!(pattern(&record), "^(0|[1-9][0-9]*)$");

    let a = t.literal("a", Annotations::new()).unwrap();
    let b = t.literal("b", Annotations::new()).unwrap();
    let key = t.union(vec![a, b], Annotations::new()).unwrap();
    let record = t.record(&key, value.clone(), ObjectOptions::new()).unwrap();
    assert_eq!(pattern(&record), "^a|b$");

    let user = user(&mut t);
    let key = t.key_of(&user, Annotations::new()).unwrap();
    let record = t.record(&key, value.clone(), ObjectOptions::new()).unwrap();
    assert_eq!(pattern(&record), "^id|name|email|createdAt$");

    let regex = regex::Regex::new("^[A-Z]{2}$").unwrap();
    let key = t.regex(&regex, Annotations::new()).unwrap();
    let record = t.record(&key, value.clone(), ObjectOptions::new()).unwrap();
    assert_eq!(pattern(&record), "^[A-Z]{2}$");

    let key = t.boolean(Annotations::new()).unwrap();
    let err = t.record(&key, value, ObjectOptions::new()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRecordKey);
}

// =============================================================================
// Identifier Policy
// =============================================================================

#[test]
fn test_default_policy_overwrites() {
    let mut t = TypeBuilder::new();
    t.string(StringOptions::new().with_id("Id")).unwrap();
    let replacement = t.integer(NumberOptions::new().with_id("Id")).unwrap();

    assert_eq!(t.registry().len(), 1);
    assert_eq!(t.registry().get("Id"), Some(&replacement));
}

#[test]
fn test_reject_policy() {
    let config = BuilderConfig::new().with_identifier_policy(IdentifierPolicy::Reject);
    let mut t = TypeBuilder::with_config(config);
    let original = t.string(StringOptions::new().with_id("Id")).unwrap();

    let err = t.integer(NumberOptions::new().with_id("Id")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateIdentifier);
    assert_eq!(t.registry().get("Id"), Some(&original));
}

#[test]
fn test_sessions_are_independent() {
    let mut first = TypeBuilder::new();
    let second = TypeBuilder::new();
    user(&mut first);

    assert!(first.registry().contains("User"));
    assert!(!second.registry().contains("User"));
}

// =============================================================================
// Strict
// =============================================================================

#[test]
fn test_strict_output_is_wire_portable() {
    let mut t = TypeBuilder::new();
    let user = user(&mut t);
    let wrapped = t.readonly_optional(&user);

    let strict = t.strict(&wrapped, Annotations::new().with_title("User"));

    assert_eq!(strict.modifier, Modifier::None);
    assert_eq!(strict.annotations.title.as_deref(), Some("User"));
    assert_eq!(
        strict.properties().unwrap()["createdAt"].modifier,
        Modifier::None
    );

    let mut expected = user.to_value();
    expected["title"] = json!("User");
    assert_eq!(strict.to_value(), expected);
}

#[test]
fn test_wire_document_drives_builder() {
    let mut t = TypeBuilder::new();
    let node: SchemaNode = serde_json::from_value(json!({
        "$id": "Tag",
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "color": { "type": "string", "pattern": "^#[0-9a-f]{6}$" }
        },
        "required": ["name"]
    }))
    .unwrap();

    let node = t.strict(&node, Annotations::new());
    let full = t
        .required(&node, ObjectOptions::new().with_id("FullTag"))
        .unwrap();
    assert_eq!(full.to_value()["required"], json!(["name", "color"]));
}
