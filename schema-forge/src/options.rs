//! Annotation bag and kind-specific construction options.
//!
//! Every builder operation accepts an [`Annotations`] value or a kind-specific
//! [`Options`] (annotations plus constraints). Both derive serde with
//! camelCase wire keys, so a configuration may also be written as a JSON
//! object. Keys that are not recognized land in [`Annotations::extensions`]
//! and pass through to the emitted schema unchanged.
//!
//! ```rust
//! use schema_forge::StringOptions;
//!
//! let options: StringOptions = serde_json::from_value(serde_json::json!({
//!     "$id": "Email",
//!     "format": "email",
//!     "maxLength": 254,
//!     "x-sensitive": true
//! }))
//! .unwrap();
//!
//! assert_eq!(options.annotations.id.as_deref(), Some("Email"));
//! assert_eq!(options.constraints.max_length, Some(254));
//! assert!(options.annotations.extensions.contains_key("x-sensitive"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Keeps an explicit `null` as `Some(Value::Null)` instead of collapsing it.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The annotation bag carried by every node.
///
/// The identifier is written as `$id`. Unknown keys are collected into
/// `extensions` in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Registry identifier
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub examples: Option<Value>,

    /// Pass-through fields not recognized by the builder
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Annotations {
    /// Create an empty annotation bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the examples value.
    pub fn with_examples(mut self, examples: impl Into<Value>) -> Self {
        self.examples = Some(examples.into());
        self
    }

    /// Add a pass-through extension field.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// The identifier, if set and non-empty.
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Check if the bag carries nothing.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.default.is_none()
            && self.examples.is_none()
            && self.extensions.is_empty()
    }

    /// Apply `overrides` on top of this bag; the overrides win on collision.
    pub fn merge(&mut self, overrides: &Annotations) {
        if overrides.id.is_some() {
            self.id = overrides.id.clone();
        }
        if overrides.title.is_some() {
            self.title = overrides.title.clone();
        }
        if overrides.description.is_some() {
            self.description = overrides.description.clone();
        }
        if overrides.default.is_some() {
            self.default = overrides.default.clone();
        }
        if overrides.examples.is_some() {
            self.examples = overrides.examples.clone();
        }
        for (key, value) in &overrides.extensions {
            self.extensions.insert(key.clone(), value.clone());
        }
    }
}

/// `contentEncoding` values accepted on string schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEncoding {
    #[serde(rename = "7bit")]
    SevenBit,
    #[serde(rename = "8bit")]
    EightBit,
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "quoted-printable")]
    QuotedPrintable,
    #[serde(rename = "base64")]
    Base64,
}

/// Constraints of a `String` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression source; its dialect is not checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Format name, e.g. `date-time`, `email`, `uuid`, or a custom one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<ContentEncoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
}

/// Constraints of `Number` and `Integer` nodes.
///
/// Bounds are kept as JSON numbers, so integer bounds are written back as
/// integers at full precision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
}

/// A numeric bound from any integer or float. NaN and infinities have no
/// JSON form and yield `None`.
fn bound(value: impl Into<Value>) -> Option<Number> {
    match value.into() {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

/// Constraints of `Array` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

/// Constraints of `Object` and `Record` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
}

/// Constraints of `Intersect` nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unevaluated_properties: Option<bool>,
}

/// Construction options for a kind with constraints: the constraints plus
/// the annotation bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options<C> {
    #[serde(flatten)]
    pub constraints: C,
    #[serde(flatten)]
    pub annotations: Annotations,
}

pub type StringOptions = Options<StringConstraints>;
pub type NumberOptions = Options<NumberConstraints>;
pub type ArrayOptions = Options<ArrayConstraints>;
pub type ObjectOptions = Options<ObjectConstraints>;
pub type IntersectOptions = Options<IntersectConstraints>;

impl<C: Default> Options<C> {
    /// Create options with no constraints and no annotations.
    pub fn new() -> Self {
        Self {
            constraints: C::default(),
            annotations: Annotations::default(),
        }
    }
}

impl<C> Options<C> {
    /// Set the registry identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.annotations.id = Some(id.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.annotations.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.annotations.description = Some(description.into());
        self
    }

    /// Add a pass-through extension field.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.extensions.insert(key.into(), value.into());
        self
    }
}

impl<C: Default> From<Annotations> for Options<C> {
    fn from(annotations: Annotations) -> Self {
        Self {
            constraints: C::default(),
            annotations,
        }
    }
}

impl StringOptions {
    pub fn with_min_length(mut self, min: u64) -> Self {
        self.constraints.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: u64) -> Self {
        self.constraints.max_length = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.constraints.format = Some(format.into());
        self
    }
}

impl NumberOptions {
    pub fn with_minimum(mut self, minimum: impl Into<Value>) -> Self {
        self.constraints.minimum = bound(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<Value>) -> Self {
        self.constraints.maximum = bound(maximum);
        self
    }

    pub fn with_exclusive_minimum(mut self, minimum: impl Into<Value>) -> Self {
        self.constraints.exclusive_minimum = bound(minimum);
        self
    }

    pub fn with_exclusive_maximum(mut self, maximum: impl Into<Value>) -> Self {
        self.constraints.exclusive_maximum = bound(maximum);
        self
    }

    pub fn with_multiple_of(mut self, step: impl Into<Value>) -> Self {
        self.constraints.multiple_of = bound(step);
        self
    }
}

impl ArrayOptions {
    pub fn with_min_items(mut self, min: u64) -> Self {
        self.constraints.min_items = Some(min);
        self
    }

    pub fn with_max_items(mut self, max: u64) -> Self {
        self.constraints.max_items = Some(max);
        self
    }

    pub fn with_unique_items(mut self, unique: bool) -> Self {
        self.constraints.unique_items = Some(unique);
        self
    }
}

impl ObjectOptions {
    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.constraints.additional_properties = Some(allowed);
        self
    }
}

impl IntersectOptions {
    pub fn with_unevaluated_properties(mut self, allowed: bool) -> Self {
        self.constraints.unevaluated_properties = Some(allowed);
        self
    }
}
