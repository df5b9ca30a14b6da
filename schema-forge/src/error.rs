//! Error types for schema construction and resolution.
//!
//! Every fallible operation in this crate returns [`SchemaResult`]. Errors are
//! raised synchronously at the violating call: construction-time for builder
//! misuse, resolution-time for reference lookups. Nothing is retried and a
//! failed call registers nothing.
//!
//! # Error Codes
//!
//! [`SchemaError`] carries the context of a failure (identifier, path, kind).
//! [`ErrorCode`] is its payload-free counterpart, serialized as
//! SCREAMING_SNAKE_CASE strings.
//!
//! # Example
//! ```rust
//! use schema_forge::{ErrorCode, SchemaError};
//!
//! let error = SchemaError::UnresolvedReference { path: "User".into() };
//! assert_eq!(error.code(), ErrorCode::UnresolvedReference);
//! assert_eq!(error.code().as_str(), "UNRESOLVED_REFERENCE");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Payload-free error codes, one per [`SchemaError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Construction errors
    /// A literal value was not a string, number or boolean
    InvalidLiteral,
    /// An enumeration member was not a string or number
    InvalidEnumValue,
    /// A record key schema cannot be turned into a property pattern
    InvalidRecordKey,
    /// An identifier collided with an existing registry entry
    DuplicateIdentifier,

    // Reference errors
    /// A referenced namespace has no identifier
    MissingNamespaceId,
    /// A referenced namespace identifier is not registered
    UnknownNamespace,
    /// A referenced schema has no identifier
    MissingSchemaId,
    /// A referenced schema identifier is not registered
    UnknownSchema,
    /// A reference path could not be resolved
    UnresolvedReference,
    /// A reference chain loops without reaching a concrete node
    CyclicReference,
    /// A structural transform resolved to a node that is not an Object
    ExpectedObject,

    // Wire errors
    /// A wire document could not be turned back into a node
    InvalidWireFormat,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidLiteral => "INVALID_LITERAL",
            Self::InvalidEnumValue => "INVALID_ENUM_VALUE",
            Self::InvalidRecordKey => "INVALID_RECORD_KEY",
            Self::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            Self::MissingNamespaceId => "MISSING_NAMESPACE_ID",
            Self::UnknownNamespace => "UNKNOWN_NAMESPACE",
            Self::MissingSchemaId => "MISSING_SCHEMA_ID",
            Self::UnknownSchema => "UNKNOWN_SCHEMA",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::CyclicReference => "CYCLIC_REFERENCE",
            Self::ExpectedObject => "EXPECTED_OBJECT",
            Self::InvalidWireFormat => "INVALID_WIRE_FORMAT",
        }
    }

    /// Returns true for errors raised while following references.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            Self::MissingNamespaceId
                | Self::UnknownNamespace
                | Self::MissingSchemaId
                | Self::UnknownSchema
                | Self::UnresolvedReference
                | Self::CyclicReference
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by the builder, the transforms and the resolver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("literal value must be a string, number or boolean, got {found}")]
    InvalidLiteral { found: String },

    #[error("enum member '{key}' must be a string or number, got {found}")]
    InvalidEnumValue { key: String, found: String },

    #[error("record key must be a String, Number, KeyOf or Union of literals, got {kind}")]
    InvalidRecordKey { kind: String },

    #[error("identifier '{id}' is already registered")]
    DuplicateIdentifier { id: String },

    #[error("referenced namespace has no $id")]
    MissingNamespaceId,

    #[error("unable to locate namespace with $id '{id}'")]
    UnknownNamespace { id: String },

    #[error("referenced schema has no $id")]
    MissingSchemaId,

    #[error("unable to locate schema with $id '{id}'")]
    UnknownSchema { id: String },

    #[error("unable to resolve reference '{path}'")]
    UnresolvedReference { path: String },

    #[error("reference '{path}' is cyclic")]
    CyclicReference { path: String },

    #[error("expected an Object schema, got {kind}")]
    ExpectedObject { kind: String },

    #[error("invalid wire format: {message}")]
    InvalidWireFormat { message: String },
}

impl SchemaError {
    /// Returns the payload-free code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidLiteral { .. } => ErrorCode::InvalidLiteral,
            Self::InvalidEnumValue { .. } => ErrorCode::InvalidEnumValue,
            Self::InvalidRecordKey { .. } => ErrorCode::InvalidRecordKey,
            Self::DuplicateIdentifier { .. } => ErrorCode::DuplicateIdentifier,
            Self::MissingNamespaceId => ErrorCode::MissingNamespaceId,
            Self::UnknownNamespace { .. } => ErrorCode::UnknownNamespace,
            Self::MissingSchemaId => ErrorCode::MissingSchemaId,
            Self::UnknownSchema { .. } => ErrorCode::UnknownSchema,
            Self::UnresolvedReference { .. } => ErrorCode::UnresolvedReference,
            Self::CyclicReference { .. } => ErrorCode::CyclicReference,
            Self::ExpectedObject { .. } => ErrorCode::ExpectedObject,
            Self::InvalidWireFormat { .. } => ErrorCode::InvalidWireFormat,
        }
    }

    /// Create an INVALID_WIRE_FORMAT error.
    pub fn wire(message: impl Into<String>) -> Self {
        Self::InvalidWireFormat {
            message: message.into(),
        }
    }

    /// Create an UNRESOLVED_REFERENCE error.
    pub fn unresolved(path: impl Into<String>) -> Self {
        Self::UnresolvedReference { path: path.into() }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::wire(format!("JSON error: {}", err))
    }
}

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
