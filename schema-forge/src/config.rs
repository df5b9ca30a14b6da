//! Configuration for a builder session.
//!
//! # Example
//! ```rust
//! use schema_forge::{BuilderConfig, IdentifierPolicy, TypeBuilder};
//!
//! let config = BuilderConfig::new()
//!     .with_identifier_policy(IdentifierPolicy::Reject)
//!     .with_trace_dereference(true);
//!
//! let builder = TypeBuilder::with_config(config);
//! assert_eq!(builder.config().identifier_policy, IdentifierPolicy::Reject);
//! ```

use serde::{Deserialize, Serialize};

/// What happens when a node is registered under an identifier that is
/// already present in the session registry.
///
/// * `Overwrite` - The new node replaces the old entry (last write wins).
///   A warning is logged.
///
/// * `Reject` - The registering call fails with
///   [`SchemaError::DuplicateIdentifier`](crate::SchemaError::DuplicateIdentifier)
///   and the registry keeps the first entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Replace the existing entry.
    #[default]
    Overwrite,
    /// Fail the call and keep the existing entry.
    Reject,
}

/// Session configuration for [`TypeBuilder`](crate::TypeBuilder).
///
/// # Fields
///
/// * `identifier_policy` - Behaviour on identifier collision. Default: `Overwrite`.
///
/// * `trace_dereference` - Emit a `trace` event for every hop while following
///   reference chains. Default: false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Behaviour on identifier collision (default: Overwrite)
    pub identifier_policy: IdentifierPolicy,
    /// Trace every dereference hop (default: false)
    pub trace_dereference: bool,
}

impl BuilderConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier collision policy.
    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// Enable or disable per-hop dereference tracing.
    pub fn with_trace_dereference(mut self, enabled: bool) -> Self {
        self.trace_dereference = enabled;
        self
    }
}
