//! Schema Forge
//!
//! Build JSON-Schema-like schema trees in memory, derive new object schemas
//! from existing ones, and resolve named and recursive references.
//!
//! ```rust
//! use schema_forge::{Annotations, NumberOptions, ObjectOptions, StringOptions, TypeBuilder};
//!
//! # fn main() -> schema_forge::SchemaResult<()> {
//! let mut t = TypeBuilder::new();
//!
//! let id = t.integer(NumberOptions::new().with_minimum(1))?;
//! let email = t.string(StringOptions::new().with_format("email"))?;
//! let user = t.object(
//!     [("id", id), ("email", t.optional(&email))],
//!     ObjectOptions::new().with_id("User"),
//! )?;
//!
//! let user_ref = t.ref_schema(&user)?;
//! let contact = t.pick(&user_ref, &["email"], ObjectOptions::new().with_id("Contact"))?;
//! let keys = t.key_of(&user_ref, Annotations::new())?;
//!
//! assert_eq!(contact.properties().map(|p| p.len()), Some(1));
//! assert_eq!(keys.to_value()["enum"], serde_json::json!(["id", "email"]));
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
mod node;
mod options;
mod reference;
mod registry;
mod transform;
mod wire;

#[cfg(test)]
mod tests;

pub use builder::{TypeBuilder, ANY_STRING_PATTERN, NUMBER_KEY_PATTERN};
pub use config::{BuilderConfig, IdentifierPolicy};
pub use error::{ErrorCode, SchemaError, SchemaResult};
pub use node::{
    required_names, split_ref_path, EnumMember, LiteralValue, Modifier, SchemaKind, SchemaNode,
    DEFS_SEPARATOR, SELF_KEY,
};
pub use options::{
    Annotations, ArrayConstraints, ArrayOptions, ContentEncoding, IntersectConstraints,
    IntersectOptions, NumberConstraints, NumberOptions, ObjectConstraints, ObjectOptions, Options,
    StringConstraints, StringOptions,
};
pub use registry::Registry;
