//! Property-based tests for schema-forge
//!
//! These tests use proptest to check the structural laws of the builder:
//! requiredness derivation, transform composition, reference resolution and
//! the wire form.
