//! Retrace Diff -- snapshot capture and field-level diffing for undo/redo.
//!
//! This crate is the leaf of the Retrace workspace. It knows nothing about
//! scenes or undo stacks; it only turns values into type-tagged
//! [`Snapshot`](snapshot::Snapshot)s and compares two snapshots of the same
//! type into a sparse [`Patch`](patch::Patch).
//!
//! # Modules
//!
//! - [`schema`]: the [`Serializable`](schema::Serializable) capability trait
//!   and the static field descriptors every snapshotted type declares.
//! - [`path`]: parsed, validated [`FieldPath`](path::FieldPath)s such as
//!   `position.x` or `points[2].y`.
//! - [`snapshot`]: immutable, hashed captures of an object's declared fields.
//! - [`patch`]: the diff engine. Produces forward/backward patches and applies
//!   them to typed values or raw JSON.
//!
//! # Example
//!
//! ```
//! use retrace_diff::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Light { intensity: f32, enabled: bool }
//!
//! impl Serializable for Light {
//!     const TYPE_NAME: &'static str = "light";
//!     const FIELDS: &'static [FieldDescriptor] = &[
//!         FieldDescriptor::new("intensity", FieldKind::Float),
//!         FieldDescriptor::new("enabled", FieldKind::Bool),
//!     ];
//! }
//!
//! let mut light = Light { intensity: 1.0, enabled: true };
//! let before = Snapshot::capture(&light).unwrap();
//! light.intensity = 4.0;
//! let after = Snapshot::capture(&light).unwrap();
//!
//! let pair = DiffPair::between(&before, &after).unwrap();
//! assert!(pair.forward.is_changed("intensity"));
//! assert!(!pair.forward.is_changed("enabled"));
//!
//! pair.backward.apply(&mut light).unwrap();
//! assert_eq!(light.intensity, 1.0);
//! ```

#![deny(unsafe_code)]

pub mod patch;
pub mod path;
pub mod schema;
pub mod snapshot;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by snapshot capture, diffing and patch application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    /// The value did not serialize to a JSON object, so it has no fields.
    #[error("type '{type_name}' does not serialize to a structured object (got {found})")]
    NotAnObject {
        type_name: String,
        found: &'static str,
    },

    /// A declared field was absent from the serialized form.
    #[error("type '{type_name}' declares field '{field}' but its serialized form does not contain it")]
    MissingField { type_name: String, field: String },

    /// A patch or snapshot was used against a value of a different type.
    #[error("state captured from '{expected}' cannot be applied to '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// A field path failed to parse or does not match the declared schema.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A field path was well formed but did not resolve inside the value.
    #[error("field path '{path}' does not resolve in the target value")]
    PathNotFound { path: String },

    /// serde failed to convert between the typed value and JSON.
    #[error("failed to convert '{type_name}' to or from JSON: {details}")]
    Serialization { type_name: String, details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::patch::{DiffPair, FieldChange, Patch};
    pub use crate::path::{FieldPath, PathSegment};
    pub use crate::schema::{FieldDescriptor, FieldKind, Serializable};
    pub use crate::snapshot::Snapshot;
    pub use crate::DiffError;
}

/// Short human-readable name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
