//! Static field schemas for snapshotted types.
//!
//! Instead of runtime reflection, every type that takes part in undo/redo
//! implements [`Serializable`]: a stable type name plus a static list of
//! [`FieldDescriptor`]s. serde does the actual value conversion; the
//! descriptors decide which fields are captured and let
//! [`FieldPath`](crate::path::FieldPath)s be validated up front.

use serde::de::DeserializeOwned;
use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// The shape of a declared field.
///
/// Nested kinds borrow `'static` data so whole schemas can be written as
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    Text,
    /// A nested record with its own declared fields.
    Struct(&'static [FieldDescriptor]),
    /// A sequence addressed by `[index]` path segments.
    List(&'static FieldKind),
    /// A string-keyed map addressed by `.key` path segments.
    Map(&'static FieldKind),
    /// Anything else. Paths may descend into it but are not checked further.
    Opaque,
}

impl FieldKind {
    /// Name used in path validation errors.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::Struct(_) => "struct",
            FieldKind::List(_) => "list",
            FieldKind::Map(_) => "map",
            FieldKind::Opaque => "opaque",
        }
    }
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// A single declared field: its serialized name and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The field name as it appears in the serialized form.
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Look up a descriptor by name.
pub fn find_field<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|f| f.name == name)
}

// ---------------------------------------------------------------------------
// Serializable
// ---------------------------------------------------------------------------

/// Capability implemented by every type whose state can be snapshotted,
/// diffed and patched.
///
/// `TYPE_NAME` tags snapshots and patches so that a patch computed from one
/// type is never written into another. `FIELDS` lists the captured fields;
/// serialized fields that are not declared are ignored by snapshots and left
/// untouched by patches.
///
/// ```
/// use retrace_diff::schema::{FieldDescriptor, FieldKind, Serializable};
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Spline { points: Vec<f32>, closed: bool }
///
/// impl Serializable for Spline {
///     const TYPE_NAME: &'static str = "spline";
///     const FIELDS: &'static [FieldDescriptor] = &[
///         FieldDescriptor::new("points", FieldKind::List(&FieldKind::Float)),
///         FieldDescriptor::new("closed", FieldKind::Bool),
///     ];
/// }
/// ```
pub trait Serializable: Serialize + DeserializeOwned + 'static {
    /// Stable name of the type, unique among registered types.
    const TYPE_NAME: &'static str;
    /// Declared fields, in capture order.
    const FIELDS: &'static [FieldDescriptor];
}
