//! Type-tagged captures of an object's declared fields.
//!
//! A [`Snapshot`] is taken when an edit is recorded and again when it is
//! resolved. Both captures are immutable; the diff engine compares them
//! field by field. Each snapshot carries a BLAKE3 digest of its contents so
//! that "nothing changed" can be detected without walking the fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{FieldDescriptor, Serializable};
use crate::{json_kind, DiffError};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable capture of an object's declared field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    type_name: String,
    /// Field name to serialized value. `BTreeMap` keeps the order stable.
    fields: BTreeMap<String, Value>,
    /// BLAKE3 hex digest of `type_name` + `fields`.
    hash: String,
}

impl Snapshot {
    /// Capture the declared fields of `value`.
    ///
    /// Fails with [`DiffError::NotAnObject`] if `T` does not serialize to a
    /// JSON object and with [`DiffError::MissingField`] if a declared field
    /// is absent from the serialized form.
    pub fn capture<T: Serializable>(value: &T) -> Result<Self, DiffError> {
        let raw = serde_json::to_value(value).map_err(|e| DiffError::Serialization {
            type_name: T::TYPE_NAME.to_owned(),
            details: e.to_string(),
        })?;
        Self::from_value(T::TYPE_NAME, T::FIELDS, raw)
    }

    /// Capture from an already serialized value.
    ///
    /// This is the type-erased entry point used by registries that only hold
    /// a type name and its descriptors.
    pub fn from_value(
        type_name: &str,
        declared: &[FieldDescriptor],
        value: Value,
    ) -> Result<Self, DiffError> {
        let Value::Object(mut map) = value else {
            return Err(DiffError::NotAnObject {
                type_name: type_name.to_owned(),
                found: json_kind(&value),
            });
        };

        let mut fields = BTreeMap::new();
        for descriptor in declared {
            let field = map
                .remove(descriptor.name)
                .ok_or_else(|| DiffError::MissingField {
                    type_name: type_name.to_owned(),
                    field: descriptor.name.to_owned(),
                })?;
            fields.insert(descriptor.name.to_owned(), field);
        }
        Ok(Self::from_fields(type_name.to_owned(), fields))
    }

    pub(crate) fn from_fields(type_name: String, fields: BTreeMap<String, Value>) -> Self {
        let hash = compute_hash(&type_name, &fields);
        Self {
            type_name,
            fields,
            hash,
        }
    }

    /// The type tag this snapshot was captured from.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// BLAKE3 hex digest (64 lowercase hex chars) of the captured state.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// `true` if both snapshots have the same type and identical contents.
    pub fn same_state(&self, other: &Snapshot) -> bool {
        self.type_name == other.type_name && self.hash == other.hash
    }

    /// The captured fields as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Overwrite every captured field of `target` with the captured value.
    ///
    /// Fields of `target` that were not captured keep their current values.
    pub fn restore<T: Serializable>(&self, target: &mut T) -> Result<(), DiffError> {
        self.check_type(T::TYPE_NAME)?;
        let mut current = to_json(target)?;
        let found = json_kind(&current);
        let Some(map) = current.as_object_mut() else {
            return Err(DiffError::NotAnObject {
                type_name: T::TYPE_NAME.to_owned(),
                found,
            });
        };
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.clone());
        }
        *target = from_json(current)?;
        Ok(())
    }

    /// Fail with [`DiffError::TypeMismatch`] unless this snapshot was taken
    /// from `type_name`.
    pub fn check_type(&self, type_name: &str) -> Result<(), DiffError> {
        if self.type_name != type_name {
            return Err(DiffError::TypeMismatch {
                expected: self.type_name.clone(),
                found: type_name.to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn to_json<T: Serializable>(value: &T) -> Result<Value, DiffError> {
    serde_json::to_value(value).map_err(|e| DiffError::Serialization {
        type_name: T::TYPE_NAME.to_owned(),
        details: e.to_string(),
    })
}

pub(crate) fn from_json<T: Serializable>(value: Value) -> Result<T, DiffError> {
    serde_json::from_value(value).map_err(|e| DiffError::Serialization {
        type_name: T::TYPE_NAME.to_owned(),
        details: e.to_string(),
    })
}

fn compute_hash(type_name: &str, fields: &BTreeMap<String, Value>) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        type_name: &'a str,
        fields: &'a BTreeMap<String, Value>,
    }

    let json_bytes = serde_json::to_vec(&HashableState { type_name, fields })
        .expect("snapshot fields are JSON values and always serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Camera {
        fov: f32,
        name: String,
        /// Runtime-only cache, not declared.
        frame_count: u64,
    }

    impl Serializable for Camera {
        const TYPE_NAME: &'static str = "camera";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("fov", FieldKind::Float),
            FieldDescriptor::new("name", FieldKind::Text),
        ];
    }

    fn camera() -> Camera {
        Camera {
            fov: 60.0,
            name: "main".into(),
            frame_count: 3,
        }
    }

    #[test]
    fn capture_keeps_only_declared_fields() {
        let snap = Snapshot::capture(&camera()).unwrap();
        assert_eq!(snap.type_name(), "camera");
        assert_eq!(snap.fields().len(), 2);
        assert_eq!(snap.field("fov"), Some(&json!(60.0)));
        assert!(snap.field("frame_count").is_none());
        assert_eq!(snap.hash().len(), 64);
    }

    #[test]
    fn identical_state_has_identical_hash() {
        let a = Snapshot::capture(&camera()).unwrap();
        let mut other = camera();
        other.frame_count = 99;
        let b = Snapshot::capture(&other).unwrap();
        assert!(
            a.same_state(&b),
            "undeclared fields must not affect the hash"
        );

        other.fov = 75.0;
        let c = Snapshot::capture(&other).unwrap();
        assert!(!a.same_state(&c));
    }

    #[test]
    fn from_value_rejects_non_objects_and_missing_fields() {
        let err = Snapshot::from_value("camera", Camera::FIELDS, json!(3)).unwrap_err();
        assert!(matches!(err, DiffError::NotAnObject { found: "number", .. }));

        let err =
            Snapshot::from_value("camera", Camera::FIELDS, json!({ "fov": 1.0 })).unwrap_err();
        assert_eq!(
            err,
            DiffError::MissingField {
                type_name: "camera".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn restore_overwrites_captured_fields_only() {
        let snap = Snapshot::capture(&camera()).unwrap();
        let mut cam = Camera {
            fov: 10.0,
            name: "other".into(),
            frame_count: 42,
        };
        snap.restore(&mut cam).unwrap();
        assert_eq!(cam.fov, 60.0);
        assert_eq!(cam.name, "main");
        assert_eq!(cam.frame_count, 42);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = Snapshot::capture(&camera()).unwrap();
        let text = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);
    }
}
