//! The diff engine.
//!
//! [`Patch::between`] compares two [`Snapshot`]s of the same type and
//! records, for every leaf that differs, the path and the value it should
//! take. Nested objects are compared key by key and equal-length arrays
//! element by element; anything else that differs is replaced whole.
//!
//! Patches are sparse: applying one writes only the recorded paths, so two
//! patches touching disjoint fields compose in either order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::FieldPath;
use crate::schema::Serializable;
use crate::snapshot::{from_json, to_json, Snapshot};
use crate::DiffError;

// ---------------------------------------------------------------------------
// FieldChange
// ---------------------------------------------------------------------------

/// A single leaf-level change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub path: FieldPath,
    /// The value to write, or `None` if the map key at `path` is removed.
    pub value: Option<Value>,
}

impl FieldChange {
    fn set(path: FieldPath, value: &Value) -> Self {
        Self {
            path,
            value: Some(value.clone()),
        }
    }

    fn remove(path: FieldPath) -> Self {
        Self { path, value: None }
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A one-directional, type-tagged diff between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    type_name: String,
    /// Top-level fields touched by at least one change.
    changed_fields: BTreeSet<String>,
    changes: Vec<FieldChange>,
}

impl Patch {
    /// Compute the patch that turns `old` into `new`.
    pub fn between(old: &Snapshot, new: &Snapshot) -> Result<Self, DiffError> {
        old.check_type(new.type_name())?;

        let mut changes = Vec::new();
        let mut changed_fields = BTreeSet::new();

        if !old.same_state(new) {
            for (name, new_value) in new.fields() {
                let before = changes.len();
                let path = FieldPath::field(name.as_str());
                match old.field(name) {
                    Some(old_value) => diff_value(path, old_value, new_value, &mut changes),
                    None => changes.push(FieldChange::set(path, new_value)),
                }
                if changes.len() > before {
                    changed_fields.insert(name.clone());
                }
            }
            for name in old.fields().keys() {
                if new.field(name).is_none() {
                    changes.push(FieldChange::remove(FieldPath::field(name.as_str())));
                    changed_fields.insert(name.clone());
                }
            }
        }

        Ok(Self {
            type_name: old.type_name().to_owned(),
            changed_fields,
            changes,
        })
    }

    /// `true` iff no field is flagged as changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Names of the top-level fields this patch writes.
    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.changed_fields.iter().map(String::as_str)
    }

    /// `true` if the top-level field `name` is flagged.
    pub fn is_changed(&self, name: &str) -> bool {
        self.changed_fields.contains(name)
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Write the flagged fields into `target`.
    ///
    /// Fails with [`DiffError::TypeMismatch`] before touching `target` if the
    /// patch was computed from a different type.
    pub fn apply<T: Serializable>(&self, target: &mut T) -> Result<(), DiffError> {
        self.check_type(T::TYPE_NAME)?;
        if self.is_empty() {
            return Ok(());
        }
        let mut value = to_json(target)?;
        self.apply_to_value(&mut value)?;
        *target = from_json(value)?;
        Ok(())
    }

    /// Write the flagged paths into a serialized value.
    ///
    /// Either every change is written or, on error, `root` is left as it was.
    pub fn apply_to_value(&self, root: &mut Value) -> Result<(), DiffError> {
        let mut scratch = root.clone();
        for change in &self.changes {
            match &change.value {
                Some(value) => change.path.set(&mut scratch, value.clone())?,
                None => {
                    change.path.remove(&mut scratch)?;
                }
            }
        }
        *root = scratch;
        Ok(())
    }

    /// Produce the snapshot that results from applying this patch to `base`.
    pub fn apply_to_snapshot(&self, base: &Snapshot) -> Result<Snapshot, DiffError> {
        base.check_type(&self.type_name)?;
        let mut value = base.to_value();
        self.apply_to_value(&mut value)?;
        let fields: BTreeMap<String, Value> = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Ok(Snapshot::from_fields(self.type_name.clone(), fields))
    }

    /// Fail with [`DiffError::TypeMismatch`] unless this patch was computed
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

/// Recursive leaf comparison. Pushes one change per differing leaf.
fn diff_value(path: FieldPath, old: &Value, new: &Value, out: &mut Vec<FieldChange>) {
    if old == new {
        return;
    }
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for (key, new_item) in new_map {
                match old_map.get(key) {
                    Some(old_item) => diff_value(path.child(key.as_str()), old_item, new_item, out),
                    None => out.push(FieldChange::set(path.child(key.as_str()), new_item)),
                }
            }
            for key in old_map.keys() {
                if !new_map.contains_key(key) {
                    out.push(FieldChange::remove(path.child(key.as_str())));
                }
            }
        }
        (Value::Array(old_items), Value::Array(new_items))
            if old_items.len() == new_items.len() =>
        {
            for (i, (old_item, new_item)) in old_items.iter().zip(new_items).enumerate() {
                diff_value(path.index(i), old_item, new_item, out);
            }
        }
        _ => out.push(FieldChange::set(path, new)),
    }
}

// ---------------------------------------------------------------------------
// DiffPair
// ---------------------------------------------------------------------------

/// The forward (old to new) and backward (new to old) patches of one edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffPair {
    pub forward: Patch,
    pub backward: Patch,
}

impl DiffPair {
    pub fn between(old: &Snapshot, new: &Snapshot) -> Result<Self, DiffError> {
        Ok(Self {
            forward: Patch::between(old, new)?,
            backward: Patch::between(new, old)?,
        })
    }

    /// `true` if the edit changed nothing.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKind};
    use std::collections::BTreeMap as Map;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Vec2 {
        x: f32,
        y: f32,
    }

    const VEC2: &[FieldDescriptor] = &[
        FieldDescriptor::new("x", FieldKind::Float),
        FieldDescriptor::new("y", FieldKind::Float),
    ];

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Body {
        mass: f32,
        velocity: Vec2,
        path: Vec<Vec2>,
        labels: Map<String, String>,
    }

    impl Serializable for Body {
        const TYPE_NAME: &'static str = "body";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("mass", FieldKind::Float),
            FieldDescriptor::new("velocity", FieldKind::Struct(VEC2)),
            FieldDescriptor::new("path", FieldKind::List(&FieldKind::Struct(VEC2))),
            FieldDescriptor::new("labels", FieldKind::Map(&FieldKind::Text)),
        ];
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Other {
        mass: f32,
    }

    impl Serializable for Other {
        const TYPE_NAME: &'static str = "other";
        const FIELDS: &'static [FieldDescriptor] =
            &[FieldDescriptor::new("mass", FieldKind::Float)];
    }

    fn body() -> Body {
        Body {
            mass: 1.0,
            velocity: Vec2 { x: 0.0, y: 0.0 },
            path: vec![Vec2 { x: 0.0, y: 0.0 }, Vec2 { x: 1.0, y: 1.0 }],
            labels: Map::from([("team".to_owned(), "red".to_owned())]),
        }
    }

    // -- 1. Empty diffs -----------------------------------------------------

    #[test]
    fn identical_snapshots_produce_empty_patch() {
        let a = Snapshot::capture(&body()).unwrap();
        let b = Snapshot::capture(&body()).unwrap();
        let pair = DiffPair::between(&a, &b).unwrap();
        assert!(pair.is_empty());
        assert!(pair.backward.is_empty());
        assert_eq!(pair.forward.changed_fields().count(), 0);
    }

    // -- 2. Recursive leaf changes ------------------------------------------

    #[test]
    fn nested_change_records_only_the_leaf() {
        let old = body();
        let mut new = body();
        new.velocity.y = 3.0;
        new.path[1].x = 9.0;

        let patch = Patch::between(
            &Snapshot::capture(&old).unwrap(),
            &Snapshot::capture(&new).unwrap(),
        )
        .unwrap();

        let paths: Vec<String> = patch.changes().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, vec!["path[1].x", "velocity.y"]);
        assert!(patch.is_changed("velocity"));
        assert!(patch.is_changed("path"));
        assert!(!patch.is_changed("mass"));
    }

    #[test]
    fn resized_array_is_replaced_whole() {
        let old = body();
        let mut new = body();
        new.path.push(Vec2 { x: 2.0, y: 2.0 });

        let patch = Patch::between(
            &Snapshot::capture(&old).unwrap(),
            &Snapshot::capture(&new).unwrap(),
        )
        .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.changes()[0].path.to_string(), "path");
    }

    #[test]
    fn map_keys_added_and_removed() {
        let old = body();
        let mut new = body();
        new.labels.remove("team");
        new.labels.insert("role".into(), "tank".into());

        let pair = DiffPair::between(
            &Snapshot::capture(&old).unwrap(),
            &Snapshot::capture(&new).unwrap(),
        )
        .unwrap();

        let mut target = old.clone();
        pair.forward.apply(&mut target).unwrap();
        assert_eq!(target, new);
        pair.backward.apply(&mut target).unwrap();
        assert_eq!(target, old);
    }

    // -- 3. Sparse application ----------------------------------------------

    #[test]
    fn disjoint_patches_compose() {
        let base = body();
        let base_snap = Snapshot::capture(&base).unwrap();

        let mut heavier = base.clone();
        heavier.mass = 5.0;
        let mass_patch = Patch::between(&base_snap, &Snapshot::capture(&heavier).unwrap()).unwrap();

        let mut faster = base.clone();
        faster.velocity.x = 2.0;
        let vel_patch = Patch::between(&base_snap, &Snapshot::capture(&faster).unwrap()).unwrap();

        let mut target = base.clone();
        vel_patch.apply(&mut target).unwrap();
        mass_patch.apply(&mut target).unwrap();
        assert_eq!(target.mass, 5.0);
        assert_eq!(target.velocity.x, 2.0);
    }

    #[test]
    fn apply_to_snapshot_matches_new_state() {
        let old = Snapshot::capture(&body()).unwrap();
        let mut changed = body();
        changed.mass = 7.0;
        let new = Snapshot::capture(&changed).unwrap();

        let forward = Patch::between(&old, &new).unwrap();
        let rebuilt = forward.apply_to_snapshot(&old).unwrap();
        assert!(rebuilt.same_state(&new));
    }

    // -- 4. Type checks -----------------------------------------------------

    #[test]
    fn patch_refuses_other_types_before_writing() {
        let old = Snapshot::capture(&body()).unwrap();
        let mut changed = body();
        changed.mass = 2.0;
        let patch = Patch::between(&old, &Snapshot::capture(&changed).unwrap()).unwrap();

        let mut other = Other { mass: 1.0 };
        let err = patch.apply(&mut other).unwrap_err();
        assert_eq!(
            err,
            DiffError::TypeMismatch {
                expected: "body".into(),
                found: "other".into()
            }
        );
        assert_eq!(other.mass, 1.0);
    }

    #[test]
    fn between_rejects_mismatched_snapshots() {
        let a = Snapshot::capture(&body()).unwrap();
        let b = Snapshot::capture(&Other { mass: 1.0 }).unwrap();
        assert!(matches!(
            Patch::between(&a, &b),
            Err(DiffError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn failed_apply_leaves_value_untouched() {
        let old = Snapshot::capture(&body()).unwrap();
        let mut changed = body();
        changed.mass = 3.0;
        changed.path[0].y = 4.0;
        let patch = Patch::between(&old, &Snapshot::capture(&changed).unwrap()).unwrap();

        // A value whose `path` list is too short for `path[0].y`.
        let mut value = serde_json::json!({ "mass": 1.0, "path": [] });
        let before = value.clone();
        assert!(patch.apply_to_value(&mut value).is_err());
        assert_eq!(value, before);
    }
}
