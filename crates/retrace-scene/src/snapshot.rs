//! Whole-object snapshot and restore.
//!
//! An [`ObjectSnapshot`] captures a scene object's header, parent link and
//! components (and optionally its entire subtree) by id. Restoring it writes
//! that state back into the same ids, reviving any that were destroyed in
//! the meantime. This is what lets deleting an object be undone without
//! invalidating handles held by older commands.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::{ComponentTypeId, ErasedComponent};
use crate::header::SceneObjectHeader;
use crate::id::{ComponentId, SceneObjectId};
use crate::scene::{ComponentSlot, ObjectData, Scene};
use crate::SceneError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Serialized state of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: ComponentId,
    /// Registered type name.
    pub type_name: String,
    /// Full serialized value.
    pub value: Value,
}

/// Serialized state of one scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: SceneObjectId,
    pub parent: Option<SceneObjectId>,
    pub header: SceneObjectHeader,
    pub components: Vec<ComponentRecord>,
    /// Child ids in sibling order at capture time. Empty in a snapshot
    /// without hierarchy, where children are not part of the state.
    pub children: Vec<SceneObjectId>,
}

/// A captured scene object, optionally with its whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    root: SceneObjectId,
    /// Position of the root among its siblings.
    sibling_index: usize,
    hierarchy: bool,
    /// Depth-first, root first.
    objects: Vec<ObjectRecord>,
}

impl ObjectSnapshot {
    pub fn root(&self) -> SceneObjectId {
        self.root
    }

    /// `true` if descendants were captured along with the root.
    pub fn includes_hierarchy(&self) -> bool {
        self.hierarchy
    }

    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    pub fn record(&self, id: SceneObjectId) -> Option<&ObjectRecord> {
        self.objects.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: SceneObjectId) -> bool {
        self.record(id).is_some()
    }
}

// ---------------------------------------------------------------------------
// Scene capture/restore impl
// ---------------------------------------------------------------------------

impl Scene {
    /// Capture `id` and, if `hierarchy` is set, all of its descendants.
    pub fn capture_object(
        &self,
        id: SceneObjectId,
        hierarchy: bool,
    ) -> Result<ObjectSnapshot, SceneError> {
        let parent = self.object_data(id)?.parent;
        let sibling_index = self
            .siblings(parent)
            .and_then(|siblings| siblings.iter().position(|&s| s == id))
            .unwrap_or(0);

        let mut objects = Vec::new();
        self.capture_record(id, hierarchy, &mut objects)?;
        Ok(ObjectSnapshot {
            root: id,
            sibling_index,
            hierarchy,
            objects,
        })
    }

    fn capture_record(
        &self,
        id: SceneObjectId,
        hierarchy: bool,
        out: &mut Vec<ObjectRecord>,
    ) -> Result<(), SceneError> {
        let data = self.object_data(id)?;
        let mut components = Vec::with_capacity(data.components.len());
        for &component in &data.components {
            components.push(ComponentRecord {
                id: component,
                type_name: self.component_info(component)?.name.to_owned(),
                value: self.component_value(component)?,
            });
        }
        out.push(ObjectRecord {
            id,
            parent: data.parent,
            header: data.header.clone(),
            components,
            children: if hierarchy {
                data.children.clone()
            } else {
                Vec::new()
            },
        });
        if hierarchy {
            for &child in &data.children {
                self.capture_record(child, true, out)?;
            }
        }
        Ok(())
    }

    /// Write a captured state back into the scene.
    ///
    /// Every captured id ends up alive with exactly the captured header and
    /// components. Destroyed ids are revived. With a hierarchy snapshot, the
    /// subtree is rebuilt as captured and objects added under it since are
    /// destroyed; without one, the root's current children are kept.
    ///
    /// Everything is validated and decoded before the scene is touched, so
    /// on error the scene is unchanged.
    pub fn restore_object(&mut self, snapshot: &ObjectSnapshot) -> Result<(), SceneError> {
        // 1. Validate.
        let root = snapshot
            .objects
            .first()
            .filter(|record| record.id == snapshot.root)
            .ok_or_else(|| SceneError::InvalidSnapshot {
                reason: format!("no record for root {}", snapshot.root),
            })?;

        let captured: BTreeSet<SceneObjectId> = snapshot.objects.iter().map(|r| r.id).collect();
        if let Some(parent) = root.parent {
            if !self.is_alive(parent) {
                return Err(SceneError::DestroyedObject { id: parent });
            }
            // The parent chain must stay outside what is being rebuilt.
            let mut current = Some(parent);
            while let Some(ancestor) = current {
                if captured.contains(&ancestor) {
                    return Err(SceneError::HierarchyCycle {
                        child: root.id,
                        parent,
                    });
                }
                current = self.objects.get(&ancestor).and_then(|data| data.parent);
            }
        }

        // 2. Decode every component before mutating anything.
        let mut decoded: Vec<Vec<(ComponentId, ComponentTypeId, ErasedComponent)>> =
            Vec::with_capacity(snapshot.objects.len());
        for record in &snapshot.objects {
            if !self.ids.was_allocated(record.id) {
                return Err(SceneError::InvalidSnapshot {
                    reason: format!("object {} was never part of this scene", record.id),
                });
            }
            let mut components = Vec::with_capacity(record.components.len());
            for component in &record.components {
                if !self.ids.was_allocated(component.id) {
                    return Err(SceneError::InvalidSnapshot {
                        reason: format!("component {} was never part of this scene", component.id),
                    });
                }
                let type_id = self
                    .registry
                    .lookup_by_name(&component.type_name)
                    .ok_or_else(|| self.unknown_component(&component.type_name))?;
                let from_value = self.registry.info(type_id).vtable.from_value;
                let value = from_value(component.value.clone())?;
                components.push((component.id, type_id, value));
            }
            decoded.push(components);
        }

        // 3. Clear whatever currently holds the captured ids.
        let root_id = root.id;
        let kept_children = if snapshot.hierarchy {
            for record in &snapshot.objects {
                if self.objects.contains_key(&record.id) {
                    self.destroy_object(record.id)?;
                }
            }
            None
        } else if let Some(data) = self.objects.get(&root_id) {
            let parent = data.parent;
            let children = data.children.clone();
            for component in data.components.clone() {
                self.remove_component(component)?;
            }
            self.detach(root_id, parent);
            Some(children)
        } else {
            None
        };

        // 4. Rebuild from the records.
        for (record, components) in snapshot.objects.iter().zip(decoded) {
            self.ids.revive(record.id);
            let mut component_ids = Vec::with_capacity(components.len());
            for (component, type_id, value) in components {
                self.ids.revive(component);
                self.components.insert(
                    component,
                    ComponentSlot {
                        type_id,
                        owner: record.id,
                        value,
                    },
                );
                component_ids.push(component);
            }

            let children = if snapshot.hierarchy {
                record.children.clone()
            } else {
                kept_children.clone().unwrap_or_default()
            };
            self.objects.insert(
                record.id,
                ObjectData {
                    header: record.header.clone(),
                    parent: record.parent,
                    children,
                    components: component_ids,
                },
            );
        }
        self.attach(root_id, root.parent, Some(snapshot.sibling_index));

        tracing::trace!(
            root = %root_id,
            objects = snapshot.objects.len(),
            hierarchy = snapshot.hierarchy,
            "restored object snapshot"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
