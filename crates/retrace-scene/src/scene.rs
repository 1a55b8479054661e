//! The [`Scene`] is the live object graph edited by the editor. It owns the
//! id allocator, the component registry, every scene object (header,
//! parent, ordered children, attached components) and every component value.

use std::collections::BTreeMap;

use retrace_diff::patch::Patch;
use retrace_diff::snapshot::Snapshot;
use serde_json::Value;

use crate::component::{
    Component, ComponentInfo, ComponentRegistry, ComponentTypeId, ErasedComponent,
};
use crate::header::SceneObjectHeader;
use crate::id::{ComponentId, GameObjectId, IdAllocator, SceneObjectId};
use crate::math::{Quat, Vec3};
use crate::SceneError;

// ---------------------------------------------------------------------------
// Storage records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct ObjectData {
    pub header: SceneObjectHeader,
    pub parent: Option<SceneObjectId>,
    pub children: Vec<SceneObjectId>,
    pub components: Vec<ComponentId>,
}

impl ObjectData {
    fn new(header: SceneObjectHeader, parent: Option<SceneObjectId>) -> Self {
        Self {
            header,
            parent,
            children: Vec::new(),
            components: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ComponentSlot {
    pub type_id: ComponentTypeId,
    pub owner: SceneObjectId,
    pub value: ErasedComponent,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A hierarchy of scene objects with typed components.
///
/// Only live objects and components are stored. Destroying an object
/// destroys its components and its whole subtree; the ids stay dead until an
/// [`ObjectSnapshot`](crate::snapshot::ObjectSnapshot) restore revives them.
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) ids: IdAllocator,
    pub(crate) registry: ComponentRegistry,
    pub(crate) objects: BTreeMap<SceneObjectId, ObjectData>,
    pub(crate) components: BTreeMap<ComponentId, ComponentSlot>,
    /// Top-level objects, in order.
    pub(crate) roots: Vec<SceneObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register a component type. Idempotent.
    pub fn register_component<T: Component>(&mut self) -> ComponentTypeId {
        self.registry.register::<T>()
    }

    // -- liveness -----------------------------------------------------------

    /// `true` if the object or component exists and has not been destroyed.
    pub fn is_alive(&self, id: impl Into<GameObjectId>) -> bool {
        self.ids.is_alive(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// All live objects, in id order.
    pub fn objects(&self) -> impl Iterator<Item = SceneObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Top-level objects, in sibling order.
    pub fn roots(&self) -> &[SceneObjectId] {
        &self.roots
    }

    // -- object lifecycle ---------------------------------------------------

    /// Create an object with a default header under `parent` (or at the
    /// root), appended after its existing siblings.
    pub fn create_object(
        &mut self,
        name: impl Into<String>,
        parent: Option<SceneObjectId>,
    ) -> Result<SceneObjectId, SceneError> {
        if let Some(parent) = parent {
            self.object_data(parent)?;
        }
        let id = self.ids.allocate_object();
        self.objects
            .insert(id, ObjectData::new(SceneObjectHeader::named(name), parent));
        self.attach(id, parent, None);
        Ok(id)
    }

    /// Destroy an object, its components and all of its descendants.
    pub fn destroy_object(&mut self, id: SceneObjectId) -> Result<(), SceneError> {
        let parent = self.object_data(id)?.parent;
        self.detach(id, parent);
        self.destroy_subtree(id);
        Ok(())
    }

    fn destroy_subtree(&mut self, id: SceneObjectId) {
        let Some(data) = self.objects.remove(&id) else {
            return;
        };
        self.ids.deallocate(id);
        for component in data.components {
            self.components.remove(&component);
            self.ids.deallocate(component);
        }
        for child in data.children {
            self.destroy_subtree(child);
        }
    }

    /// Deep-copy an object with its components and descendants. The copy is
    /// placed right after the original among its siblings.
    pub fn clone_object(&mut self, id: SceneObjectId) -> Result<SceneObjectId, SceneError> {
        let parent = self.object_data(id)?.parent;
        let copy = self.clone_subtree(id, parent)?;
        let index = self
            .siblings(parent)
            .and_then(|siblings| siblings.iter().position(|&s| s == id))
            .map(|i| i + 1);
        self.attach(copy, parent, index);
        Ok(copy)
    }

    fn clone_subtree(
        &mut self,
        source: SceneObjectId,
        parent: Option<SceneObjectId>,
    ) -> Result<SceneObjectId, SceneError> {
        let (header, children, components) = {
            let data = self.object_data(source)?;
            (
                data.header.clone(),
                data.children.clone(),
                data.components.clone(),
            )
        };

        let mut copies = Vec::with_capacity(components.len());
        for component in components {
            let slot = self.slot(component)?;
            let info = self.registry.info(slot.type_id);
            let value = (info.vtable.clone_box)(slot.value.as_ref()).ok_or_else(|| {
                SceneError::ComponentTypeMismatch {
                    id: component,
                    requested: info.name.to_owned(),
                    actual: "unknown".to_owned(),
                }
            })?;
            copies.push((slot.type_id, value));
        }

        let id = self.ids.allocate_object();
        let mut data = ObjectData::new(header, parent);
        for (type_id, value) in copies {
            let component = self.ids.allocate_component();
            self.components.insert(
                component,
                ComponentSlot {
                    type_id,
                    owner: id,
                    value,
                },
            );
            data.components.push(component);
        }
        self.objects.insert(id, data);

        for child in children {
            let child_copy = self.clone_subtree(child, Some(id))?;
            if let Some(data) = self.objects.get_mut(&id) {
                data.children.push(child_copy);
            }
        }
        Ok(id)
    }

    // -- header -------------------------------------------------------------

    pub fn header(&self, id: SceneObjectId) -> Result<&SceneObjectHeader, SceneError> {
        Ok(&self.object_data(id)?.header)
    }

    pub fn header_mut(&mut self, id: SceneObjectId) -> Result<&mut SceneObjectHeader, SceneError> {
        Ok(&mut self.object_data_mut(id)?.header)
    }

    pub fn name(&self, id: SceneObjectId) -> Result<&str, SceneError> {
        Ok(&self.header(id)?.name)
    }

    pub fn set_name(
        &mut self,
        id: SceneObjectId,
        name: impl Into<String>,
    ) -> Result<(), SceneError> {
        self.header_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_position(&mut self, id: SceneObjectId, position: Vec3) -> Result<(), SceneError> {
        self.header_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: SceneObjectId, rotation: Quat) -> Result<(), SceneError> {
        self.header_mut(id)?.rotation = rotation;
        Ok(())
    }

    pub fn set_scale(&mut self, id: SceneObjectId, scale: Vec3) -> Result<(), SceneError> {
        self.header_mut(id)?.scale = scale;
        Ok(())
    }

    pub fn set_active(&mut self, id: SceneObjectId, active: bool) -> Result<(), SceneError> {
        self.header_mut(id)?.active = active;
        Ok(())
    }

    // -- hierarchy ----------------------------------------------------------

    pub fn parent(&self, id: SceneObjectId) -> Result<Option<SceneObjectId>, SceneError> {
        Ok(self.object_data(id)?.parent)
    }

    pub fn children(&self, id: SceneObjectId) -> Result<&[SceneObjectId], SceneError> {
        Ok(&self.object_data(id)?.children)
    }

    /// Move `id` under `parent` (or to the root), appended after the new
    /// siblings. Rejects moves that would put an object under itself.
    pub fn set_parent(
        &mut self,
        id: SceneObjectId,
        parent: Option<SceneObjectId>,
    ) -> Result<(), SceneError> {
        let old_parent = self.object_data(id)?.parent;
        if let Some(new_parent) = parent {
            self.object_data(new_parent)?;
            if self.is_descendant_or_self(new_parent, id) {
                return Err(SceneError::HierarchyCycle {
                    child: id,
                    parent: new_parent,
                });
            }
        }
        self.detach(id, old_parent);
        self.object_data_mut(id)?.parent = parent;
        self.attach(id, parent, None);
        Ok(())
    }

    /// `true` if `candidate` is `ancestor` or lies somewhere below it.
    pub fn is_descendant_or_self(&self, candidate: SceneObjectId, ancestor: SceneObjectId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.objects.get(&id).and_then(|data| data.parent);
        }
        false
    }

    pub(crate) fn siblings(&self, parent: Option<SceneObjectId>) -> Option<&Vec<SceneObjectId>> {
        match parent {
            Some(parent) => self.objects.get(&parent).map(|data| &data.children),
            None => Some(&self.roots),
        }
    }

    fn siblings_mut(&mut self, parent: Option<SceneObjectId>) -> Option<&mut Vec<SceneObjectId>> {
        match parent {
            Some(parent) => self.objects.get_mut(&parent).map(|data| &mut data.children),
            None => Some(&mut self.roots),
        }
    }

    /// Insert `id` into its parent's child list at `index` (clamped), or at
    /// the end.
    pub(crate) fn attach(
        &mut self,
        id: SceneObjectId,
        parent: Option<SceneObjectId>,
        index: Option<usize>,
    ) {
        if let Some(siblings) = self.siblings_mut(parent) {
            let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
            siblings.insert(at, id);
        }
    }

    /// Remove `id` from its parent's child list. Returns its former index.
    pub(crate) fn detach(
        &mut self,
        id: SceneObjectId,
        parent: Option<SceneObjectId>,
    ) -> Option<usize> {
        let siblings = self.siblings_mut(parent)?;
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.remove(index);
        Some(index)
    }

    // -- components ---------------------------------------------------------

    /// Attach a new component to `object`.
    pub fn add_component<T: Component>(
        &mut self,
        object: SceneObjectId,
        value: T,
    ) -> Result<ComponentId, SceneError> {
        let type_id = self
            .registry
            .lookup::<T>()
            .ok_or_else(|| self.unknown_component(T::TYPE_NAME))?;
        self.insert_component(object, type_id, Box::new(value))
    }

    /// Attach a new component given its registered type name and serialized
    /// form. The value is decoded before anything is allocated.
    pub fn add_component_value(
        &mut self,
        object: SceneObjectId,
        type_name: &str,
        value: Value,
    ) -> Result<ComponentId, SceneError> {
        let type_id = self
            .registry
            .lookup_by_name(type_name)
            .ok_or_else(|| self.unknown_component(type_name))?;
        self.object_data(object)?;
        let decoded = (self.registry.info(type_id).vtable.from_value)(value)?;
        self.insert_component(object, type_id, decoded)
    }

    fn insert_component(
        &mut self,
        object: SceneObjectId,
        type_id: ComponentTypeId,
        value: ErasedComponent,
    ) -> Result<ComponentId, SceneError> {
        let data = self
            .objects
            .get_mut(&object)
            .ok_or(SceneError::DestroyedObject { id: object })?;
        let id = self.ids.allocate_component();
        data.components.push(id);
        self.components.insert(
            id,
            ComponentSlot {
                type_id,
                owner: object,
                value,
            },
        );
        Ok(id)
    }

    /// Destroy a single component.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<(), SceneError> {
        let slot = self
            .components
            .remove(&id)
            .ok_or(SceneError::DestroyedComponent { id })?;
        self.ids.deallocate(id);
        if let Some(owner) = self.objects.get_mut(&slot.owner) {
            owner.components.retain(|&c| c != id);
        }
        Ok(())
    }

    pub fn component<T: Component>(&self, id: ComponentId) -> Result<&T, SceneError> {
        let slot = self.slot(id)?;
        slot.value
            .downcast_ref::<T>()
            .ok_or_else(|| self.type_mismatch::<T>(id, slot.type_id))
    }

    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Result<&mut T, SceneError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(SceneError::DestroyedComponent { id })?;
        let type_id = slot.type_id;
        match slot.value.downcast_mut::<T>() {
            Some(value) => Ok(value),
            None => Err(SceneError::ComponentTypeMismatch {
                id,
                requested: T::TYPE_NAME.to_owned(),
                actual: self.registry.info(type_id).name.to_owned(),
            }),
        }
    }

    /// First component of type `T` on `object`, if any.
    pub fn find_component<T: Component>(
        &self,
        object: SceneObjectId,
    ) -> Result<Option<ComponentId>, SceneError> {
        let data = self.object_data(object)?;
        let Some(type_id) = self.registry.lookup::<T>() else {
            return Ok(None);
        };
        Ok(data
            .components
            .iter()
            .copied()
            .find(|c| matches!(self.components.get(c), Some(slot) if slot.type_id == type_id)))
    }

    /// Components attached to `object`, in attach order.
    pub fn components_of(&self, object: SceneObjectId) -> Result<&[ComponentId], SceneError> {
        Ok(&self.object_data(object)?.components)
    }

    pub fn component_owner(&self, id: ComponentId) -> Result<SceneObjectId, SceneError> {
        Ok(self.slot(id)?.owner)
    }

    /// Registration info for the component's type.
    pub fn component_info(&self, id: ComponentId) -> Result<&ComponentInfo, SceneError> {
        Ok(self.registry.info(self.slot(id)?.type_id))
    }

    // -- serialized access --------------------------------------------------

    /// The component's full serialized form.
    pub fn component_value(&self, id: ComponentId) -> Result<Value, SceneError> {
        let slot = self.slot(id)?;
        let info = self.registry.info(slot.type_id);
        Ok((info.vtable.to_value)(slot.value.as_ref())?)
    }

    /// Snapshot the component's declared fields.
    pub fn capture_component(&self, id: ComponentId) -> Result<Snapshot, SceneError> {
        let info = self.component_info(id)?;
        let value = self.component_value(id)?;
        Ok(Snapshot::from_value(info.name, info.fields, value)?)
    }

    /// Apply a patch to a component.
    ///
    /// The patch's type tag must match the component's registered type; the
    /// component is left untouched on any error.
    pub fn apply_component_patch(
        &mut self,
        id: ComponentId,
        patch: &Patch,
    ) -> Result<(), SceneError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(SceneError::DestroyedComponent { id })?;
        let info = self.registry.info(slot.type_id);
        patch.check_type(info.name)?;
        let mut value = (info.vtable.to_value)(slot.value.as_ref())?;
        patch.apply_to_value(&mut value)?;
        slot.value = (info.vtable.from_value)(value)?;
        Ok(())
    }

    /// Replace a component's state from its serialized form.
    pub fn set_component_value(&mut self, id: ComponentId, value: Value) -> Result<(), SceneError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(SceneError::DestroyedComponent { id })?;
        let info = self.registry.info(slot.type_id);
        slot.value = (info.vtable.from_value)(value)?;
        Ok(())
    }

    // -- internal lookups ---------------------------------------------------

    pub(crate) fn object_data(&self, id: SceneObjectId) -> Result<&ObjectData, SceneError> {
        self.objects
            .get(&id)
            .ok_or(SceneError::DestroyedObject { id })
    }

    fn object_data_mut(&mut self, id: SceneObjectId) -> Result<&mut ObjectData, SceneError> {
        self.objects
            .get_mut(&id)
            .ok_or(SceneError::DestroyedObject { id })
    }

    fn slot(&self, id: ComponentId) -> Result<&ComponentSlot, SceneError> {
        self.components
            .get(&id)
            .ok_or(SceneError::DestroyedComponent { id })
    }

    pub(crate) fn unknown_component(&self, name: &str) -> SceneError {
        SceneError::UnknownComponentType {
            name: name.to_owned(),
            registered: self.registry.registered_names().join(", "),
        }
    }

    fn type_mismatch<T: Component>(&self, id: ComponentId, actual: ComponentTypeId) -> SceneError {
        SceneError::ComponentTypeMismatch {
            id,
            requested: T::TYPE_NAME.to_owned(),
            actual: self.registry.info(actual).name.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use retrace_diff::patch::DiffPair;
    use retrace_diff::schema::{FieldDescriptor, FieldKind, Serializable};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Light {
        intensity: f32,
        color: [f32; 3],
    }

    impl Serializable for Light {
        const TYPE_NAME: &'static str = "light";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("intensity", FieldKind::Float),
            FieldDescriptor::new("color", FieldKind::List(&FieldKind::Float)),
        ];
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    impl Serializable for Tag {
        const TYPE_NAME: &'static str = "tag";
        const FIELDS: &'static [FieldDescriptor] =
            &[FieldDescriptor::new("label", FieldKind::Text)];
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.register_component::<Light>();
        scene.register_component::<Tag>();
        scene
    }

    fn light() -> Light {
        Light {
            intensity: 1.0,
            color: [1.0, 1.0, 1.0],
        }
    }

    // -- 1. Lifecycle -------------------------------------------------------

    #[test]
    fn create_and_destroy_hierarchy() {
        let mut scene = scene();
        let root = scene.create_object("root", None).unwrap();
        let child = scene.create_object("child", Some(root)).unwrap();
        let grandchild = scene.create_object("grandchild", Some(child)).unwrap();
        let comp = scene.add_component(grandchild, light()).unwrap();

        assert_eq!(scene.roots(), &[root]);
        assert_eq!(scene.children(root).unwrap(), &[child]);
        assert_eq!(scene.parent(grandchild).unwrap(), Some(child));

        scene.destroy_object(child).unwrap();
        assert!(scene.is_alive(root));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert!(!scene.is_alive(comp));
        assert!(scene.children(root).unwrap().is_empty());
        assert_eq!(scene.object_count(), 1);
        assert_eq!(scene.component_count(), 0);
    }

    #[test]
    fn operations_on_destroyed_objects_fail() {
        let mut scene = scene();
        let obj = scene.create_object("gone", None).unwrap();
        scene.destroy_object(obj).unwrap();
        assert!(matches!(
            scene.set_name(obj, "x"),
            Err(SceneError::DestroyedObject { id }) if id == obj
        ));
        assert!(scene.destroy_object(obj).is_err());
        assert!(scene.create_object("orphan", Some(obj)).is_err());
        assert!(scene.add_component(obj, light()).is_err());
    }

    // -- 2. Hierarchy -------------------------------------------------------

    #[test]
    fn set_parent_rejects_cycles() {
        let mut scene = scene();
        let a = scene.create_object("a", None).unwrap();
        let b = scene.create_object("b", Some(a)).unwrap();
        assert!(matches!(
            scene.set_parent(a, Some(b)),
            Err(SceneError::HierarchyCycle { .. })
        ));
        assert!(scene.set_parent(a, Some(a)).is_err());

        scene.set_parent(b, None).unwrap();
        assert_eq!(scene.roots(), &[a, b]);
        assert!(scene.children(a).unwrap().is_empty());
    }

    #[test]
    fn clone_copies_subtree_after_original() {
        let mut scene = scene();
        let a = scene.create_object("a", None).unwrap();
        let z = scene.create_object("z", None).unwrap();
        let child = scene.create_object("child", Some(a)).unwrap();
        scene.add_component(child, light()).unwrap();

        let copy = scene.clone_object(a).unwrap();
        assert_eq!(scene.roots(), &[a, copy, z]);
        assert_eq!(scene.name(copy).unwrap(), "a");

        let copied = scene.children(copy).unwrap()[0];
        assert_ne!(copied, child);
        let comp = scene.find_component::<Light>(copied).unwrap().unwrap();
        assert_eq!(scene.component::<Light>(comp).unwrap(), &light());
        assert_eq!(scene.component_owner(comp).unwrap(), copied);
    }

    // -- 3. Components ------------------------------------------------------

    #[test]
    fn typed_access_checks_component_type() {
        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let comp = scene.add_component(obj, light()).unwrap();
        assert!(scene.component::<Light>(comp).is_ok());
        assert!(matches!(
            scene.component::<Tag>(comp),
            Err(SceneError::ComponentTypeMismatch { .. })
        ));
        scene.component_mut::<Light>(comp).unwrap().intensity = 3.0;
        assert_eq!(scene.component::<Light>(comp).unwrap().intensity, 3.0);
    }

    #[test]
    fn unregistered_component_is_rejected() {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        struct Unregistered {
            v: u8,
        }
        impl Serializable for Unregistered {
            const TYPE_NAME: &'static str = "unregistered";
            const FIELDS: &'static [FieldDescriptor] = &[];
        }

        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let err = scene.add_component(obj, Unregistered { v: 1 }).unwrap_err();
        let SceneError::UnknownComponentType { ref name, .. } = err else {
            panic!("expected an unknown component error, got {err:?}");
        };
        assert_eq!(name.as_str(), "unregistered");
    }

    #[test]
    fn add_component_by_name_decodes_first() {
        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let tag = scene
            .add_component_value(obj, "tag", serde_json::json!({ "label": "door" }))
            .unwrap();
        assert_eq!(scene.component::<Tag>(tag).unwrap().label, "door");

        assert!(scene
            .add_component_value(obj, "tag", serde_json::json!({ "label": 3 }))
            .is_err());
        assert!(scene
            .add_component_value(obj, "missing", serde_json::json!({}))
            .is_err());
        assert_eq!(scene.components_of(obj).unwrap(), &[tag]);
        assert_eq!(scene.component_count(), 1);
    }

    #[test]
    fn remove_component_detaches_from_owner() {
        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let a = scene.add_component(obj, light()).unwrap();
        let b = scene.add_component(obj, Tag { label: "x".into() }).unwrap();
        scene.remove_component(a).unwrap();
        assert_eq!(scene.components_of(obj).unwrap(), &[b]);
        assert!(!scene.is_alive(a));
        assert!(scene.remove_component(a).is_err());
    }

    // -- 4. Snapshots and patches --------------------------------------------

    #[test]
    fn component_patch_round_trip() {
        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let comp = scene.add_component(obj, light()).unwrap();

        let before = scene.capture_component(comp).unwrap();
        scene.component_mut::<Light>(comp).unwrap().color[2] = 0.0;
        let after = scene.capture_component(comp).unwrap();
        let pair = DiffPair::between(&before, &after).unwrap();
        assert_eq!(pair.forward.changes()[0].path.to_string(), "color[2]");

        scene.apply_component_patch(comp, &pair.backward).unwrap();
        assert_eq!(scene.component::<Light>(comp).unwrap(), &light());
        scene.apply_component_patch(comp, &pair.forward).unwrap();
        assert_eq!(
            scene.component::<Light>(comp).unwrap().color,
            [1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn patch_for_other_type_is_refused() {
        let mut scene = scene();
        let obj = scene.create_object("obj", None).unwrap();
        let lamp = scene.add_component(obj, light()).unwrap();
        let tag = scene.add_component(obj, Tag { label: "a".into() }).unwrap();

        let before = scene.capture_component(tag).unwrap();
        scene.component_mut::<Tag>(tag).unwrap().label = "b".into();
        let after = scene.capture_component(tag).unwrap();
        let patch = Patch::between(&before, &after).unwrap();

        let err = scene.apply_component_patch(lamp, &patch).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Diff(retrace_diff::DiffError::TypeMismatch { .. })
        ));
        assert_eq!(scene.component::<Light>(lamp).unwrap(), &light());
    }
}
