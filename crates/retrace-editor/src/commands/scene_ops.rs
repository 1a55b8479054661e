//! Commands that perform a scene operation when executed.
//!
//! Unlike the recorded commands, these are constructed before anything has
//! changed and do their work in the first [`commit`](UndoableCommand::commit).
//! Objects they remove are captured first, so a later commit or revert
//! revives them under the same ids.

use retrace_diff::schema::Serializable;
use retrace_diff::snapshot::Snapshot;
use retrace_diff::DiffError;
use retrace_scene::id::SceneObjectId;
use retrace_scene::scene::Scene;
use retrace_scene::snapshot::ObjectSnapshot;
use retrace_scene::SceneError;
use serde_json::Value;

use super::{applied, Direction};
use crate::command::{Focus, UndoableCommand};

/// Capture `object` with its hierarchy, then destroy it.
fn capture_and_destroy(
    scene: &mut Scene,
    object: SceneObjectId,
    direction: Direction,
) -> Option<ObjectSnapshot> {
    let captured = scene.capture_object(object, true).and_then(|state| {
        scene.destroy_object(object)?;
        Ok(state)
    });
    match captured {
        Ok(state) => Some(state),
        Err(e) => {
            applied(Err(e), direction, object);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// CreateObject
// ---------------------------------------------------------------------------

/// Create a new scene object, optionally with an initial set of components.
///
/// ```
/// use retrace_editor::prelude::*;
///
/// #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct Tag { label: String }
///
/// impl Serializable for Tag {
///     const TYPE_NAME: &'static str = "tag";
///     const FIELDS: &'static [FieldDescriptor] =
///         &[FieldDescriptor::new("label", FieldKind::Text)];
/// }
///
/// let mut scene = Scene::new();
/// scene.register_component::<Tag>();
/// let mut create = CreateObject::new("door", None)
///     .with_component(&Tag { label: "exit".into() })
///     .unwrap()
///     .with_description("Add exit door");
/// create.commit(&mut scene);
///
/// let door = create.created().unwrap();
/// assert_eq!(scene.components_of(door).unwrap().len(), 1);
/// assert_eq!(create.description(), "Add exit door");
/// ```
#[derive(Debug, Clone)]
pub struct CreateObject {
    name: String,
    parent: Option<SceneObjectId>,
    /// Registered type name and serialized value of each initial component.
    components: Vec<(String, Value)>,
    description: Option<String>,
    created: Option<SceneObjectId>,
    state: Option<ObjectSnapshot>,
}

impl CreateObject {
    pub fn new(name: impl Into<String>, parent: Option<SceneObjectId>) -> Self {
        Self {
            name: name.into(),
            parent,
            components: Vec::new(),
            description: None,
            created: None,
            state: None,
        }
    }

    /// Attach a copy of `value` to the object when it is created.
    pub fn with_component<T: Serializable>(mut self, value: &T) -> Result<Self, DiffError> {
        let value = Snapshot::capture(value)?.to_value();
        self.components.push((T::TYPE_NAME.to_owned(), value));
        Ok(self)
    }

    /// Attach a component given its registered type name and serialized
    /// form, e.g. one picked from a menu of registered types.
    pub fn with_component_value(mut self, type_name: impl Into<String>, value: Value) -> Self {
        self.components.push((type_name.into(), value));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The object's id, once the command has been committed.
    pub fn created(&self) -> Option<SceneObjectId> {
        self.created
    }
}

impl UndoableCommand for CreateObject {
    fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Create scene object '{}'", self.name))
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        let object = match (self.created, &self.state) {
            (Some(object), Some(state)) => {
                if !applied(scene.restore_object(state), Direction::Commit, object) {
                    return None;
                }
                object
            }
            (Some(object), None) => {
                if !scene.is_alive(object) {
                    return None;
                }
                object
            }
            (None, _) => match scene.create_object(self.name.clone(), self.parent) {
                Ok(object) => {
                    self.created = Some(object);
                    for (type_name, value) in &self.components {
                        let result = scene
                            .add_component_value(object, type_name, value.clone())
                            .map(|_| ());
                        applied(result, Direction::Commit, object);
                    }
                    object
                }
                Err(e) => {
                    applied(Err(e), Direction::Commit, &self.name);
                    return None;
                }
            },
        };
        Some(Focus::select(vec![object]))
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        let object = self.created?;
        self.state = capture_and_destroy(scene, object, Direction::Revert);
        self.state.as_ref().map(|_| Focus::clear())
    }
}

// ---------------------------------------------------------------------------
// DeleteObject
// ---------------------------------------------------------------------------

/// Delete an object together with its components and descendants.
#[derive(Debug, Clone)]
pub struct DeleteObject {
    target: SceneObjectId,
    name: String,
    description: Option<String>,
    state: Option<ObjectSnapshot>,
}

impl DeleteObject {
    pub fn new(scene: &Scene, target: SceneObjectId) -> Result<Self, SceneError> {
        Ok(Self {
            target,
            name: scene.name(target)?.to_owned(),
            description: None,
            state: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl UndoableCommand for DeleteObject {
    fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Delete scene object '{}'", self.name))
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        let state = capture_and_destroy(scene, self.target, Direction::Commit)?;
        self.state = Some(state);
        Some(Focus::clear())
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        let state = self.state.as_ref()?;
        applied(scene.restore_object(state), Direction::Revert, self.target)
            .then(|| Focus::select(vec![self.target]))
    }
}

// ---------------------------------------------------------------------------
// RenameObject
// ---------------------------------------------------------------------------

/// Change an object's name.
#[derive(Debug, Clone)]
pub struct RenameObject {
    target: SceneObjectId,
    old_name: String,
    new_name: String,
    description: Option<String>,
}

impl RenameObject {
    pub fn new(
        scene: &Scene,
        target: SceneObjectId,
        new_name: impl Into<String>,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            target,
            old_name: scene.name(target)?.to_owned(),
            new_name: new_name.into(),
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn run(&self, scene: &mut Scene, name: &str, direction: Direction) -> Option<Focus> {
        applied(scene.set_name(self.target, name), direction, self.target)
            .then(|| Focus::field(self.target, "name"))
    }
}

impl UndoableCommand for RenameObject {
    fn description(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            format!(
                "Rename scene object '{}' to '{}'",
                self.old_name, self.new_name
            )
        })
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, &self.new_name, Direction::Commit)
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, &self.old_name, Direction::Revert)
    }
}

// ---------------------------------------------------------------------------
// CloneObject
// ---------------------------------------------------------------------------

/// Deep-copy one or more objects. Each copy lands right after its original.
#[derive(Debug, Clone)]
pub struct CloneObject {
    originals: Vec<SceneObjectId>,
    description: Option<String>,
    clones: Vec<SceneObjectId>,
    /// Clone states captured on revert, in the order they were created.
    states: Vec<ObjectSnapshot>,
}

impl CloneObject {
    pub fn new(originals: Vec<SceneObjectId>) -> Self {
        Self {
            originals,
            description: None,
            clones: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Ids of the copies, once the command has been committed.
    pub fn clones(&self) -> &[SceneObjectId] {
        &self.clones
    }
}

impl UndoableCommand for CloneObject {
    fn description(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match self.originals.len() {
            1 => "Clone scene object".to_owned(),
            n => format!("Clone {n} scene objects"),
        }
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        if self.clones.is_empty() {
            for &original in &self.originals {
                let result = scene
                    .clone_object(original)
                    .map(|copy| self.clones.push(copy));
                applied(result, Direction::Commit, original);
            }
        } else {
            // Restoring in creation order puts every copy back at its
            // captured sibling index.
            for state in std::mem::take(&mut self.states) {
                let result = scene.restore_object(&state);
                applied(result, Direction::Commit, state.root());
            }
        }

        let alive: Vec<_> = self
            .clones
            .iter()
            .copied()
            .filter(|&copy| scene.is_alive(copy))
            .collect();
        (!alive.is_empty()).then(|| Focus::select(alive))
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        let mut states: Vec<_> = self
            .clones
            .iter()
            .rev()
            .filter_map(|&copy| capture_and_destroy(scene, copy, Direction::Revert))
            .collect();
        states.reverse();
        self.states = states;

        let alive: Vec<_> = self
            .originals
            .iter()
            .copied()
            .filter(|&original| scene.is_alive(original))
            .collect();
        Some(Focus::select(alive))
    }
}
