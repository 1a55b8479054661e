//! Commands produced by [`EditRecorder::resolve_all`](crate::pending::EditRecorder::resolve_all).
//!
//! Each one is built from a before/after pair captured around a user edit and
//! is never modified after it is pushed.

use retrace_diff::patch::{DiffPair, Patch};
use retrace_diff::path::FieldPath;
use retrace_scene::header::{HeaderDiff, HeaderField};
use retrace_scene::id::{ComponentId, SceneObjectId};
use retrace_scene::scene::Scene;
use retrace_scene::snapshot::ObjectSnapshot;

use super::{applied, Direction};
use crate::command::{Focus, UndoableCommand};

// ---------------------------------------------------------------------------
// RecordComponentUndo
// ---------------------------------------------------------------------------

/// A field-level change to one component.
#[derive(Debug, Clone)]
pub struct RecordComponentUndo {
    component: ComponentId,
    owner: SceneObjectId,
    path: Option<FieldPath>,
    diff: DiffPair,
}

impl RecordComponentUndo {
    /// `path` is the field to focus after undo/redo; the diff itself may
    /// touch any number of fields.
    pub fn new(
        component: ComponentId,
        owner: SceneObjectId,
        path: Option<FieldPath>,
        diff: DiffPair,
    ) -> Self {
        Self {
            component,
            owner,
            path,
            diff,
        }
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }

    pub fn diff(&self) -> &DiffPair {
        &self.diff
    }

    fn run(&self, scene: &mut Scene, patch: &Patch, direction: Direction) -> Option<Focus> {
        if !applied(
            scene.apply_component_patch(self.component, patch),
            direction,
            self.component,
        ) {
            return None;
        }
        Some(match &self.path {
            Some(path) => Focus::field(self.owner, format!("{}.{path}", patch.type_name())),
            None => Focus::select(vec![self.owner]),
        })
    }
}

impl UndoableCommand for RecordComponentUndo {
    fn description(&self) -> String {
        let type_name = self.diff.forward.type_name();
        match &self.path {
            Some(path) => format!("Modify {type_name}.{path}"),
            None => format!("Modify {type_name}"),
        }
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, &self.diff.forward, Direction::Commit)
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, &self.diff.backward, Direction::Revert)
    }
}

// ---------------------------------------------------------------------------
// RecordHeaderUndo
// ---------------------------------------------------------------------------

/// Header change of a single object inside a [`RecordHeaderUndo`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderChange {
    pub object: SceneObjectId,
    pub forward: HeaderDiff,
    pub backward: HeaderDiff,
}

/// Header changes (name, transform, active flag) to one or more objects,
/// undone and redone together.
#[derive(Debug, Clone)]
pub struct RecordHeaderUndo {
    changes: Vec<HeaderChange>,
    field: Option<HeaderField>,
    description: String,
}

impl RecordHeaderUndo {
    pub fn new(
        changes: Vec<HeaderChange>,
        field: Option<HeaderField>,
        description: String,
    ) -> Self {
        Self {
            changes,
            field,
            description,
        }
    }

    pub fn changes(&self) -> &[HeaderChange] {
        &self.changes
    }

    fn run(&self, scene: &mut Scene, direction: Direction) -> Option<Focus> {
        let mut touched = Vec::with_capacity(self.changes.len());
        for change in &self.changes {
            let diff = match direction {
                Direction::Commit => &change.forward,
                Direction::Revert => &change.backward,
            };
            let result = scene
                .header_mut(change.object)
                .map(|header| diff.apply(header));
            if applied(result, direction, change.object) {
                touched.push(change.object);
            }
        }
        if touched.is_empty() {
            return None;
        }
        Some(Focus {
            objects: touched,
            field: self.field.map(|f| f.as_str().to_owned()),
        })
    }
}

impl UndoableCommand for RecordHeaderUndo {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, Direction::Commit)
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, Direction::Revert)
    }
}

// ---------------------------------------------------------------------------
// RecordObjectUndo
// ---------------------------------------------------------------------------

/// Full before/after state of an object (and optionally its subtree).
///
/// Restoring a state brings back destroyed objects under their original ids.
#[derive(Debug, Clone)]
pub struct RecordObjectUndo {
    object: SceneObjectId,
    before: ObjectSnapshot,
    after: ObjectSnapshot,
    description: String,
}

impl RecordObjectUndo {
    pub fn new(
        object: SceneObjectId,
        before: ObjectSnapshot,
        after: ObjectSnapshot,
        description: String,
    ) -> Self {
        Self {
            object,
            before,
            after,
            description,
        }
    }

    fn run(&self, scene: &mut Scene, direction: Direction) -> Option<Focus> {
        let state = match direction {
            Direction::Commit => &self.after,
            Direction::Revert => &self.before,
        };
        applied(scene.restore_object(state), direction, self.object)
            .then(|| Focus::select(vec![self.object]))
    }
}

impl UndoableCommand for RecordObjectUndo {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, Direction::Commit)
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        self.run(scene, Direction::Revert)
    }
}

// ---------------------------------------------------------------------------
// NewObjectUndo
// ---------------------------------------------------------------------------

/// Creation of an object that the user made outside the command system.
/// Undo destroys it; redo brings it back with the state captured at the
/// end of the frame it was created in.
#[derive(Debug, Clone)]
pub struct NewObjectUndo {
    object: SceneObjectId,
    state: ObjectSnapshot,
    description: String,
}

impl NewObjectUndo {
    pub fn new(object: SceneObjectId, state: ObjectSnapshot, description: String) -> Self {
        Self {
            object,
            state,
            description,
        }
    }
}

impl UndoableCommand for NewObjectUndo {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn commit(&mut self, scene: &mut Scene) -> Option<Focus> {
        if !scene.is_alive(self.object) {
            let restored = scene.restore_object(&self.state);
            if !applied(restored, Direction::Commit, self.object) {
                return None;
            }
        }
        Some(Focus::select(vec![self.object]))
    }

    fn revert(&mut self, scene: &mut Scene) -> Option<Focus> {
        let result = scene.destroy_object(self.object);
        applied(result, Direction::Revert, self.object);
        None
    }
}
