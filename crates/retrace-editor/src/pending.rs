//! Edit recording.
//!
//! Inspector code calls one of the `record_*` methods right before it lets
//! the user change something, then mutates the scene directly. Once per
//! frame [`EditRecorder::resolve_all`] compares every recorded state with
//! the current one and pushes an undo command for each actual change.
//!
//! ```
//! use retrace_editor::prelude::*;
//!
//! let mut scene = Scene::new();
//! let obj = scene.create_object("crate", None).unwrap();
//! let mut stack = UndoStack::new(&UndoConfig::default());
//! let mut recorder = EditRecorder::new();
//!
//! recorder.record_header(&scene, obj, Some(HeaderField::Name)).unwrap();
//! scene.set_name(obj, "barrel").unwrap();
//!
//! let report = recorder.resolve_all(&scene, &mut stack);
//! assert_eq!(report.committed.len(), 1);
//! assert!(recorder.is_empty());
//! ```

use retrace_diff::patch::DiffPair;
use retrace_diff::path::FieldPath;
use retrace_diff::snapshot::Snapshot;
use retrace_scene::header::{HeaderDiff, HeaderField, SceneObjectHeader};
use retrace_scene::id::{ComponentId, SceneObjectId};
use retrace_scene::scene::Scene;
use retrace_scene::snapshot::ObjectSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::command::CommandId;
use crate::commands::record::{
    HeaderChange, NewObjectUndo, RecordComponentUndo, RecordHeaderUndo, RecordObjectUndo,
};
use crate::stack::UndoStack;
use crate::EditorError;

// ---------------------------------------------------------------------------
// PendingEdit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum PendingEdit {
    Component {
        component: ComponentId,
        owner: SceneObjectId,
        path: Option<FieldPath>,
        before: Snapshot,
    },
    Headers {
        before: Vec<(SceneObjectId, SceneObjectHeader)>,
        field: Option<HeaderField>,
    },
    Object {
        object: SceneObjectId,
        description: String,
        before: ObjectSnapshot,
    },
    NewObject {
        object: SceneObjectId,
    },
}

// ---------------------------------------------------------------------------
// ResolveReport
// ---------------------------------------------------------------------------

/// Summary of one [`EditRecorder::resolve_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// Commands pushed, in record order.
    pub committed: Vec<CommandId>,
    /// Records whose state did not change.
    pub dropped_empty: usize,
    /// Records whose target was destroyed before resolve.
    pub skipped_destroyed: usize,
    /// Records whose diff could not be computed.
    pub failed: usize,
}

impl ResolveReport {
    /// `true` if nothing was pushed.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EditRecorder
// ---------------------------------------------------------------------------

/// Buffer of edits recorded during the current frame.
#[derive(Debug, Default)]
pub struct EditRecorder {
    pending: Vec<PendingEdit>,
}

impl EditRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records waiting for the next resolve.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending record without resolving it.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    // -- recording ----------------------------------------------------------

    /// Record the current state of a component.
    ///
    /// `path` (e.g. `"color.r"` or `"points[2]"`) names the field about to be
    /// edited. It is checked against the component's declared fields and is
    /// focused in the inspector on undo/redo. `None` records the component as
    /// a whole.
    pub fn record_component(
        &mut self,
        scene: &Scene,
        component: ComponentId,
        path: Option<&str>,
    ) -> Result<(), EditorError> {
        let info = scene.component_info(component)?;
        let path = path.map(FieldPath::parse).transpose()?;
        if let Some(path) = &path {
            path.validate(info.fields)?;
        }
        let before = scene.capture_component(component)?;
        let owner = scene.component_owner(component)?;
        self.pending.push(PendingEdit::Component {
            component,
            owner,
            path,
            before,
        });
        Ok(())
    }

    /// Record an object's header. `field` is focused on undo/redo.
    pub fn record_header(
        &mut self,
        scene: &Scene,
        object: SceneObjectId,
        field: Option<HeaderField>,
    ) -> Result<(), EditorError> {
        self.push_headers(scene, &[object], field)
    }

    /// Record the headers of several objects edited together, e.g. a
    /// multi-selection moved in one drag. They resolve into one command.
    pub fn record_headers(
        &mut self,
        scene: &Scene,
        objects: &[SceneObjectId],
    ) -> Result<(), EditorError> {
        self.push_headers(scene, objects, None)
    }

    fn push_headers(
        &mut self,
        scene: &Scene,
        objects: &[SceneObjectId],
        field: Option<HeaderField>,
    ) -> Result<(), EditorError> {
        let before = objects
            .iter()
            .map(|&object| -> Result<_, EditorError> {
                Ok((object, scene.header(object)?.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !before.is_empty() {
            self.pending.push(PendingEdit::Headers { before, field });
        }
        Ok(())
    }

    /// Record an object's full state (header and components) and, with
    /// `hierarchy`, that of every descendant. Use this for structural edits
    /// such as adding components or reparenting children.
    pub fn record_object(
        &mut self,
        scene: &Scene,
        object: SceneObjectId,
        hierarchy: bool,
        description: impl Into<String>,
    ) -> Result<(), EditorError> {
        let before = scene.capture_object(object, hierarchy)?;
        self.pending.push(PendingEdit::Object {
            object,
            description: description.into(),
            before,
        });
        Ok(())
    }

    /// Record that `object` was just created. Its state is captured at
    /// resolve time, so edits made later in the same frame are included.
    pub fn record_new_object(
        &mut self,
        scene: &Scene,
        object: SceneObjectId,
    ) -> Result<(), EditorError> {
        scene.header(object)?;
        self.pending.push(PendingEdit::NewObject { object });
        Ok(())
    }

    // -- resolving ----------------------------------------------------------

    /// Turn every pending record that changed into a command on `stack`.
    ///
    /// Records are handled in the order they were made. The buffer is
    /// always emptied, even for records that were dropped or skipped.
    pub fn resolve_all(&mut self, scene: &Scene, stack: &mut UndoStack) -> ResolveReport {
        let mut report = ResolveReport::default();
        for edit in std::mem::take(&mut self.pending) {
            match edit {
                PendingEdit::Component {
                    component,
                    owner,
                    path,
                    before,
                } => resolve_component(scene, stack, &mut report, component, owner, path, before),
                PendingEdit::Headers { before, field } => {
                    resolve_headers(scene, stack, &mut report, before, field)
                }
                PendingEdit::Object {
                    object,
                    description,
                    before,
                } => resolve_object(scene, stack, &mut report, object, description, before),
                PendingEdit::NewObject { object } => {
                    resolve_new_object(scene, stack, &mut report, object)
                }
            }
        }
        report
    }
}

fn skip_destroyed(report: &mut ResolveReport, object: impl std::fmt::Display) {
    warn!(object = %object, "recorded object was destroyed before its edit was resolved");
    report.skipped_destroyed += 1;
}

fn resolve_component(
    scene: &Scene,
    stack: &mut UndoStack,
    report: &mut ResolveReport,
    component: ComponentId,
    owner: SceneObjectId,
    path: Option<FieldPath>,
    before: Snapshot,
) {
    if !scene.is_alive(component) {
        skip_destroyed(report, component);
        return;
    }
    let after = match scene.capture_component(component) {
        Ok(after) => after,
        Err(e) => {
            warn!(object = %component, error = %e, "failed to capture recorded component");
            report.failed += 1;
            return;
        }
    };
    if before.same_state(&after) {
        trace!(object = %component, "dropping empty component edit");
        report.dropped_empty += 1;
        return;
    }
    match DiffPair::between(&before, &after) {
        Ok(diff) if diff.is_empty() => {
            trace!(object = %component, "dropping empty component edit");
            report.dropped_empty += 1;
        }
        Ok(diff) => {
            let command = RecordComponentUndo::new(component, owner, path, diff);
            let id = stack.register_command(Box::new(command));
            report.committed.push(id);
        }
        Err(e) => {
            warn!(object = %component, error = %e, "failed to diff recorded component");
            report.failed += 1;
        }
    }
}

fn resolve_headers(
    scene: &Scene,
    stack: &mut UndoStack,
    report: &mut ResolveReport,
    before: Vec<(SceneObjectId, SceneObjectHeader)>,
    field: Option<HeaderField>,
) {
    let mut changes = Vec::with_capacity(before.len());
    let mut live = 0;
    for (object, old) in before {
        let Ok(new) = scene.header(object) else {
            skip_destroyed(report, object);
            continue;
        };
        live += 1;
        let forward = HeaderDiff::between(&old, new);
        if forward.is_empty() {
            continue;
        }
        changes.push(HeaderChange {
            object,
            forward,
            backward: HeaderDiff::between(new, &old),
        });
    }

    if changes.is_empty() {
        if live > 0 {
            trace!(objects = live, "dropping empty header edit");
            report.dropped_empty += 1;
        }
        return;
    }

    let description = match (changes.as_slice(), field) {
        ([single], Some(field)) => format!("Modify {}.{field}", display_name(scene, single.object)),
        ([single], None) => format!("Modify {}", display_name(scene, single.object)),
        (many, _) => format!("Modify {} scene objects", many.len()),
    };
    let command = RecordHeaderUndo::new(changes, field, description);
    let id = stack.register_command(Box::new(command));
    report.committed.push(id);
}

fn resolve_object(
    scene: &Scene,
    stack: &mut UndoStack,
    report: &mut ResolveReport,
    object: SceneObjectId,
    description: String,
    before: ObjectSnapshot,
) {
    if !scene.is_alive(object) {
        skip_destroyed(report, object);
        return;
    }
    let after = match scene.capture_object(object, before.includes_hierarchy()) {
        Ok(after) => after,
        Err(e) => {
            warn!(object = %object, error = %e, "failed to capture recorded object");
            report.failed += 1;
            return;
        }
    };
    if before == after {
        trace!(object = %object, "dropping empty object edit");
        report.dropped_empty += 1;
        return;
    }
    let command = RecordObjectUndo::new(object, before, after, description);
    let id = stack.register_command(Box::new(command));
    report.committed.push(id);
}

fn resolve_new_object(
    scene: &Scene,
    stack: &mut UndoStack,
    report: &mut ResolveReport,
    object: SceneObjectId,
) {
    if !scene.is_alive(object) {
        skip_destroyed(report, object);
        return;
    }
    match scene.capture_object(object, true) {
        Ok(state) => {
            let description = format!("New scene object '{}'", display_name(scene, object));
            let command = NewObjectUndo::new(object, state, description);
            let id = stack.register_command(Box::new(command));
            report.committed.push(id);
        }
        Err(e) => {
            warn!(object = %object, error = %e, "failed to capture new object");
            report.failed += 1;
        }
    }
}

fn display_name(scene: &Scene, object: SceneObjectId) -> String {
    scene
        .name(object)
        .map(str::to_owned)
        .unwrap_or_else(|_| object.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
