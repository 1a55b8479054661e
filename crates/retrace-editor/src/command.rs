//! The undoable command abstraction and the editor collaborator hooks.
//!
//! An [`UndoableCommand`] knows how to move the scene forward
//! ([`commit`](UndoableCommand::commit)) and back
//! ([`revert`](UndoableCommand::revert)). Both return an optional [`Focus`]
//! request, which the [`UndoStack`](crate::stack::UndoStack) forwards to the
//! host's [`EditorHooks`] so the user sees what just changed.

use std::fmt;

use retrace_scene::id::SceneObjectId;
use retrace_scene::scene::Scene;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CommandId
// ---------------------------------------------------------------------------

/// Identifier of a command registered on an undo stack. Monotonic per stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(pub u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// What the editor should show after a command ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Focus {
    /// Objects to select. Empty clears the selection.
    pub objects: Vec<SceneObjectId>,
    /// Field to focus in the inspector, on the first selected object.
    pub field: Option<String>,
}

impl Focus {
    /// Select `objects` without focusing a field.
    pub fn select(objects: Vec<SceneObjectId>) -> Self {
        Self {
            objects,
            field: None,
        }
    }

    /// Select `object` and focus the field at `path`.
    pub fn field(object: SceneObjectId, path: impl Into<String>) -> Self {
        Self {
            objects: vec![object],
            field: Some(path.into()),
        }
    }

    /// Clear the selection.
    pub fn clear() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// EditorHooks
// ---------------------------------------------------------------------------

/// Callbacks into the host editor. All methods default to doing nothing.
pub trait EditorHooks {
    /// Replace the current selection.
    fn select(&mut self, _objects: &[SceneObjectId]) {}

    /// Scroll the inspector to, and highlight, a field of `object`.
    fn focus_field(&mut self, _object: SceneObjectId, _path: &str) {}

    /// Redraw inspector contents from the scene.
    fn refresh_inspector(&mut self) {}
}

/// Hooks for hosts without an inspector.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl EditorHooks for NoopHooks {}

// ---------------------------------------------------------------------------
// CommandContext
// ---------------------------------------------------------------------------

/// Everything a command run needs: the scene to mutate and the hooks to
/// notify.
pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
    pub hooks: &'a mut dyn EditorHooks,
}

impl<'a> CommandContext<'a> {
    pub fn new(scene: &'a mut Scene, hooks: &'a mut dyn EditorHooks) -> Self {
        Self { scene, hooks }
    }

    /// Forward a command's focus request, then ask for a refresh.
    pub(crate) fn notify(&mut self, focus: Option<Focus>) {
        if let Some(focus) = focus {
            self.hooks.select(&focus.objects);
            if let (Some(path), Some(&object)) = (focus.field.as_deref(), focus.objects.first()) {
                self.hooks.focus_field(object, path);
            }
        }
        self.hooks.refresh_inspector();
    }
}

// ---------------------------------------------------------------------------
// UndoableCommand
// ---------------------------------------------------------------------------

/// A reversible change to the scene.
///
/// Commands must tolerate targets that were destroyed after they were
/// created: such targets are logged with `tracing::warn!` and skipped, and
/// the command returns `None` instead of a focus request.
pub trait UndoableCommand: fmt::Debug {
    /// Short human-readable label, e.g. for an Edit menu.
    fn description(&self) -> String;

    /// Apply the change (first execution and redo).
    fn commit(&mut self, scene: &mut Scene) -> Option<Focus>;

    /// Undo the change.
    fn revert(&mut self, scene: &mut Scene) -> Option<Focus>;
}
