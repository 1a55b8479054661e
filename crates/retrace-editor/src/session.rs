//! The editor session: a scene, its global undo stack and the edit recorder,
//! driven once per frame.
//!
//! ```
//! use retrace_editor::prelude::*;
//!
//! let mut session = EditorSession::new(SessionConfig::default()).unwrap();
//! let obj = session.scene_mut().create_object("crate", None).unwrap();
//!
//! session.record_header(obj, Some(HeaderField::Active)).unwrap();
//! session.scene_mut().set_active(obj, false).unwrap();
//! session.end_frame();
//!
//! session.undo();
//! assert!(session.scene().header(obj).unwrap().active);
//! ```

use retrace_scene::header::HeaderField;
use retrace_scene::id::{ComponentId, SceneObjectId};
use retrace_scene::scene::Scene;
use tracing::debug;

use crate::command::{CommandContext, CommandId, EditorHooks, NoopHooks, UndoableCommand};
use crate::config::{SessionConfig, UndoConfig};
use crate::pending::{EditRecorder, ResolveReport};
use crate::stack::{StackStep, UndoStack};
use crate::EditorError;

/// Owns everything needed to record, resolve, undo and redo edits.
pub struct EditorSession {
    config: SessionConfig,
    scene: Scene,
    undo: UndoStack,
    recorder: EditRecorder,
    hooks: Box<dyn EditorHooks>,
    frame: u64,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("frame", &self.frame)
            .field("objects", &self.scene.object_count())
            .field("undo", &self.undo.len())
            .field("pending", &self.recorder.len())
            .finish()
    }
}

impl EditorSession {
    /// Create a session with an empty scene and no inspector hooks.
    pub fn new(config: SessionConfig) -> Result<Self, EditorError> {
        Self::with_hooks(config, Box::new(NoopHooks))
    }

    pub fn with_hooks(
        config: SessionConfig,
        hooks: Box<dyn EditorHooks>,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self {
            undo: UndoStack::new(&config.undo),
            config,
            scene: Scene::new(),
            recorder: EditRecorder::new(),
            hooks,
            frame: 0,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn undo_stack_mut(&mut self) -> &mut UndoStack {
        &mut self.undo
    }

    pub fn recorder(&self) -> &EditRecorder {
        &self.recorder
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// A new, empty stack for a window that keeps its own history.
    pub fn local_stack(&self, label: impl Into<String>) -> UndoStack {
        UndoStack::new(&UndoConfig::new(label, self.config.local_capacity))
    }

    // -- recording ----------------------------------------------------------

    pub fn record_component(
        &mut self,
        component: ComponentId,
        path: Option<&str>,
    ) -> Result<(), EditorError> {
        self.recorder.record_component(&self.scene, component, path)
    }

    pub fn record_header(
        &mut self,
        object: SceneObjectId,
        field: Option<HeaderField>,
    ) -> Result<(), EditorError> {
        self.recorder.record_header(&self.scene, object, field)
    }

    pub fn record_headers(&mut self, objects: &[SceneObjectId]) -> Result<(), EditorError> {
        self.recorder.record_headers(&self.scene, objects)
    }

    pub fn record_object(
        &mut self,
        object: SceneObjectId,
        hierarchy: bool,
        description: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.recorder
            .record_object(&self.scene, object, hierarchy, description)
    }

    pub fn record_new_object(&mut self, object: SceneObjectId) -> Result<(), EditorError> {
        self.recorder.record_new_object(&self.scene, object)
    }

    // -- frame --------------------------------------------------------------

    /// Resolve this frame's records into the global stack and advance the
    /// frame counter.
    pub fn end_frame(&mut self) -> ResolveReport {
        let report = self.recorder.resolve_all(&self.scene, &mut self.undo);
        if !report.is_empty() {
            debug!(
                frame = self.frame,
                committed = report.committed.len(),
                "resolved pending edits"
            );
        }
        self.frame += 1;
        report
    }

    /// Resolve pending records into `stack` instead of the global one.
    pub fn resolve_into(&mut self, stack: &mut UndoStack) -> ResolveReport {
        self.recorder.resolve_all(&self.scene, stack)
    }

    // -- global stack -------------------------------------------------------

    pub fn execute(&mut self, command: Box<dyn UndoableCommand>) -> CommandId {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        self.undo.execute(command, &mut ctx)
    }

    pub fn undo(&mut self) -> StackStep {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        self.undo.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> StackStep {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        self.undo.redo(&mut ctx)
    }

    // -- local stacks -------------------------------------------------------

    pub fn execute_in(
        &mut self,
        stack: &mut UndoStack,
        command: Box<dyn UndoableCommand>,
    ) -> CommandId {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        stack.execute(command, &mut ctx)
    }

    pub fn undo_in(&mut self, stack: &mut UndoStack) -> StackStep {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        stack.undo(&mut ctx)
    }

    pub fn redo_in(&mut self, stack: &mut UndoStack) -> StackStep {
        let mut ctx = CommandContext::new(&mut self.scene, self.hooks.as_mut());
        stack.redo(&mut ctx)
    }
}
