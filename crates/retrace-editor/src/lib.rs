//! Retrace Editor -- edit recording and undo/redo for a [`Scene`](retrace_scene::scene::Scene).
//!
//! Inspector code records the state of whatever it is about to let the user
//! change, mutates the scene freely, and at the end of the frame the
//! [`EditRecorder`](pending::EditRecorder) turns every actual change into a
//! command on an [`UndoStack`](stack::UndoStack). Structural operations
//! (create, delete, rename, clone) are executed as commands directly.
//!
//! # Quick Start
//!
//! ```
//! use retrace_editor::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Light { intensity: i64 }
//!
//! impl Serializable for Light {
//!     const TYPE_NAME: &'static str = "light";
//!     const FIELDS: &'static [FieldDescriptor] =
//!         &[FieldDescriptor::new("intensity", FieldKind::Integer)];
//! }
//!
//! let mut session = EditorSession::new(SessionConfig::default()).unwrap();
//! session.scene_mut().register_component::<Light>();
//! let lamp = session.scene_mut().create_object("lamp", None).unwrap();
//! let light = session.scene_mut().add_component(lamp, Light { intensity: 5 }).unwrap();
//!
//! session.record_component(light, Some("intensity")).unwrap();
//! session.scene_mut().component_mut::<Light>(light).unwrap().intensity = 9;
//! assert_eq!(session.end_frame().committed.len(), 1);
//!
//! session.undo();
//! assert_eq!(session.scene().component::<Light>(light).unwrap().intensity, 5);
//! session.redo();
//! assert_eq!(session.scene().component::<Light>(light).unwrap().intensity, 9);
//! ```

#![deny(unsafe_code)]

pub mod command;
pub mod commands;
pub mod config;
pub mod logging;
pub mod pending;
pub mod session;
pub mod stack;

use retrace_diff::DiffError;
use retrace_scene::SceneError;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the diff crate for convenience.
pub use retrace_diff;

/// Re-export the scene crate for convenience.
pub use retrace_scene;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced when recording edits or building a session.
///
/// Undo and redo themselves never fail: stale targets are logged and
/// skipped.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    /// A configuration value is out of range or could not be parsed.
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common editor usage.
pub mod prelude {
    pub use retrace_diff::prelude::*;
    pub use retrace_scene::prelude::*;

    pub use crate::command::{
        CommandContext, CommandId, EditorHooks, Focus, NoopHooks, UndoableCommand,
    };
    pub use crate::commands::record::{
        HeaderChange, NewObjectUndo, RecordComponentUndo, RecordHeaderUndo, RecordObjectUndo,
    };
    pub use crate::commands::scene_ops::{CloneObject, CreateObject, DeleteObject, RenameObject};
    pub use crate::config::{SessionConfig, UndoConfig, DEFAULT_UNDO_CAPACITY};
    pub use crate::pending::{EditRecorder, ResolveReport};
    pub use crate::session::EditorSession;
    pub use crate::stack::{HistoryEntry, StackStep, UndoStack};
    pub use crate::EditorError;
}
