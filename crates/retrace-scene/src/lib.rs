//! Retrace Scene -- the live scene graph that edits are recorded against.
//!
//! A [`Scene`](scene::Scene) holds scene objects arranged in a parent/child
//! hierarchy. Each object has a [header](header::SceneObjectHeader) (name,
//! local transform, active flag) and any number of typed components. Every
//! object and component is addressed by a never-reused id, so a handle that
//! outlives its target is detected as destroyed instead of silently pointing
//! at something else, and undo can revive the original id.
//!
//! # Quick Start
//!
//! ```
//! use retrace_scene::prelude::*;
//! use retrace_diff::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Health { hp: u32 }
//!
//! impl Serializable for Health {
//!     const TYPE_NAME: &'static str = "health";
//!     const FIELDS: &'static [FieldDescriptor] =
//!         &[FieldDescriptor::new("hp", FieldKind::Integer)];
//! }
//!
//! let mut scene = Scene::new();
//! scene.register_component::<Health>();
//!
//! let player = scene.create_object("player", None).unwrap();
//! let health = scene.add_component(player, Health { hp: 10 }).unwrap();
//!
//! let snapshot = scene.capture_object(player, true).unwrap();
//! scene.destroy_object(player).unwrap();
//! assert!(!scene.is_alive(health));
//!
//! scene.restore_object(&snapshot).unwrap();
//! assert_eq!(scene.component::<Health>(health).unwrap(), &Health { hp: 10 });
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod header;
pub mod id;
pub mod math;
pub mod scene;
pub mod snapshot;

use retrace_diff::DiffError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by scene operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The scene object was destroyed (or never existed).
    #[error("scene object {id} has been destroyed")]
    DestroyedObject { id: id::SceneObjectId },

    /// The component was destroyed (or never existed).
    #[error("component {id} has been destroyed")]
    DestroyedComponent { id: id::ComponentId },

    /// A component type was referenced that has not been registered.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponentType { name: String, registered: String },

    /// Typed access asked for the wrong component type.
    #[error("component {id} is a '{actual}', not a '{requested}'")]
    ComponentTypeMismatch {
        id: id::ComponentId,
        requested: String,
        actual: String,
    },

    /// A reparent would make an object its own ancestor.
    #[error("cannot place {child} under {parent}: it would become its own ancestor")]
    HierarchyCycle {
        child: id::SceneObjectId,
        parent: id::SceneObjectId,
    },

    /// An object snapshot does not fit this scene.
    #[error("object snapshot cannot be restored: {reason}")]
    InvalidSnapshot { reason: String },

    /// Capturing, diffing or patching component state failed.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

impl SceneError {
    /// Whether the error names an object or component that no longer exists.
    pub fn is_destroyed(&self) -> bool {
        matches!(
            self,
            Self::DestroyedObject { .. } | Self::DestroyedComponent { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentInfo, ComponentRegistry, ComponentTypeId};
    pub use crate::header::{HeaderDiff, HeaderDiffFlags, HeaderField, SceneObjectHeader};
    pub use crate::id::{ComponentId, GameObjectId, IdAllocator, SceneObjectId};
    pub use crate::math::{Quat, Vec3};
    pub use crate::scene::Scene;
    pub use crate::snapshot::{ComponentRecord, ObjectRecord, ObjectSnapshot};
    pub use crate::SceneError;
}
