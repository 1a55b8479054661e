//! Scene object and component identifiers.
//!
//! Every scene object and component gets a 64-bit id from a single
//! [`IdAllocator`]. Ids are never recycled: a destroyed id stays dead until
//! it is explicitly [revived](IdAllocator::revive), which is how undo brings
//! a deleted object back under the handle other commands still hold.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Typed ids
// ---------------------------------------------------------------------------

/// Handle to a scene object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneObjectId(u64);

/// Handle to a component attached to a scene object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u64);

macro_rules! raw_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Raw `u64` representation.
            #[inline]
            pub fn to_raw(self) -> u64 {
                self.0
            }

            /// Reconstruct from a raw `u64`.
            #[inline]
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

raw_id!(SceneObjectId, "so#");
raw_id!(ComponentId, "c#");

/// Either kind of game object, for code that handles both uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameObjectId {
    SceneObject(SceneObjectId),
    Component(ComponentId),
}

impl GameObjectId {
    fn to_raw(self) -> u64 {
        match self {
            GameObjectId::SceneObject(id) => id.0,
            GameObjectId::Component(id) => id.0,
        }
    }
}

impl From<SceneObjectId> for GameObjectId {
    fn from(id: SceneObjectId) -> Self {
        GameObjectId::SceneObject(id)
    }
}

impl From<ComponentId> for GameObjectId {
    fn from(id: ComponentId) -> Self {
        GameObjectId::Component(id)
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameObjectId::SceneObject(id) => fmt::Display::fmt(id, f),
            GameObjectId::Component(id) => fmt::Display::fmt(id, f),
        }
    }
}

// ---------------------------------------------------------------------------
// IdAllocator
// ---------------------------------------------------------------------------

/// Hands out monotonically increasing ids and tracks which are alive.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    /// Indexed by raw id.
    alive: Vec<bool>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_object(&mut self) -> SceneObjectId {
        SceneObjectId(self.allocate())
    }

    pub fn allocate_component(&mut self) -> ComponentId {
        ComponentId(self.allocate())
    }

    fn allocate(&mut self) -> u64 {
        let raw = self.alive.len() as u64;
        self.alive.push(true);
        raw
    }

    /// Mark `id` destroyed.
    ///
    /// Returns `true` if it was alive, `false` if it was already dead or was
    /// never allocated.
    pub fn deallocate(&mut self, id: impl Into<GameObjectId>) -> bool {
        self.set_alive(id.into().to_raw(), false)
    }

    /// Bring a destroyed id back to life.
    ///
    /// Returns `false` if the id is already alive or was never allocated.
    pub fn revive(&mut self, id: impl Into<GameObjectId>) -> bool {
        self.set_alive(id.into().to_raw(), true)
    }

    pub fn is_alive(&self, id: impl Into<GameObjectId>) -> bool {
        self.alive
            .get(id.into().to_raw() as usize)
            .copied()
            .unwrap_or(false)
    }

    /// `true` if the id was handed out by this allocator, alive or not.
    pub fn was_allocated(&self, id: impl Into<GameObjectId>) -> bool {
        (id.into().to_raw() as usize) < self.alive.len()
    }

    /// Number of currently alive ids of either kind.
    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    fn set_alive(&mut self, raw: u64, alive: bool) -> bool {
        match self.alive.get_mut(raw as usize) {
            Some(slot) if *slot != alive => {
                *slot = alive;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
