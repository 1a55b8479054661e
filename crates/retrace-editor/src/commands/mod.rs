//! Concrete undoable commands.
//!
//! - [`record`]: commands produced by resolving recorded edits. They carry
//!   forward/backward diffs or before/after snapshots.
//! - [`scene_ops`]: commands that perform a scene operation themselves when
//!   executed (create, delete, rename, clone).

pub mod record;
pub mod scene_ops;

use std::fmt;

use retrace_scene::SceneError;
use tracing::warn;

/// Direction a command is being run in, for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Commit,
    Revert,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Commit => "commit",
            Direction::Revert => "revert",
        }
    }
}

/// Log a failed scene write and report whether it succeeded.
///
/// Destroyed targets are expected (the user may delete an object that older
/// commands still refer to) and get a plain warning; anything else is logged
/// with the error attached.
pub(crate) fn applied(
    result: Result<(), SceneError>,
    direction: Direction,
    object: impl fmt::Display,
) -> bool {
    match result {
        Ok(()) => true,
        Err(e) if e.is_destroyed() => {
            warn!(
                object = %object,
                direction = direction.as_str(),
                "attempting to {} state on a destroyed game-object",
                direction.as_str()
            );
            false
        }
        Err(e) => {
            warn!(
                object = %object,
                direction = direction.as_str(),
                error = %e,
                "undo command could not be applied"
            );
            false
        }
    }
}
