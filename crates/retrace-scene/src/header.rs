//! Scene object headers and their flag-based diff.
//!
//! The header is the part of a scene object that is not a component: name,
//! local transform and active flag. Header edits are diffed field by field
//! into a [`HeaderDiff`] whose [`HeaderDiffFlags`] say which fields it
//! writes.
//!
//! ```
//! use retrace_scene::header::{HeaderDiff, HeaderDiffFlags, SceneObjectHeader};
//! use retrace_scene::math::Vec3;
//!
//! let old = SceneObjectHeader::named("crate");
//! let mut new = old.clone();
//! new.position = Vec3::new(0.0, 2.0, 0.0);
//!
//! let diff = HeaderDiff::between(&old, &new);
//! assert_eq!(diff.flags(), HeaderDiffFlags::POSITION);
//!
//! let mut target = old.clone();
//! diff.apply(&mut target);
//! assert_eq!(target, new);
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};

// ---------------------------------------------------------------------------
// SceneObjectHeader
// ---------------------------------------------------------------------------

/// Name, local transform and active state of a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectHeader {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub active: bool,
}

impl SceneObjectHeader {
    /// An active header with an identity transform.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            active: true,
        }
    }
}

// ---------------------------------------------------------------------------
// HeaderField / HeaderDiffFlags
// ---------------------------------------------------------------------------

bitflags! {
    /// Which header fields a [`HeaderDiff`] writes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HeaderDiffFlags: u32 {
        const NAME = 1;
        const POSITION = 1 << 1;
        const ROTATION = 1 << 2;
        const SCALE = 1 << 3;
        const ACTIVE = 1 << 4;
    }
}

/// A single header field, used to focus the inspector after undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    Name,
    Position,
    Rotation,
    Scale,
    Active,
}

impl HeaderField {
    pub const ALL: [HeaderField; 5] = [
        HeaderField::Name,
        HeaderField::Position,
        HeaderField::Rotation,
        HeaderField::Scale,
        HeaderField::Active,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderField::Name => "name",
            HeaderField::Position => "position",
            HeaderField::Rotation => "rotation",
            HeaderField::Scale => "scale",
            HeaderField::Active => "active",
        }
    }

    pub fn flag(self) -> HeaderDiffFlags {
        match self {
            HeaderField::Name => HeaderDiffFlags::NAME,
            HeaderField::Position => HeaderDiffFlags::POSITION,
            HeaderField::Rotation => HeaderDiffFlags::ROTATION,
            HeaderField::Scale => HeaderDiffFlags::SCALE,
            HeaderField::Active => HeaderDiffFlags::ACTIVE,
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown header field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a scene object header field")]
pub struct UnknownHeaderField(pub String);

impl FromStr for HeaderField {
    type Err = UnknownHeaderField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeaderField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownHeaderField(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// HeaderDiff
// ---------------------------------------------------------------------------

/// One-directional diff of a [`SceneObjectHeader`].
///
/// Stores the target header; only fields named in `flags` are written on
/// [`apply`](Self::apply).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDiff {
    flags: HeaderDiffFlags,
    target: SceneObjectHeader,
}

impl HeaderDiff {
    pub fn between(old: &SceneObjectHeader, new: &SceneObjectHeader) -> Self {
        let mut flags = HeaderDiffFlags::empty();
        flags.set(HeaderDiffFlags::NAME, old.name != new.name);
        flags.set(HeaderDiffFlags::POSITION, old.position != new.position);
        flags.set(HeaderDiffFlags::ROTATION, old.rotation != new.rotation);
        flags.set(HeaderDiffFlags::SCALE, old.scale != new.scale);
        flags.set(HeaderDiffFlags::ACTIVE, old.active != new.active);
        Self {
            flags,
            target: new.clone(),
        }
    }

    pub fn flags(&self) -> HeaderDiffFlags {
        self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Write the flagged fields into `header`.
    pub fn apply(&self, header: &mut SceneObjectHeader) {
        if self.flags.contains(HeaderDiffFlags::NAME) {
            header.name.clone_from(&self.target.name);
        }
        if self.flags.contains(HeaderDiffFlags::POSITION) {
            header.position = self.target.position;
        }
        if self.flags.contains(HeaderDiffFlags::ROTATION) {
            header.rotation = self.target.rotation;
        }
        if self.flags.contains(HeaderDiffFlags::SCALE) {
            header.scale = self.target.scale;
        }
        if self.flags.contains(HeaderDiffFlags::ACTIVE) {
            header.active = self.target.active;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_headers_diff_empty() {
        let h = SceneObjectHeader::named("a");
        assert!(HeaderDiff::between(&h, &h.clone()).is_empty());
    }

    #[test]
    fn flags_cover_every_changed_field() {
        let old = SceneObjectHeader::named("a");
        let mut new = old.clone();
        new.name = "b".into();
        new.scale = Vec3::new(2.0, 2.0, 2.0);
        new.active = false;

        let diff = HeaderDiff::between(&old, &new);
        assert_eq!(
            diff.flags(),
            HeaderDiffFlags::NAME | HeaderDiffFlags::SCALE | HeaderDiffFlags::ACTIVE
        );
    }

    #[test]
    fn apply_writes_only_flagged_fields() {
        let old = SceneObjectHeader::named("a");
        let mut new = old.clone();
        new.rotation = Quat::new(0.0, 1.0, 0.0, 0.0);
        let diff = HeaderDiff::between(&old, &new);

        // A target that has since been renamed keeps its new name.
        let mut target = old.clone();
        target.name = "renamed".into();
        diff.apply(&mut target);
        assert_eq!(target.rotation, new.rotation);
        assert_eq!(target.name, "renamed");
    }

    #[test]
    fn header_field_parses_and_maps_to_flag() {
        for field in HeaderField::ALL {
            assert_eq!(field.as_str().parse::<HeaderField>().unwrap(), field);
        }
        assert_eq!(HeaderField::Active.flag(), HeaderDiffFlags::ACTIVE);
        assert!("layer".parse::<HeaderField>().is_err());
    }

    #[test]
    fn flags_serialize() {
        let flags = HeaderDiffFlags::NAME | HeaderDiffFlags::POSITION;
        let json = serde_json::to_string(&flags).unwrap();
        let back: HeaderDiffFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }
}
