//! Field paths into serialized state.
//!
//! A [`FieldPath`] addresses a value inside an object's serialized form:
//! `name`, `position.x`, `points[2].y`. Paths are parsed once into typed
//! [`PathSegment`]s and can be validated against a type's declared
//! [`FieldDescriptor`]s before they are ever used.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{find_field, FieldDescriptor, FieldKind};
use crate::{json_kind, DiffError};

// ---------------------------------------------------------------------------
// PathSegment
// ---------------------------------------------------------------------------

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// A named field of a struct, or a key of a map.
    Field(String),
    /// A position in a list.
    Index(usize),
}

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// A parsed path into an object's serialized fields.
///
/// Always non-empty, and always starts with a [`PathSegment::Field`] naming a
/// top-level field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<PathSegment>", into = "Vec<PathSegment>")]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// A path naming a single top-level field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Parse `ident(.ident | [index])*`.
    ///
    /// ```
    /// use retrace_diff::path::{FieldPath, PathSegment};
    ///
    /// let path = FieldPath::parse("points[2].y").unwrap();
    /// assert_eq!(path.segments(), &[
    ///     PathSegment::Field("points".into()),
    ///     PathSegment::Index(2),
    ///     PathSegment::Field("y".into()),
    /// ]);
    /// assert!(FieldPath::parse("points[x]").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, DiffError> {
        let invalid = |reason: &str| DiffError::InvalidPath {
            path: input.to_owned(),
            reason: reason.to_owned(),
        };

        let mut segments = Vec::new();
        for part in input.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => (&part[..open], &part[open..]),
                None => (part, ""),
            };
            if name.is_empty() {
                return Err(invalid("empty field name"));
            }
            if name.contains(']') {
                return Err(invalid("unmatched ']'"));
            }
            segments.push(PathSegment::Field(name.to_owned()));

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(invalid("expected '[' after index"));
                };
                let Some(close) = inner.find(']') else {
                    return Err(invalid("unterminated index"));
                };
                let digits = &inner[..close];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("index is not a non-negative integer"));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| invalid("index is out of range"))?;
                segments.push(PathSegment::Index(index));
                rest = &inner[close + 1..];
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The top-level field this path starts at.
    pub fn root_field(&self) -> &str {
        match &self.segments[0] {
            PathSegment::Field(name) => name,
            // Construction guarantees a leading field segment.
            PathSegment::Index(_) => "",
        }
    }

    /// Extend the path with a named field or map key.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Extend the path with a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Resolve this path against declared fields and return the kind of the
    /// value it addresses.
    ///
    /// Rejects unknown field names and index segments applied to non-list
    /// fields. Paths descending into [`FieldKind::Opaque`] are accepted
    /// without further checks.
    pub fn validate(&self, fields: &'static [FieldDescriptor]) -> Result<FieldKind, DiffError> {
        let mut kind = FieldKind::Struct(fields);
        for segment in &self.segments {
            kind = match (kind, segment) {
                (FieldKind::Struct(declared), PathSegment::Field(name)) => {
                    match find_field(declared, name) {
                        Some(descriptor) => descriptor.kind,
                        None => {
                            return Err(DiffError::InvalidPath {
                                path: self.to_string(),
                                reason: format!("unknown field '{name}'"),
                            });
                        }
                    }
                }
                (FieldKind::Map(value), PathSegment::Field(_)) => *value,
                (FieldKind::List(element), PathSegment::Index(_)) => *element,
                (FieldKind::Opaque, _) => FieldKind::Opaque,
                (other, PathSegment::Field(name)) => {
                    return Err(DiffError::InvalidPath {
                        path: self.to_string(),
                        reason: format!("cannot access '{name}' on a {} field", other.label()),
                    });
                }
                (other, PathSegment::Index(i)) => {
                    return Err(DiffError::InvalidPath {
                        path: self.to_string(),
                        reason: format!("cannot index [{i}] into a {} field", other.label()),
                    });
                }
            };
        }
        Ok(kind)
    }

    /// Borrow the value this path addresses, if present.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |value, segment| match segment {
                PathSegment::Field(name) => value.as_object()?.get(name),
                PathSegment::Index(i) => value.as_array()?.get(*i),
            })
    }

    /// Write `new` at this path.
    ///
    /// Every segment but the last must already resolve. A trailing field
    /// segment inserts the key if absent; a trailing index must be in bounds.
    pub fn set(&self, root: &mut Value, new: Value) -> Result<(), DiffError> {
        let (last, parent) = self.split_parent(root)?;
        match (last, parent) {
            (PathSegment::Field(name), Value::Object(map)) => {
                map.insert(name.clone(), new);
                Ok(())
            }
            (PathSegment::Index(i), Value::Array(items)) if *i < items.len() => {
                items[*i] = new;
                Ok(())
            }
            _ => Err(self.not_found()),
        }
    }

    /// Remove the map key this path addresses. Returns the removed value.
    pub fn remove(&self, root: &mut Value) -> Result<Value, DiffError> {
        let (last, parent) = self.split_parent(root)?;
        match (last, parent) {
            (PathSegment::Field(name), Value::Object(map)) => {
                map.remove(name).ok_or_else(|| self.not_found())
            }
            (_, parent) => Err(DiffError::InvalidPath {
                path: self.to_string(),
                reason: format!(
                    "only map keys can be removed, parent is {}",
                    json_kind(parent)
                ),
            }),
        }
    }

    fn split_parent<'v>(
        &self,
        root: &'v mut Value,
    ) -> Result<(&PathSegment, &'v mut Value), DiffError> {
        let Some((last, init)) = self.segments.split_last() else {
            return Err(self.not_found());
        };
        let mut value = root;
        for segment in init {
            value = match segment {
                PathSegment::Field(name) => value.as_object_mut().and_then(|m| m.get_mut(name)),
                PathSegment::Index(i) => value.as_array_mut().and_then(|a| a.get_mut(*i)),
            }
            .ok_or_else(|| self.not_found())?;
        }
        Ok((last, value))
    }

    fn not_found(&self) -> DiffError {
        DiffError::PathNotFound {
            path: self.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<PathSegment>> for FieldPath {
    type Error = DiffError;

    fn try_from(segments: Vec<PathSegment>) -> Result<Self, Self::Error> {
        if matches!(segments.first(), Some(PathSegment::Field(_))) {
            return Ok(Self { segments });
        }
        Err(DiffError::InvalidPath {
            path: format!("{segments:?}"),
            reason: "a path must start with a field name".to_owned(),
        })
    }
}

impl From<FieldPath> for Vec<PathSegment> {
    fn from(path: FieldPath) -> Self {
        path.segments
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
