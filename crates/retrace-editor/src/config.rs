//! Undo/redo and session configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a JSON document only
//! needs the keys it wants to override:
//!
//! ```
//! use retrace_editor::config::SessionConfig;
//!
//! let config = SessionConfig::from_json_str(r#"{ "undo": { "capacity": 20 } }"#).unwrap();
//! assert_eq!(config.undo.capacity, 20);
//! assert_eq!(config.undo.label, "global");
//! ```

use serde::{Deserialize, Serialize};

use crate::EditorError;

/// Default number of commands an undo stack keeps.
pub const DEFAULT_UNDO_CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// UndoConfig
// ---------------------------------------------------------------------------

/// Configuration for a single [`UndoStack`](crate::stack::UndoStack).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Name used in log output.
    pub label: String,
    /// Maximum number of commands kept. Must be greater than zero. When full,
    /// the oldest command is dropped.
    pub capacity: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            label: "global".to_owned(),
            capacity: DEFAULT_UNDO_CAPACITY,
        }
    }
}

impl UndoConfig {
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            capacity,
        }
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        if self.capacity == 0 {
            return Err(EditorError::InvalidConfig {
                field: "capacity",
                reason: format!("undo stack '{}' must hold at least one command", self.label),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for an [`EditorSession`](crate::session::EditorSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The session's global undo stack.
    pub undo: UndoConfig,
    /// Capacity of stacks created with
    /// [`EditorSession::local_stack`](crate::session::EditorSession::local_stack).
    pub local_capacity: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo: UndoConfig::default(),
            local_capacity: DEFAULT_UNDO_CAPACITY,
            log_filter: "warn".to_owned(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, EditorError> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| EditorError::InvalidConfig {
                field: "session",
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        self.undo.validate()?;
        if self.local_capacity == 0 {
            return Err(EditorError::InvalidConfig {
                field: "local_capacity",
                reason: "local undo stacks must hold at least one command".to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
