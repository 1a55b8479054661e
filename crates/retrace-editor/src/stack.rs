//! The undo/redo command stack.
//!
//! An [`UndoStack`] is an ordered list of commands with a single cursor.
//! Everything below the cursor has been applied and can be undone; everything
//! at or above it has been undone and can be redone. Registering a command
//! discards the redo tail. When the stack is full, the oldest command is
//! dropped.
//!
//! ```
//! use retrace_editor::prelude::*;
//!
//! let mut scene = Scene::new();
//! let obj = scene.create_object("crate", None).unwrap();
//! let mut hooks = NoopHooks;
//! let mut stack = UndoStack::new(&UndoConfig::default());
//!
//! let rename = RenameObject::new(&scene, obj, "barrel").unwrap();
//! stack.execute(Box::new(rename), &mut CommandContext::new(&mut scene, &mut hooks));
//! assert_eq!(scene.name(obj).unwrap(), "barrel");
//!
//! stack.undo(&mut CommandContext::new(&mut scene, &mut hooks));
//! assert_eq!(scene.name(obj).unwrap(), "crate");
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::{CommandContext, CommandId, UndoableCommand};
use crate::config::UndoConfig;

// ---------------------------------------------------------------------------
// StackStep / HistoryEntry
// ---------------------------------------------------------------------------

/// Outcome of [`UndoStack::undo`] or [`UndoStack::redo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStep {
    /// There was nothing to undo or redo.
    Nothing,
    Undone { id: CommandId, description: String },
    Redone { id: CommandId, description: String },
}

impl StackStep {
    pub fn is_nothing(&self) -> bool {
        matches!(self, StackStep::Nothing)
    }

    pub fn command_id(&self) -> Option<CommandId> {
        match self {
            StackStep::Nothing => None,
            StackStep::Undone { id, .. } | StackStep::Redone { id, .. } => Some(*id),
        }
    }
}

/// One line of [`UndoStack::history`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: CommandId,
    pub description: String,
    /// `true` if the command is below the cursor (currently applied).
    pub applied: bool,
}

// ---------------------------------------------------------------------------
// UndoStack
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct StackEntry {
    id: CommandId,
    command: Box<dyn UndoableCommand>,
}

/// Bounded stack of undoable commands with a single cursor.
#[derive(Debug)]
pub struct UndoStack {
    label: String,
    capacity: usize,
    entries: VecDeque<StackEntry>,
    /// Number of applied commands; `entries[..cursor]` can be undone.
    cursor: usize,
    next_id: u64,
}

impl UndoStack {
    /// Create an empty stack.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn new(config: &UndoConfig) -> Self {
        assert!(
            config.capacity > 0,
            "undo stack '{}' capacity must be greater than zero",
            config.label
        );
        Self {
            label: config.label.clone(),
            capacity: config.capacity,
            entries: VecDeque::new(),
            cursor: 0,
            next_id: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of commands held, applied or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of currently applied commands.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    // -- registration -------------------------------------------------------

    /// Push an already-applied command at the cursor.
    ///
    /// Any redo tail is discarded. If the stack is over capacity afterwards,
    /// the oldest command is dropped.
    pub fn register_command(&mut self, command: Box<dyn UndoableCommand>) -> CommandId {
        let discarded = self.entries.len() - self.cursor;
        self.entries.truncate(self.cursor);

        let id = CommandId(self.next_id);
        self.next_id += 1;
        debug!(
            stack = %self.label,
            command = %id,
            description = %command.description(),
            discarded_redo = discarded,
            "registered undo command"
        );
        self.entries.push_back(StackEntry { id, command });

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(stack = %self.label, command = %evicted.id, "evicted oldest undo command");
            }
        }
        self.cursor = self.entries.len();
        id
    }

    /// Commit `command` and register it.
    pub fn execute(
        &mut self,
        mut command: Box<dyn UndoableCommand>,
        ctx: &mut CommandContext<'_>,
    ) -> CommandId {
        let focus = command.commit(ctx.scene);
        ctx.notify(focus);
        self.register_command(command)
    }

    // -- undo / redo --------------------------------------------------------

    /// Revert the most recently applied command.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> StackStep {
        if self.cursor == 0 {
            warn!(stack = %self.label, "nothing to undo");
            return StackStep::Nothing;
        }
        self.cursor -= 1;
        let entry = &mut self.entries[self.cursor];
        let focus = entry.command.revert(ctx.scene);
        let step = StackStep::Undone {
            id: entry.id,
            description: entry.command.description(),
        };
        debug!(stack = %self.label, command = %entry.id, "undo");
        ctx.notify(focus);
        step
    }

    /// Re-apply the most recently undone command.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> StackStep {
        if self.cursor == self.entries.len() {
            warn!(stack = %self.label, "nothing to redo");
            return StackStep::Nothing;
        }
        let entry = &mut self.entries[self.cursor];
        self.cursor += 1;
        let focus = entry.command.commit(ctx.scene);
        let step = StackStep::Redone {
            id: entry.id,
            description: entry.command.description(),
        };
        debug!(stack = %self.label, command = %entry.id, "redo");
        ctx.notify(focus);
        step
    }

    // -- inspection and maintenance -----------------------------------------

    /// Id of the most recently applied command.
    pub fn top_command_id(&self) -> Option<CommandId> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.id)
    }

    /// Remove a command without reverting it.
    ///
    /// Used when a provisional command turns out to be a no-op. Returns
    /// `false` if no command with `id` is on the stack.
    pub fn pop_command(&mut self, id: CommandId) -> bool {
        let Some(index) = self.entries.iter().rposition(|entry| entry.id == id) else {
            return false;
        };
        self.entries.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        true
    }

    /// Drop every command.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Description of the command [`undo`](Self::undo) would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.command.description())
    }

    /// Description of the command [`redo`](Self::redo) would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.entries
            .get(self.cursor)
            .map(|entry| entry.command.description())
    }

    /// Every held command, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| HistoryEntry {
                id: entry.id,
                description: entry.command.description(),
                applied: i < self.cursor,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Focus, NoopHooks};
    use retrace_scene::scene::Scene;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Appends to a shared log instead of touching the scene.
    #[derive(Debug)]
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl UndoableCommand for Probe {
        fn description(&self) -> String {
            self.name.to_owned()
        }
        fn commit(&mut self, _scene: &mut Scene) -> Option<Focus> {
            self.log.borrow_mut().push(format!("commit {}", self.name));
            None
        }
        fn revert(&mut self, _scene: &mut Scene) -> Option<Focus> {
            self.log.borrow_mut().push(format!("revert {}", self.name));
            None
        }
    }

    fn probe(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn UndoableCommand> {
        Box::new(Probe {
            name,
            log: Rc::clone(log),
        })
    }

    fn stack(capacity: usize) -> UndoStack {
        UndoStack::new(&UndoConfig::new("test", capacity))
    }

    // -- 1. Cursor movement -------------------------------------------------

    #[test]
    fn undo_redo_walk_the_cursor() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        let mut hooks = NoopHooks;
        let mut s = stack(10);
        let a = s.register_command(probe("a", &log));
        let b = s.register_command(probe("b", &log));

        let mut ctx = CommandContext::new(&mut scene, &mut hooks);
        assert_eq!(s.undo(&mut ctx).command_id(), Some(b));
        assert_eq!(s.undo(&mut ctx).command_id(), Some(a));
        assert!(s.undo(&mut ctx).is_nothing());
        assert_eq!(s.redo(&mut ctx).command_id(), Some(a));
        assert_eq!(s.redo(&mut ctx).command_id(), Some(b));
        assert!(s.redo(&mut ctx).is_nothing());

        assert_eq!(
            *log.borrow(),
            vec!["revert b", "revert a", "commit a", "commit b"]
        );
    }

    #[test]
    fn register_truncates_redo_tail() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        let mut hooks = NoopHooks;
        let mut s = stack(10);
        s.register_command(probe("a", &log));
        s.register_command(probe("b", &log));
        s.register_command(probe("c", &log));
        {
            let mut ctx = CommandContext::new(&mut scene, &mut hooks);
            s.undo(&mut ctx);
            s.undo(&mut ctx);
        }
        assert!(s.can_redo());
        let d = s.register_command(probe("d", &log));
        assert!(!s.can_redo());
        assert_eq!(s.len(), 2);
        assert_eq!(s.top_command_id(), Some(d));
        let names: Vec<String> = s.history().into_iter().map(|h| h.description).collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    // -- 2. Capacity --------------------------------------------------------

    #[test]
    fn capacity_evicts_oldest() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut s = stack(2);
        s.register_command(probe("a", &log));
        s.register_command(probe("b", &log));
        s.register_command(probe("c", &log));
        assert_eq!(s.len(), 2);
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.undo_description().as_deref(), Some("c"));
        let names: Vec<String> = s.history().into_iter().map(|h| h.description).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn zero_capacity_panics() {
        stack(0);
    }

    // -- 3. Maintenance -----------------------------------------------------

    #[test]
    fn pop_command_removes_exactly_one() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        let mut hooks = NoopHooks;
        let mut s = stack(10);
        let a = s.register_command(probe("a", &log));
        let b = s.register_command(probe("b", &log));
        let c = s.register_command(probe("c", &log));
        s.undo(&mut CommandContext::new(&mut scene, &mut hooks));

        assert!(s.pop_command(b));
        assert!(!s.pop_command(b));
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.top_command_id(), Some(a));
        assert_eq!(s.redo_description().as_deref(), Some("c"));
        assert!(log.borrow().iter().all(|entry| entry != "revert b"));

        assert!(s.pop_command(c));
        assert!(!s.can_redo());
    }

    #[test]
    fn history_marks_applied_entries() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        let mut hooks = NoopHooks;
        let mut s = stack(10);
        s.register_command(probe("a", &log));
        s.register_command(probe("b", &log));
        s.undo(&mut CommandContext::new(&mut scene, &mut hooks));

        let history = s.history();
        assert!(history[0].applied);
        assert!(!history[1].applied);
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains("\"applied\":false"));

        s.clear();
        assert!(s.is_empty());
        assert!(!s.can_undo());
        assert_eq!(s.top_command_id(), None);
    }
}
