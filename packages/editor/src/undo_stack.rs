//! # Undo/Redo Stack
//!
//! History of applied batches. Each entry stores the forward ops that took
//! effect and the inverse batch computed when they were applied.
//!
//! ## Design
//!
//! - Undo takes the newest entry, the caller applies its inverse, then hands
//!   it back with [`UndoStack::push_redo`]
//! - Redo reapplies the forward ops
//! - New batches clear the redo stack
//! - Batches sharing a group id inside the coalescing window merge into one
//!   entry (forward appended, inverse prepended)
//!
//! The stack never touches the document; [`crate::DocumentStore`] does.

use crate::patch::PatchOp;
use std::time::{Duration, Instant};

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Ops in application order
    pub forward: Vec<PatchOp>,

    /// Batch that restores the state before `forward`
    pub inverse: Vec<PatchOp>,

    /// Coalescing group, e.g. one id per drag gesture
    pub group: Option<String>,

    /// When the last batch merged into this entry was applied
    pub last_at: Instant,

    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(forward: Vec<PatchOp>, inverse: Vec<PatchOp>, at: Instant) -> Self {
        Self {
            forward,
            inverse,
            group: None,
            last_at: at,
            description: None,
        }
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,

    /// Most recent last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    coalesce_window: Duration,
}

impl UndoStack {
    /// 100 levels, two second coalescing window
    pub fn new() -> Self {
        Self::with_limits(100, Duration::from_millis(2000))
    }

    pub fn with_limits(max_levels: usize, coalesce_window: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            coalesce_window,
        }
    }

    /// Record a freshly applied batch. Returns true when it merged into the
    /// previous entry.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        self.redo_stack.clear();

        if let Some(last) = self.undo_stack.last_mut() {
            let same_group = entry.group.is_some() && entry.group == last.group;
            let within_window = entry
                .last_at
                .checked_duration_since(last.last_at)
                .is_some_and(|elapsed| elapsed <= self.coalesce_window);
            if same_group && within_window {
                let HistoryEntry {
                    forward,
                    mut inverse,
                    last_at,
                    description,
                    ..
                } = entry;
                last.forward.extend(forward);
                inverse.append(&mut last.inverse);
                last.inverse = inverse;
                last.last_at = last_at;
                if description.is_some() {
                    last.description = description;
                }
                return true;
            }
        }

        self.undo_stack.push(entry);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        false
    }

    /// Take the newest entry to undo
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop()
    }

    /// Take the newest undone entry to redo
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    /// Return an entry whose inverse was applied
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    /// Return an entry after it was undone or redone, without clearing redo.
    /// Redone entries never coalesce with later batches.
    pub fn push_undo(&mut self, mut entry: HistoryEntry) {
        entry.group = None;
        self.undo_stack.push(entry);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
