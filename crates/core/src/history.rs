//! Undo/redo history of form snapshots.
//!
//! The log holds whole immutable snapshots and a cursor pointing at the
//! current one. Recording after an undo discards the redo branch. Once the
//! log is full the oldest snapshot is evicted.

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 20;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    max_entries: usize,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> History<T> {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// A history holding at most `depth` snapshots (minimum 1).
    pub fn with_depth(depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: depth.max(1),
        }
    }

    /// Append a snapshot and make it current.
    pub fn record(&mut self, snapshot: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);

        // Limit history size
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
