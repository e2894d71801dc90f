use crate::domain::models::TimeBlock;

/// Maximum number of retained snapshots; the oldest is evicted first.
pub const HISTORY_CAPACITY: usize = 200;

/// Bounded, branch-discarding undo/redo stack of full store snapshots.
/// Snapshots are trusted value copies of previously validated states, so
/// applying one never re-runs placement validation.
#[derive(Debug, Default)]
pub struct HistoryManager {
    snapshots: Vec<Vec<TimeBlock>>,
    cursor: usize,
}

impl HistoryManager {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor < self.snapshots.len() - 1
    }

    /// Records a committed state: truncates the redo branch, appends, evicts
    /// the oldest snapshot past capacity, and moves the cursor to the end.
    pub fn commit(&mut self, snapshot: Vec<TimeBlock>) {
        if !self.snapshots.is_empty() && self.cursor < self.snapshots.len() - 1 {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);
        if self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) -> Option<&[TimeBlock]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&[TimeBlock]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }
}
