use crate::domain::models::TimeBlock;
use chrono::NaiveDate;

/// Authoritative, insertion-ordered collection of placed blocks. Insertion
/// order is the tie-breaker consumed by the month projection's per-day cap.
/// Invariant enforcement (bounds, overlap) lives with the engine and
/// validator, not here.
#[derive(Debug, Default, Clone)]
pub struct TimeBlockStore {
    blocks: Vec<TimeBlock>,
}

impl TimeBlockStore {
    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TimeBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn insert(&mut self, block: TimeBlock) {
        self.blocks.push(block);
    }

    pub fn replace(&mut self, id: &str, block: TimeBlock) -> bool {
        match self.blocks.iter_mut().find(|stored| stored.id == id) {
            Some(stored) => {
                *stored = block;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<TimeBlock> {
        let index = self.blocks.iter().position(|block| block.id == id)?;
        Some(self.blocks.remove(index))
    }

    /// Wholesale replacement, used by undo/redo and JSON import.
    pub fn replace_all(&mut self, blocks: Vec<TimeBlock>) {
        self.blocks = blocks;
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &TimeBlock> {
        self.blocks.iter().filter(move |block| block.date == date)
    }

    pub fn snapshot(&self) -> Vec<TimeBlock> {
        self.blocks.clone()
    }
}
