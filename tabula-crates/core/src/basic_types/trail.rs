use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::tabula_assert_simple;

/// An undo log split into checkpoints. Entries are pushed into the current checkpoint and can be
/// drained, most recent first, for every checkpoint from a given one onwards.
///
/// Owners of a trail usually map checkpoints one-to-one onto search depths; since an owner is
/// only touched at the depths where it changes, [`Trail::advance_to`] opens the missing
/// checkpoints lazily.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_checkpoint: usize,
    /// At index i is the position where the i-th checkpoint ends (exclusive) on the trail
    trail_delimiter: Vec<usize>,
    trail: Vec<T>,
}

// We explicitly implement the Default and not as a macro, because we want to avoid imposing Default
// on the generic type T.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_checkpoint: Default::default(),
            trail_delimiter: Default::default(),
            trail: Default::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Trail {
            current_checkpoint: 0,
            trail_delimiter: Vec::new(),
            trail: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.current_checkpoint += 1;
        self.trail_delimiter.push(self.trail.len());
    }

    /// Opens checkpoints until `checkpoint` is the current one.
    pub(crate) fn advance_to(&mut self, checkpoint: usize) {
        tabula_assert_simple!(
            checkpoint >= self.current_checkpoint,
            "Trail written at checkpoint {checkpoint} while at checkpoint {}",
            self.current_checkpoint
        );
        while self.current_checkpoint < checkpoint {
            self.new_checkpoint();
        }
    }

    #[cfg(test)]
    pub(crate) fn get_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// Removes every entry pushed at `checkpoint` or later and returns them, most recent first.
    /// Afterwards the current checkpoint is the one preceding `checkpoint`.
    pub(crate) fn undo_from(&mut self, checkpoint: usize) -> Rev<Drain<'_, T>> {
        let start = if checkpoint == 0 {
            0
        } else if checkpoint > self.current_checkpoint {
            self.trail.len()
        } else {
            self.trail_delimiter[checkpoint - 1]
        };

        let new_checkpoint = checkpoint.saturating_sub(1).min(self.current_checkpoint);
        self.current_checkpoint = new_checkpoint;
        self.trail_delimiter.truncate(new_checkpoint);
        self.trail.drain(start..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}
