use super::Depth;
use super::Trail;

/// A vector of values in which every assignment is journaled with the depth at which it happened,
/// so that [`ReversibleValues::restore_before`] can bring the vector back to an earlier depth.
#[derive(Clone, Debug)]
pub(crate) struct ReversibleValues<T> {
    trail: Trail<(usize, T)>,
    values: Vec<T>,
}

impl<T: Copy + PartialEq> ReversibleValues<T> {
    pub(crate) fn new(values: Vec<T>) -> Self {
        ReversibleValues {
            trail: Trail::default(),
            values,
        }
    }

    pub(crate) fn read(&self, index: usize) -> T {
        self.values[index]
    }

    pub(crate) fn assign(&mut self, index: usize, value: T, depth: Depth) {
        let old_value = self.values[index];
        if old_value == value {
            return;
        }

        self.trail.advance_to(depth);
        self.trail.push((index, old_value));
        self.values[index] = value;
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        for (index, old_value) in self.trail.undo_from(depth) {
            self.values[index] = old_value;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}
