//! A set of small integers which can be restored to the state it had at any earlier depth.
//!
//! # Theoretical
//! The structure is a sparse set: the present elements occupy the first [`ReversibleSet::len`]
//! positions of a dense array and a second array maps every element to its position. Removing an
//! element swaps it to the end of the present region and shrinks that region by one; the element
//! stays in the dense array, right behind the present region.
//!
//! Because removed elements are never overwritten, undoing a removal only requires growing the
//! present region again. Every removal is logged together with the depth at which it happened,
//! and [`ReversibleSet::restore_before`] pops the log until it reaches a removal made at a
//! shallower depth. The resulting set is equal to the set before those removals (the order in the
//! present region may differ).
//!
//! # Practical
//! The layout follows [\[1\]](https://hal.science/hal-01339250/document). A useful property of the
//! layout is that the removed elements sit in the dense array in reverse removal order, which is
//! what [`ReversibleSet::removed_since`] exposes to the filtering algorithms that work on deltas.
//!
//! # Bibliography
//! \[1\] V. le C. de Saint-Marcq, P. Schaus, C. Solnon, and C. Lecoutre, ‘Sparse-sets for domain
//! implementation’, in CP workshop on Techniques foR Implementing Constraint programming Systems
//! (TRICS), 2013, pp. 1–10.

use crate::tabula_assert_moderate;
use crate::tabula_assert_simple;

/// A fixed-capacity set over `0..capacity` with O(1) membership, O(1) removal and exact
/// restoration by depth. See the module level documentation for more information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReversibleSet {
    /// The number of elements which are currently present; the first `size` elements of
    /// [`dense`][ReversibleSet::dense] are present.
    size: usize,
    /// The elements, present ones first.
    dense: Vec<usize>,
    /// For each element its position in [`dense`][ReversibleSet::dense].
    positions: Vec<usize>,
    /// Every removal as `(depth, element)`, most recent last.
    removals: Vec<(usize, usize)>,
}

impl ReversibleSet {
    /// Creates a set containing every element of `0..capacity`.
    pub fn new(capacity: usize) -> ReversibleSet {
        ReversibleSet {
            size: capacity,
            dense: (0..capacity).collect(),
            positions: (0..capacity).collect(),
            removals: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, element: usize) -> bool {
        element < self.positions.len() && self.positions[element] < self.size
    }

    /// Returns the element at `position` of the present region.
    pub fn get(&self, position: usize) -> usize {
        tabula_assert_simple!(position < self.size);
        self.dense[position]
    }

    /// The present elements, in the (arbitrary) order of the dense array.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense[..self.size].iter().copied()
    }

    /// The present elements as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.dense[..self.size]
    }

    /// Removes `element` at `depth`.
    ///
    /// Removing an absent element, or removing at a depth below the depth of the last logged
    /// removal, is a programming error.
    pub fn remove(&mut self, element: usize, depth: usize) {
        tabula_assert_simple!(
            self.contains(element),
            "Element {element} is not part of the set"
        );
        let position = self.positions[element];
        self.remove_at_position(position, depth);
    }

    /// Removes the element located at `position` of the present region.
    ///
    /// The last present element is moved to `position`, so scanning the present region from its
    /// end towards its start while removing is safe.
    pub fn remove_at_position(&mut self, position: usize, depth: usize) {
        tabula_assert_simple!(position < self.size, "Reversible set underflow");
        tabula_assert_simple!(
            self.removals.last().is_none_or(|&(last, _)| last <= depth),
            "Removal at depth {depth} after a removal at a deeper depth"
        );

        let element = self.dense[position];
        self.size -= 1;
        self.swap(position, self.size);
        self.removals.push((depth, element));
    }

    /// Undoes every removal made at a depth greater than or equal to `depth`.
    pub fn restore_before(&mut self, depth: usize) {
        while let Some(&(removal_depth, element)) = self.removals.last() {
            if removal_depth < depth {
                break;
            }
            let _ = self.removals.pop();
            tabula_assert_moderate!(self.dense[self.size] == element);
            self.size += 1;
        }
    }

    /// All elements which are not present, most recently removed first.
    pub fn removed(&self) -> &[usize] {
        &self.dense[self.size..]
    }

    /// The elements removed since the set had `previous_size` elements, most recently removed
    /// first.
    pub fn removed_since(&self, previous_size: usize) -> &[usize] {
        tabula_assert_simple!(previous_size >= self.size);
        &self.dense[self.size..previous_size]
    }

    /// The element that was removed last, if any.
    pub fn last_removed(&self) -> Option<usize> {
        self.removals.last().map(|&(_, element)| element)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.dense.swap(i, j);
        self.positions[self.dense[i]] = i;
        self.positions[self.dense[j]] = j;
    }
}
