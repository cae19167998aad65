use super::relation::matches;
use super::IndexRelation;
use super::STAR;

/// A relation stored as a flat list of index tuples, sorted lexicographically.
///
/// Filters keep their own reversible subset of the positions in this list, so one table can be
/// shared by every constraint built from the same relation over domains of the same sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    domain_sizes: Box<[usize]>,
    tuples: Vec<Box<[usize]>>,
    starred: bool,
    positive: bool,
}

impl Table {
    pub(crate) fn new(relation: IndexRelation) -> Table {
        let starred = relation.is_starred();
        Table {
            domain_sizes: relation.domain_sizes.into(),
            tuples: relation.tuples.into_iter().map(Into::into).collect(),
            starred,
            positive: relation.positive,
        }
    }

    pub fn arity(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Whether some tuple contains [`STAR`].
    pub fn is_starred(&self) -> bool {
        self.starred
    }

    /// Whether the tuples are the allowed ones rather than the forbidden ones.
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    pub fn tuple(&self, position: usize) -> &[usize] {
        &self.tuples[position]
    }

    pub fn tuples(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.tuples.iter().map(|tuple| &tuple[..])
    }

    /// Whether the fully instantiated `tuple` belongs to the relation.
    pub fn check_indexes(&self, tuple: &[usize]) -> bool {
        self.contains(tuple) == self.positive
    }

    fn contains(&self, tuple: &[usize]) -> bool {
        if self.starred {
            self.tuples.iter().any(|pattern| matches(tuple, pattern))
        } else {
            self.tuples
                .binary_search_by(|listed| listed[..].cmp(tuple))
                .is_ok()
        }
    }

    /// Removes the listed tuple equal to `tuple` (stars included). Returns whether it was listed.
    pub(crate) fn remove_tuple(&mut self, tuple: &[usize]) -> bool {
        match self
            .tuples
            .binary_search_by(|listed| listed[..].cmp(tuple))
        {
            Ok(position) => {
                let _ = self.tuples.remove(position);
                self.starred = self.tuples.iter().any(|tuple| tuple.contains(&STAR));
                true
            }
            Err(_) => false,
        }
    }
}
