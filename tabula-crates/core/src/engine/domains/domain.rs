use std::ops::RangeInclusive;

use super::ValueMap;
use crate::basic_types::Depth;
use crate::basic_types::EmptyDomain;
use crate::containers::ReversibleSet;
use crate::tabula_assert_simple;

/// The remaining candidate values of a variable.
///
/// A domain stores value *indices* in a [`ReversibleSet`]; the bijection between indices and
/// values is ascending, so index order and value order coincide. Every removal is stamped with
/// the depth it is made at and undone by [`Domain::restore_before`].
///
/// Removals never leave a domain empty: a removal that would take away the last value is refused
/// and reported as [`EmptyDomain`]. Bulk removals check this up front, so they either apply in
/// full or not at all.
#[derive(Clone, Debug)]
pub struct Domain {
    indices: ReversibleSet,
    values: ValueMap,
}

impl Domain {
    pub(crate) fn new(values: ValueMap) -> Domain {
        Domain {
            indices: ReversibleSet::new(values.size()),
            values,
        }
    }

    /// The number of values the domain started with.
    pub fn initial_size(&self) -> usize {
        self.indices.capacity()
    }

    pub fn size(&self) -> usize {
        self.indices.len()
    }

    pub fn is_fixed(&self) -> bool {
        self.size() == 1
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.indices.contains(index)
    }

    pub fn contains(&self, value: i32) -> bool {
        self.to_index(value)
            .is_some_and(|index| self.contains_index(index))
    }

    /// The index of `value` in the initial domain, if the value was ever part of it.
    pub fn to_index(&self, value: i32) -> Option<usize> {
        self.values.to_index(value)
    }

    pub fn to_value(&self, index: usize) -> i32 {
        self.values.to_value(index)
    }

    /// Whether every index denotes the value with the same number.
    pub fn indexes_match_values(&self) -> bool {
        self.values.indexes_match_values()
    }

    /// The present indices, in no particular order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter()
    }

    /// The present values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.indices().map(|index| self.to_value(index))
    }

    /// The present values in ascending order.
    pub fn sorted_values(&self) -> Vec<i32> {
        let mut values = self.values().collect::<Vec<_>>();
        values.sort_unstable();
        values
    }

    /// The smallest present index. Takes time linear in the size of the domain.
    ///
    /// A domain always keeps at least one value, since removals which would empty it are
    /// refused.
    pub fn first_index(&self) -> usize {
        self.indices().min().expect("domains are never empty")
    }

    /// The largest present index, in linear time; see [`Domain::first_index`].
    pub fn last_index(&self) -> usize {
        self.indices().max().expect("domains are never empty")
    }

    pub fn min_value(&self) -> i32 {
        self.to_value(self.first_index())
    }

    pub fn max_value(&self) -> i32 {
        self.to_value(self.last_index())
    }

    /// The single remaining index of a fixed domain.
    pub fn fixed_index(&self) -> Option<usize> {
        self.is_fixed().then(|| self.indices.get(0))
    }

    /// The indices removed since the domain had `previous_size` values, most recent first.
    pub fn removed_since(&self, previous_size: usize) -> &[usize] {
        self.indices.removed_since(previous_size)
    }

    pub fn last_removed(&self) -> Option<usize> {
        self.indices.last_removed()
    }

    pub fn remove_index(&mut self, index: usize, depth: Depth) -> Result<(), EmptyDomain> {
        tabula_assert_simple!(self.contains_index(index));
        if self.size() == 1 {
            return Err(EmptyDomain);
        }
        self.indices.remove(index, depth);
        Ok(())
    }

    /// Removes a value which must currently be present.
    pub fn remove_value(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        let index = self.to_index(value);
        tabula_assert_simple!(index.is_some(), "{value} was never part of the domain");
        match index {
            Some(index) => self.remove_index(index, depth),
            None => Ok(()),
        }
    }

    /// Removes `value` when it is present. Returns whether the domain changed.
    pub fn remove_value_if_present(
        &mut self,
        value: i32,
        depth: Depth,
    ) -> Result<bool, EmptyDomain> {
        match self.to_index(value) {
            Some(index) if self.contains_index(index) => {
                self.remove_index(index, depth)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn reduce_to_index(&mut self, index: usize, depth: Depth) -> Result<(), EmptyDomain> {
        if !self.contains_index(index) {
            return Err(EmptyDomain);
        }
        self.remove_indexes_checking(|other| other != index, depth)
            .map(|_| ())
    }

    pub fn reduce_to_value(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        match self.to_index(value) {
            Some(index) => self.reduce_to_index(index, depth),
            None => Err(EmptyDomain),
        }
    }

    pub fn remove_values_lt(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        let limit = self.values.lower_index(value);
        self.remove_indexes_checking(|index| index < limit, depth)
            .map(|_| ())
    }

    pub fn remove_values_le(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        match value.checked_add(1) {
            Some(next) => self.remove_values_lt(next, depth),
            None => self.remove_indexes_checking(|_| true, depth).map(|_| ()),
        }
    }

    pub fn remove_values_ge(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        let limit = self.values.lower_index(value);
        self.remove_indexes_checking(|index| index >= limit, depth)
            .map(|_| ())
    }

    pub fn remove_values_gt(&mut self, value: i32, depth: Depth) -> Result<(), EmptyDomain> {
        match value.checked_add(1) {
            Some(next) => self.remove_values_ge(next, depth),
            None => Ok(()),
        }
    }

    pub fn remove_values_in_range(
        &mut self,
        range: RangeInclusive<i32>,
        depth: Depth,
    ) -> Result<(), EmptyDomain> {
        let values = &self.values;
        let in_range = |index| range.contains(&values.to_value(index));
        remove_from(&mut self.indices, in_range, depth).map(|_| ())
    }

    pub fn remove_values_in(&mut self, values: &[i32], depth: Depth) -> Result<(), EmptyDomain> {
        let map = &self.values;
        remove_from(
            &mut self.indices,
            |index| values.contains(&map.to_value(index)),
            depth,
        )
        .map(|_| ())
    }

    pub fn remove_values_not_in(
        &mut self,
        values: &[i32],
        depth: Depth,
    ) -> Result<(), EmptyDomain> {
        let map = &self.values;
        remove_from(
            &mut self.indices,
            |index| !values.contains(&map.to_value(index)),
            depth,
        )
        .map(|_| ())
    }

    /// Removes every value `v` with `|v - value| > distance`.
    pub fn remove_values_at_distance_gt(
        &mut self,
        value: i32,
        distance: u32,
        depth: Depth,
    ) -> Result<(), EmptyDomain> {
        let map = &self.values;
        remove_from(
            &mut self.indices,
            |index| (map.to_value(index) as i64 - value as i64).unsigned_abs() > distance as u64,
            depth,
        )
        .map(|_| ())
    }

    /// Removes every present index for which `predicate` holds and returns how many were removed.
    pub fn remove_indexes_checking(
        &mut self,
        predicate: impl FnMut(usize) -> bool,
        depth: Depth,
    ) -> Result<usize, EmptyDomain> {
        remove_from(&mut self.indices, predicate, depth)
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        self.indices.restore_before(depth);
    }
}

fn remove_from(
    indices: &mut ReversibleSet,
    mut predicate: impl FnMut(usize) -> bool,
    depth: Depth,
) -> Result<usize, EmptyDomain> {
    let to_remove = indices
        .iter()
        .filter(|&index| predicate(index))
        .collect::<Vec<_>>();
    if to_remove.len() == indices.len() {
        return Err(EmptyDomain);
    }
    for &index in to_remove.iter() {
        indices.remove(index, depth);
    }
    Ok(to_remove.len())
}

#[cfg(test)]
mod tests {
    use super::Domain;
    use crate::basic_types::EmptyDomain;
    use crate::engine::domains::ValueMap;

    fn interval(lower_bound: i32, upper_bound: i32) -> Domain {
        Domain::new(ValueMap::interval(lower_bound, upper_bound))
    }

    #[test]
    fn removing_the_last_value_is_refused() {
        let mut domain = interval(3, 4);
        domain.remove_value(3, 0).expect("non-empty");

        assert_eq!(domain.remove_value(4, 1), Err(EmptyDomain));
        assert_eq!(domain.sorted_values(), vec![4]);
    }

    #[test]
    fn bounds_remain_defined_after_a_refused_wipeout() {
        let mut domain = Domain::new(ValueMap::sparse(vec![-2, 5, 9]));
        domain.remove_values_in(&[-2, 9], 0).expect("non-empty");

        assert_eq!(domain.remove_value(5, 1), Err(EmptyDomain));
        assert_eq!(domain.remove_values_le(20, 1), Err(EmptyDomain));
        assert_eq!(domain.first_index(), 1);
        assert_eq!(domain.last_index(), 1);
        assert_eq!((domain.min_value(), domain.max_value()), (5, 5));
    }

    #[test]
    fn bound_removals() {
        let mut domain = interval(0, 9);
        domain.remove_values_lt(2, 0).expect("non-empty");
        domain.remove_values_gt(7, 0).expect("non-empty");
        domain.remove_values_le(3, 1).expect("non-empty");
        domain.remove_values_ge(7, 1).expect("non-empty");

        assert_eq!(domain.sorted_values(), vec![4, 5, 6]);
        assert_eq!(domain.min_value(), 4);
        assert_eq!(domain.max_value(), 6);
    }

    #[test]
    fn bulk_removal_that_would_wipe_out_changes_nothing() {
        let mut domain = interval(1, 5);

        assert_eq!(domain.remove_values_in_range(0..=10, 0), Err(EmptyDomain));
        assert_eq!(domain.size(), 5);
    }

    #[test]
    fn set_removals_on_sparse_domains() {
        let mut domain = Domain::new(ValueMap::sparse(vec![-4, 0, 3, 8, 11]));
        domain.remove_values_in(&[0, 11, 42], 0).expect("non-empty");
        assert_eq!(domain.sorted_values(), vec![-4, 3, 8]);

        domain.remove_values_not_in(&[3, 8], 1).expect("non-empty");
        assert_eq!(domain.sorted_values(), vec![3, 8]);
        assert!(!domain.contains(0));
        assert!(!domain.contains(5));
    }

    #[test]
    fn distance_removal() {
        let mut domain = interval(0, 10);
        domain
            .remove_values_at_distance_gt(5, 2, 0)
            .expect("non-empty");

        assert_eq!(domain.sorted_values(), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn reduce_to_keeps_exactly_one_value() {
        let mut domain = interval(0, 4);
        domain.reduce_to_value(2, 1).expect("present");

        assert_eq!(domain.fixed_index(), Some(2));
        assert_eq!(domain.reduce_to_value(3, 1), Err(EmptyDomain));
    }

    #[test]
    fn restoration_is_exact() {
        let mut domain = interval(0, 6);
        domain.remove_value(1, 1).expect("non-empty");
        let after_depth_one = domain.sorted_values();
        domain.remove_values_ge(4, 2).expect("non-empty");
        domain.remove_value(0, 3).expect("non-empty");

        domain.restore_before(2);
        assert_eq!(domain.sorted_values(), after_depth_one);

        domain.restore_before(1);
        assert_eq!(domain.size(), domain.initial_size());
    }

    #[test]
    fn removed_since_reports_the_delta() {
        let mut domain = interval(0, 4);
        let size = domain.size();
        domain.remove_value(3, 0).expect("non-empty");
        domain.remove_value(1, 0).expect("non-empty");

        assert_eq!(domain.removed_since(size), &[1, 3]);
        assert_eq!(domain.last_removed(), Some(1));
    }

    #[test]
    fn conditional_removal_reports_changes() {
        let mut domain = interval(0, 2);

        assert_eq!(domain.remove_value_if_present(7, 0), Ok(false));
        assert_eq!(domain.remove_value_if_present(1, 0), Ok(true));
        assert_eq!(domain.remove_value_if_present(1, 0), Ok(false));
    }
}
