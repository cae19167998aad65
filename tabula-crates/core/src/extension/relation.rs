use log::warn;

use crate::basic_types::ConstraintOperationError;
use crate::containers::HashSet;
use crate::engine::Domain;

/// The index denoting "any value" in a tuple of value indices.
///
/// No domain can have this many values, so the sentinel never collides with a real index.
pub const STAR: usize = usize::MAX;

/// The value denoting "any value" in a tuple of values. Domains may not contain it.
pub const STAR_VALUE: i32 = i32::MAX;

/// A relation given as tuples of values, either listing the allowed tuples (positive) or the
/// forbidden ones (negative). A tuple entry equal to [`STAR_VALUE`] matches every value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    tuples: Vec<Vec<i32>>,
    positive: bool,
}

impl Relation {
    /// The relation containing exactly the given tuples.
    pub fn allowed<Tuple: Into<Vec<i32>>>(tuples: impl IntoIterator<Item = Tuple>) -> Relation {
        Relation {
            tuples: tuples.into_iter().map(Into::into).collect(),
            positive: true,
        }
    }

    /// The relation containing every tuple except the given ones.
    pub fn forbidden<Tuple: Into<Vec<i32>>>(tuples: impl IntoIterator<Item = Tuple>) -> Relation {
        Relation {
            tuples: tuples.into_iter().map(Into::into).collect(),
            positive: false,
        }
    }

    pub fn tuples(&self) -> &[Vec<i32>] {
        &self.tuples
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn is_starred(&self) -> bool {
        self.tuples
            .iter()
            .any(|tuple| tuple.contains(&STAR_VALUE))
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

/// A relation translated to value indices against the initial domains of a scope.
///
/// Tuples are sorted lexicographically and free of duplicates. Tuples mentioning a value which is
/// not in the initial domain of its variable can never match and are dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct IndexRelation {
    pub(crate) domain_sizes: Vec<usize>,
    pub(crate) tuples: Vec<Vec<usize>>,
    pub(crate) positive: bool,
}

impl IndexRelation {
    pub(crate) fn from_values(
        relation: &Relation,
        domains: &[&Domain],
    ) -> Result<IndexRelation, ConstraintOperationError> {
        let arity = domains.len();
        let mut tuples = Vec::with_capacity(relation.len());

        'tuples: for (position, tuple) in relation.tuples().iter().enumerate() {
            if tuple.len() != arity {
                return Err(ConstraintOperationError::ArityMismatch {
                    tuple: position,
                    expected: arity,
                    found: tuple.len(),
                });
            }

            let mut indexes = Vec::with_capacity(arity);
            for (&value, domain) in tuple.iter().zip(domains) {
                if value == STAR_VALUE {
                    indexes.push(STAR);
                    continue;
                }
                match domain.to_index(value) {
                    Some(index) => indexes.push(index),
                    None => continue 'tuples,
                }
            }
            tuples.push(indexes);
        }

        tuples.sort_unstable();
        tuples.dedup();

        Ok(IndexRelation {
            domain_sizes: domains.iter().map(|domain| domain.initial_size()).collect(),
            tuples,
            positive: relation.is_positive(),
        })
    }

    pub(crate) fn arity(&self) -> usize {
        self.domain_sizes.len()
    }

    pub(crate) fn is_starred(&self) -> bool {
        self.tuples.iter().any(|tuple| tuple.contains(&STAR))
    }

    /// The number of tuples over the initial domains, saturating at [`u64::MAX`].
    pub(crate) fn cartesian_size(&self) -> u64 {
        n_valid_tuples_bounded(self.domain_sizes.iter().copied())
    }

    /// The relation with the opposite polarity listing the tuples this one does not list. The
    /// cartesian product of the domains is enumerated, so this is only meant for small products.
    pub(crate) fn complement(&self) -> IndexRelation {
        let (starred, plain): (Vec<&Vec<usize>>, Vec<&Vec<usize>>) =
            self.tuples.iter().partition(|tuple| tuple.contains(&STAR));
        let plain: HashSet<&[usize]> = plain.into_iter().map(Vec::as_slice).collect();
        let is_listed = |tuple: &[usize]| {
            plain.contains(tuple) || starred.iter().any(|pattern| matches(tuple, pattern))
        };

        let mut tuples = Vec::new();
        let mut current = vec![0; self.arity()];
        if self.domain_sizes.iter().all(|&size| size > 0) {
            loop {
                if !is_listed(&current) {
                    tuples.push(current.clone());
                }
                if !advance(&mut current, &self.domain_sizes) {
                    break;
                }
            }
        }

        if tuples.is_empty() {
            warn!("complementing a relation over {:?} gives no tuples", self.domain_sizes);
        }

        IndexRelation {
            domain_sizes: self.domain_sizes.clone(),
            tuples,
            positive: !self.positive,
        }
    }
}

/// Moves `tuple` to the next tuple in lexicographic order; returns false after the last one.
fn advance(tuple: &mut [usize], domain_sizes: &[usize]) -> bool {
    for position in (0..tuple.len()).rev() {
        tuple[position] += 1;
        if tuple[position] < domain_sizes[position] {
            return true;
        }
        tuple[position] = 0;
    }
    false
}

/// The product of the given domain sizes, saturating at [`u64::MAX`].
pub(crate) fn n_valid_tuples_bounded(sizes: impl IntoIterator<Item = usize>) -> u64 {
    sizes
        .into_iter()
        .fold(1_u64, |product, size| product.saturating_mul(size as u64))
}

/// Whether the fully instantiated `tuple` is matched by `pattern`, which may contain [`STAR`].
pub(crate) fn matches(tuple: &[usize], pattern: &[usize]) -> bool {
    tuple
        .iter()
        .zip(pattern)
        .all(|(&index, &expected)| expected == STAR || index == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ValueMap;

    fn domains(values: &[Vec<i32>]) -> Vec<Domain> {
        values
            .iter()
            .map(|values| Domain::new(ValueMap::sparse(values.clone())))
            .collect()
    }

    #[test]
    fn values_are_translated_to_sorted_unique_indexes() {
        let domains = domains(&[vec![10, 20, 30], vec![-1, 1]]);
        let scope = domains.iter().collect::<Vec<_>>();
        let relation = Relation::allowed([[30, 1], [10, -1], [30, 1], [20, 5]]);

        let indexes = IndexRelation::from_values(&relation, &scope).expect("arity matches");

        assert_eq!(indexes.tuples, vec![vec![0, 0], vec![2, 1]]);
        assert_eq!(indexes.domain_sizes, vec![3, 2]);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let domains = domains(&[vec![0, 1], vec![0, 1]]);
        let scope = domains.iter().collect::<Vec<_>>();
        let relation = Relation::allowed(vec![vec![0, 1], vec![0, 1, 1]]);

        assert_eq!(
            IndexRelation::from_values(&relation, &scope),
            Err(ConstraintOperationError::ArityMismatch {
                tuple: 1,
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn stars_are_kept_as_wildcards() {
        let domains = domains(&[vec![0, 1, 2], vec![0, 1]]);
        let scope = domains.iter().collect::<Vec<_>>();
        let relation = Relation::allowed([[STAR_VALUE, 1], [0, 0]]);

        let indexes = IndexRelation::from_values(&relation, &scope).expect("arity matches");
        assert!(indexes.is_starred());
        assert_eq!(indexes.tuples, vec![vec![0, 0], vec![STAR, 1]]);
    }

    #[test]
    fn complementing_skips_every_tuple_matched_by_a_star() {
        let domains = domains(&[vec![0, 1, 2], vec![0, 1]]);
        let scope = domains.iter().collect::<Vec<_>>();
        let relation = Relation::forbidden([[STAR_VALUE, 1], [2, 0]]);

        let complement = IndexRelation::from_values(&relation, &scope)
            .expect("arity matches")
            .complement();

        assert!(complement.positive);
        assert!(!complement.is_starred());
        assert_eq!(complement.tuples, vec![vec![0, 0], vec![1, 0]]);
    }

    #[test]
    fn complement_flips_polarity_and_tuples() {
        let domains = domains(&[vec![0, 1], vec![0, 1]]);
        let scope = domains.iter().collect::<Vec<_>>();
        let relation = Relation::forbidden([[0, 0], [1, 1]]);

        let complement = IndexRelation::from_values(&relation, &scope)
            .expect("arity matches")
            .complement();

        assert!(complement.positive);
        assert_eq!(complement.tuples, vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(complement.cartesian_size(), 4);
    }

    #[test]
    fn bounded_product_saturates() {
        assert_eq!(n_valid_tuples_bounded([2, 3, 4]), 24);
        assert_eq!(n_valid_tuples_bounded([usize::MAX, usize::MAX]), u64::MAX);
        assert_eq!(n_valid_tuples_bounded(std::iter::empty()), 1);
    }
}
