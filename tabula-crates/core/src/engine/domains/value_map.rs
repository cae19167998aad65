/// The bijection between the value indices `0..size` of a domain and its values. Indices follow
/// the ascending order of the values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ValueMap {
    /// The values are `offset..offset + size`.
    Interval { offset: i32, size: usize },
    /// Arbitrary values, sorted and without duplicates.
    Sparse { values: Box<[i32]> },
}

impl ValueMap {
    pub(crate) fn interval(lower_bound: i32, upper_bound: i32) -> ValueMap {
        ValueMap::Interval {
            offset: lower_bound,
            size: (upper_bound as i64 - lower_bound as i64 + 1) as usize,
        }
    }

    /// Expects sorted, deduplicated values. Values which form an interval are stored as one.
    pub(crate) fn sparse(values: Vec<i32>) -> ValueMap {
        let is_interval = values
            .windows(2)
            .all(|pair| pair[0] as i64 + 1 == pair[1] as i64);
        if is_interval && !values.is_empty() {
            ValueMap::interval(values[0], values[values.len() - 1])
        } else {
            ValueMap::Sparse {
                values: values.into(),
            }
        }
    }

    pub(crate) fn size(&self) -> usize {
        match self {
            ValueMap::Interval { size, .. } => *size,
            ValueMap::Sparse { values } => values.len(),
        }
    }

    pub(crate) fn to_value(&self, index: usize) -> i32 {
        match self {
            ValueMap::Interval { offset, .. } => offset + index as i32,
            ValueMap::Sparse { values } => values[index],
        }
    }

    pub(crate) fn to_index(&self, value: i32) -> Option<usize> {
        match self {
            ValueMap::Interval { offset, size } => {
                let index = value as i64 - *offset as i64;
                (0..*size as i64)
                    .contains(&index)
                    .then_some(index as usize)
            }
            ValueMap::Sparse { values } => values.binary_search(&value).ok(),
        }
    }

    /// The smallest index whose value is at least `value`.
    pub(crate) fn lower_index(&self, value: i32) -> usize {
        match self {
            ValueMap::Interval { offset, size } => {
                (value as i64 - *offset as i64).clamp(0, *size as i64) as usize
            }
            ValueMap::Sparse { values } => values.partition_point(|&v| v < value),
        }
    }

    /// Whether index `i` denotes value `i` for every index.
    pub(crate) fn indexes_match_values(&self) -> bool {
        matches!(self, ValueMap::Interval { offset: 0, .. })
    }
}
