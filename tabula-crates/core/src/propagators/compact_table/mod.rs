//! Compact table: filtering of a positive relation with bitsets of tuples.
//!
//! The propagator maintains the set of tuples which are still valid as a bitset over the tuples
//! of a [`BitsetTable`]. When domains shrink, the tuples compatible only with removed values are
//! cleared from the bitset, word by word, after which every remaining value must intersect the
//! bitset through its mask to keep its support.
mod word_journal;

use std::rc::Rc;

use word_journal::WordJournal;

use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
use crate::basic_types::ReversibleValues;
use crate::containers::ReversibleSet;
use crate::create_statistics_struct;
use crate::engine::VariableId;
use crate::extension::BitsetTable;
use crate::propagation::FilteringComplexity;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::tabula_assert_advanced;

create_statistics_struct!(CompactTableStatistics {
    num_filter_calls: usize,
    num_words_cleared: usize,
    num_residue_misses: usize,
});

#[derive(Clone, Debug)]
pub(crate) struct CompactTableArgs {
    pub(crate) scope: Box<[VariableId]>,
    pub(crate) table: Rc<BitsetTable>,
}

impl PropagatorConstructor for CompactTableArgs {
    type PropagatorImpl = CompactTablePropagator;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> CompactTablePropagator {
        let CompactTableArgs { scope, table } = self;
        context.register_scope(&scope);

        let num_words = table.num_words();
        let mut current = vec![u64::MAX; num_words].into_boxed_slice();
        if let Some(last) = current.last_mut() {
            *last = table.last_word_mask();
        }

        // Every tuple is valid initially, so the first word with a compatible tuple is a support.
        let residues = table
            .domain_sizes()
            .iter()
            .enumerate()
            .map(|(variable, &size)| {
                (0..size)
                    .map(|index| {
                        (0..num_words)
                            .find(|&word| table.mask(variable, index).word(word) & current[word] != 0)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        CompactTablePropagator {
            current,
            non_zero_words: ReversibleSet::new(num_words),
            journal: WordJournal::new(num_words),
            // Every variable counts as changed in the first call.
            last_sizes: ReversibleValues::new(vec![usize::MAX; scope.len()]),
            residues,
            to_eliminate: vec![0; num_words].into(),
            kept: vec![0; num_words].into(),
            changed: Vec::with_capacity(scope.len()),
            scope,
            table,
            statistics: CompactTableStatistics::default(),
        }
    }
}

/// The compact table propagator. See the module level documentation for more information.
#[derive(Clone, Debug)]
pub(crate) struct CompactTablePropagator {
    scope: Box<[VariableId]>,
    table: Rc<BitsetTable>,
    /// Bit `i` is set if tuple `i` is valid.
    current: Box<[u64]>,
    /// The indices of the words of `current` which are not zero.
    non_zero_words: ReversibleSet,
    journal: WordJournal,
    last_sizes: ReversibleValues<usize>,
    /// For every variable and value index, a word in which the value last had a support.
    residues: Box<[Box<[usize]>]>,

    // Scratch space of a single call.
    to_eliminate: Box<[u64]>,
    kept: Box<[u64]>,
    changed: Vec<usize>,

    statistics: CompactTableStatistics,
}

impl CompactTablePropagator {
    #[cfg(test)]
    pub(crate) fn non_zero_words(&self) -> usize {
        self.non_zero_words.len()
    }

    #[cfg(test)]
    pub(crate) fn num_valid_tuples(&self) -> usize {
        self.non_zero_words
            .iter()
            .map(|word| self.current[word].count_ones() as usize)
            .sum()
    }

    /// Collects in `to_eliminate` the tuples made invalid by the changed variables.
    fn collect_eliminated_tuples(&mut self, context: &PropagationContextMut) {
        self.to_eliminate.fill(0);

        for &position in self.changed.iter() {
            let domain = context.domain(self.scope[position]);
            let size = domain.size();
            let last_size = self.last_sizes.read(position);

            if last_size - size <= size {
                for &index in domain.removed_since(last_size) {
                    self.table
                        .strict_mask(position, index)
                        .or_into(&mut self.to_eliminate);
                }
            } else if let Some(index) = domain.fixed_index() {
                self.table
                    .mask(position, index)
                    .or_inverse_into(&mut self.to_eliminate);
            } else {
                self.kept.fill(0);
                for index in domain.indices() {
                    self.table.mask(position, index).or_into(&mut self.kept);
                }
                for (eliminated, &kept) in self.to_eliminate.iter_mut().zip(self.kept.iter()) {
                    *eliminated |= !kept;
                }
            }
        }
    }

    /// Clears the collected tuples from the non-zero words of `current`.
    fn clear_eliminated_tuples(&mut self, depth: Depth) {
        for i in (0..self.non_zero_words.len()).rev() {
            let word = self.non_zero_words.get(i);
            let updated = self.current[word] & !self.to_eliminate[word];
            if updated == self.current[word] {
                continue;
            }

            self.journal.save(word, self.current[word], depth);
            self.current[word] = updated;
            if updated == 0 {
                self.non_zero_words.remove_at_position(i, depth);
                self.statistics.num_words_cleared += 1;
            }
        }

        tabula_assert_advanced!((0..self.current.len())
            .all(|word| (self.current[word] != 0) == self.non_zero_words.contains(word)));
    }
}

impl Propagator for CompactTablePropagator {
    fn name(&self) -> &str {
        "CompactTable"
    }

    fn filter(&mut self, mut context: PropagationContextMut, trigger: LocalId) -> PropagationStatus {
        self.statistics.num_filter_calls += 1;
        let blamed = self.scope[trigger.position()];
        if self.non_zero_words.is_empty() {
            return context.wipe_out(blamed);
        }
        let depth = context.depth();

        self.changed.clear();
        for (position, &variable) in self.scope.iter().enumerate() {
            if context.domain(variable).size() != self.last_sizes.read(position) {
                self.changed.push(position);
            }
        }

        if !self.changed.is_empty() {
            self.collect_eliminated_tuples(&context);
            self.clear_eliminated_tuples(depth);
            if self.non_zero_words.is_empty() {
                return context.wipe_out(blamed);
            }
        }

        // The values of the only changed variable keep the supports they had after the previous
        // call.
        let skipped = match self.changed.as_slice() {
            &[position] if self.last_sizes.read(position) != usize::MAX => Some(position),
            _ => None,
        };

        for position in 0..self.scope.len() {
            let variable = self.scope[position];
            if Some(position) == skipped || context.domain(variable).is_fixed() {
                continue;
            }

            let table = &self.table;
            let current = &self.current;
            let non_zero_words = &self.non_zero_words;
            let residues = &mut self.residues[position];
            let statistics = &mut self.statistics;
            context.remove_indexes_checking(variable, |index| {
                let mask = table.mask(position, index);
                let residue = residues[index];
                if mask.word(residue) & current[residue] != 0 {
                    return false;
                }

                statistics.num_residue_misses += 1;
                match non_zero_words
                    .iter()
                    .find(|&word| mask.word(word) & current[word] != 0)
                {
                    Some(word) => {
                        residues[index] = word;
                        false
                    }
                    None => true,
                }
            })?;
        }

        for (position, &variable) in self.scope.iter().enumerate() {
            self.last_sizes
                .assign(position, context.domain(variable).size(), depth);
        }

        Ok(())
    }

    fn restore_before(&mut self, depth: Depth) {
        self.journal.restore_before(depth, &mut self.current);
        self.non_zero_words.restore_before(depth);
        self.last_sizes.restore_before(depth);
    }

    fn filtering_complexity(&self) -> FilteringComplexity {
        FilteringComplexity::Moderate
    }

    fn check_indexes(&self, tuple: &[usize]) -> bool {
        self.table.check_indexes(tuple)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger.clone());
        statistic_logger
            .attach_to_prefix("num_journaled_words")
            .log_statistic(self.journal.len());
    }
}
