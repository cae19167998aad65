use std::rc::Rc;

use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
use crate::basic_types::ReversibleValues;
use crate::containers::ReversibleSet;
use crate::create_statistics_struct;
use crate::engine::VariableId;
use crate::extension::n_valid_tuples_bounded;
use crate::extension::Table;
use crate::extension::STAR;
use crate::propagation::FilteringComplexity;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(Str2Statistics {
    num_filter_calls: usize,
    num_tuples_removed: usize,
});

#[derive(Clone, Debug)]
pub(crate) struct Str2Args {
    pub(crate) scope: Box<[VariableId]>,
    pub(crate) table: Rc<Table>,
}

impl PropagatorConstructor for Str2Args {
    type PropagatorImpl = Str2Propagator;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> Str2Propagator {
        let Str2Args { scope, table } = self;
        context.register_scope(&scope);

        let initial_sizes = scope
            .iter()
            .map(|&variable| context.domain(variable).initial_size())
            .collect::<Vec<_>>();

        Str2Propagator {
            valid_tuples: ReversibleSet::new(table.len()),
            last_sizes: ReversibleValues::new(initial_sizes.clone()),
            supported: initial_sizes
                .iter()
                .map(|&size| vec![false; size].into_boxed_slice())
                .collect(),
            num_unsupported: vec![0; scope.len()],
            to_validate: Vec::with_capacity(scope.len()),
            to_support: Vec::with_capacity(scope.len()),
            scope,
            table,
            statistics: Str2Statistics::default(),
        }
    }
}

/// Simple tabular reduction (STR2) for a relation of allowed tuples.
///
/// The propagator keeps the positions of the tuples which are still valid (every index present in
/// its domain) in a [`ReversibleSet`]. A call only checks the validity of a tuple for the
/// variables whose domain changed since the previous call, and only collects supports for the
/// variables with more than one value; the scan over a variable stops as soon as each of its
/// values is supported.
#[derive(Clone, Debug)]
pub(crate) struct Str2Propagator {
    scope: Box<[VariableId]>,
    table: Rc<Table>,
    valid_tuples: ReversibleSet,
    /// The domain sizes seen at the end of the previous call.
    last_sizes: ReversibleValues<usize>,

    // Scratch space of a single call.
    supported: Box<[Box<[bool]>]>,
    num_unsupported: Vec<usize>,
    to_validate: Vec<usize>,
    to_support: Vec<usize>,

    statistics: Str2Statistics,
}

impl Str2Propagator {
    pub(crate) fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    #[cfg(test)]
    pub(crate) fn num_valid_tuples(&self) -> usize {
        self.valid_tuples.len()
    }

    /// Removes the listed tuple equal to `tuple` from the table; only meant to be used at the
    /// root. Tuples covered by a starred tuple without being listed are not affected. Returns
    /// whether the tuple was listed.
    pub(crate) fn forbid_tuple(&mut self, tuple: &[usize]) -> bool {
        if !Rc::make_mut(&mut self.table).remove_tuple(tuple) {
            return false;
        }

        self.valid_tuples = ReversibleSet::new(self.table.len());
        for position in 0..self.scope.len() {
            self.last_sizes.assign(position, usize::MAX, 0);
        }
        true
    }

    fn is_valid(&self, context: &PropagationContextMut, tuple: &[usize]) -> bool {
        self.to_validate.iter().all(|&position| {
            tuple[position] == STAR
                || context
                    .domain(self.scope[position])
                    .contains_index(tuple[position])
        })
    }

    /// Marks the indexes of `tuple` as supported, dropping the variables whose values are all
    /// supported.
    fn collect_supports(&mut self, tuple: &[usize]) {
        for i in (0..self.to_support.len()).rev() {
            let position = self.to_support[i];
            let index = tuple[position];

            if index == STAR {
                self.num_unsupported[position] = 0;
            } else if !self.supported[position][index] {
                self.supported[position][index] = true;
                self.num_unsupported[position] -= 1;
            }

            if self.num_unsupported[position] == 0 {
                let _ = self.to_support.swap_remove(i);
            }
        }
    }
}

impl Propagator for Str2Propagator {
    fn name(&self) -> &str {
        "Str2"
    }

    fn filter(&mut self, mut context: PropagationContextMut, trigger: LocalId) -> PropagationStatus {
        self.statistics.num_filter_calls += 1;
        let depth = context.depth();

        self.to_validate.clear();
        self.to_support.clear();
        for (position, &variable) in self.scope.iter().enumerate() {
            let domain = context.domain(variable);
            if domain.size() != self.last_sizes.read(position) {
                self.to_validate.push(position);
            }
            if domain.size() > 1 {
                self.to_support.push(position);
                self.num_unsupported[position] = domain.size();
                self.supported[position].fill(false);
            }
        }

        let table = Rc::clone(&self.table);
        for i in (0..self.valid_tuples.len()).rev() {
            let tuple = table.tuple(self.valid_tuples.get(i));
            if self.is_valid(&context, tuple) {
                self.collect_supports(tuple);
            } else {
                self.valid_tuples.remove_at_position(i, depth);
                self.statistics.num_tuples_removed += 1;
            }
        }

        if self.valid_tuples.is_empty() {
            return context.wipe_out(self.scope[trigger.position()]);
        }

        for &position in self.to_support.iter() {
            let supported = &self.supported[position];
            context.remove_indexes_checking(self.scope[position], |index| !supported[index])?;
        }

        for (position, &variable) in self.scope.iter().enumerate() {
            self.last_sizes
                .assign(position, context.domain(variable).size(), depth);
        }

        let num_combinations = n_valid_tuples_bounded(
            self.scope
                .iter()
                .map(|&variable| context.domain(variable).size()),
        );
        if !self.table.is_starred() && self.valid_tuples.len() as u64 == num_combinations {
            context.mark_entailed();
        }

        Ok(())
    }

    fn restore_before(&mut self, depth: Depth) {
        self.valid_tuples.restore_before(depth);
        self.last_sizes.restore_before(depth);
    }

    fn filtering_complexity(&self) -> FilteringComplexity {
        FilteringComplexity::Moderate
    }

    fn check_indexes(&self, tuple: &[usize]) -> bool {
        self.table.check_indexes(tuple)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}
