use std::rc::Rc;

use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
use crate::containers::ReversibleSet;
use crate::create_statistics_struct;
use crate::engine::VariableId;
use crate::extension::n_valid_tuples_bounded;
use crate::extension::Table;
use crate::propagation::FilteringComplexity;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::tabula_assert_simple;

create_statistics_struct!(Str2NegativeStatistics {
    num_filter_calls: usize,
    num_tuples_removed: usize,
    num_values_removed: usize,
});

#[derive(Clone, Debug)]
pub(crate) struct Str2NegativeArgs {
    pub(crate) scope: Box<[VariableId]>,
    /// Forbidden tuples without stars.
    pub(crate) table: Rc<Table>,
}

impl PropagatorConstructor for Str2NegativeArgs {
    type PropagatorImpl = Str2NegativePropagator;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> Str2NegativePropagator {
        let Str2NegativeArgs { scope, table } = self;
        tabula_assert_simple!(!table.is_positive() && !table.is_starred());
        context.register_scope(&scope);

        Str2NegativePropagator {
            valid_tuples: ReversibleSet::new(table.len()),
            conflicts: scope
                .iter()
                .map(|&variable| vec![0; context.domain(variable).initial_size()].into())
                .collect(),
            max_conflicts: vec![0; scope.len()],
            to_count: Vec::with_capacity(scope.len()),
            combinations_per_value: vec![0; scope.len()],
            scope,
            table,
            statistics: Str2NegativeStatistics::default(),
        }
    }
}

/// Filtering for a relation of forbidden tuples by counting conflicts.
///
/// A value `a` of `x` has a support unless every combination of the other domains, together with
/// `x = a`, is forbidden. The propagator keeps the forbidden tuples which are still valid and
/// counts, for each value, how many of them contain it; a value whose count equals the number of
/// combinations of the other domains is removed. Variables are dropped from the count as soon as
/// the remaining tuples cannot make any of their values reach that number.
#[derive(Clone, Debug)]
pub(crate) struct Str2NegativePropagator {
    scope: Box<[VariableId]>,
    table: Rc<Table>,
    valid_tuples: ReversibleSet,

    // Scratch space of a single call.
    conflicts: Box<[Box<[u64]>]>,
    max_conflicts: Vec<u64>,
    to_count: Vec<usize>,
    combinations_per_value: Vec<u64>,

    statistics: Str2NegativeStatistics,
}

impl Str2NegativePropagator {
    #[cfg(test)]
    pub(crate) fn num_valid_tuples(&self) -> usize {
        self.valid_tuples.len()
    }
}

impl Propagator for Str2NegativePropagator {
    fn name(&self) -> &str {
        "Str2Negative"
    }

    fn filter(&mut self, mut context: PropagationContextMut, _trigger: LocalId) -> PropagationStatus {
        self.statistics.num_filter_calls += 1;
        let depth = context.depth();

        let num_combinations = n_valid_tuples_bounded(
            self.scope
                .iter()
                .map(|&variable| context.domain(variable).size()),
        );
        let num_valid = self.valid_tuples.len() as u64;

        self.to_count.clear();
        for (position, &variable) in self.scope.iter().enumerate() {
            let combinations = num_combinations / context.domain(variable).size() as u64;
            if num_valid >= combinations {
                self.to_count.push(position);
                self.combinations_per_value[position] = combinations;
                self.conflicts[position].fill(0);
                self.max_conflicts[position] = 0;
            }
        }

        let table = Rc::clone(&self.table);
        for i in (0..self.valid_tuples.len()).rev() {
            let tuple = table.tuple(self.valid_tuples.get(i));
            let is_valid = self.scope.iter().zip(tuple).all(|(&variable, &index)| {
                context.domain(variable).contains_index(index)
            });
            if !is_valid {
                self.valid_tuples.remove_at_position(i, depth);
                self.statistics.num_tuples_removed += 1;
                continue;
            }

            for j in (0..self.to_count.len()).rev() {
                let position = self.to_count[j];
                let index = tuple[position];
                let combinations = self.combinations_per_value[position];

                self.conflicts[position][index] += 1;
                let count = self.conflicts[position][index];
                self.max_conflicts[position] = self.max_conflicts[position].max(count);

                if count == combinations {
                    let variable = self.scope[position];
                    if context.domain(variable).contains_index(index) {
                        context.remove(variable, index)?;
                        self.statistics.num_values_removed += 1;
                    }
                } else if self.max_conflicts[position] + (i as u64) < combinations {
                    // The `i` tuples left to scan cannot complete any value of this variable.
                    let _ = self.to_count.swap_remove(j);
                }
            }
        }

        if self.valid_tuples.is_empty() {
            context.mark_entailed();
        }

        Ok(())
    }

    fn restore_before(&mut self, depth: Depth) {
        self.valid_tuples.restore_before(depth);
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

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::Str2NegativeArgs;
    use super::Str2NegativePropagator;
    use crate::engine::test_solver::TestSolver;
    use crate::engine::VariableId;
    use crate::extension::IndexRelation;
    use crate::extension::Relation;
    use crate::extension::Table;
    use crate::propagation::PropagatorId;

    fn post(solver: &mut TestSolver, scope: &[VariableId], relation: Relation) -> PropagatorId {
        let domains = scope
            .iter()
            .map(|&variable| solver.solver.domain(variable))
            .collect::<Vec<_>>();
        let table = Table::new(IndexRelation::from_values(&relation, &domains).expect("arity"));
        solver
            .new_propagator(Str2NegativeArgs {
                scope: scope.into(),
                table: Rc::new(table),
            })
            .expect("consistent at the root")
    }

    #[test]
    fn a_sparse_negative_table_prunes_nothing() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);
        let y = solver.new_variable(0, 1);
        let _ = post(&mut solver, &[x, y], Relation::forbidden([[0, 0], [1, 1]]));

        assert_eq!(solver.values(x), vec![0, 1]);
        assert_eq!(solver.values(y), vec![0, 1]);
    }

    #[test]
    fn fixing_a_variable_removes_forbidden_partners() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);
        let y = solver.new_variable(0, 1);
        let propagator = post(&mut solver, &[x, y], Relation::forbidden([[0, 0], [1, 1]]));

        let depth = solver.increase_depth();
        solver.assign(x, 0).expect("no wipeout");
        assert_eq!(solver.values(y), vec![1]);
        assert!(solver.is_entailed(propagator));

        solver.restore_before(depth);
        assert_eq!(solver.values(y), vec![0, 1]);
        assert_eq!(
            solver
                .propagator::<Str2NegativePropagator>(propagator)
                .num_valid_tuples(),
            2
        );
        assert!(!solver.is_entailed(propagator));
    }

    #[test]
    fn a_value_conflicting_with_every_combination_is_removed() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 2);
        let y = solver.new_variable(0, 1);
        let z = solver.new_variable(0, 1);
        let _ = post(
            &mut solver,
            &[x, y, z],
            Relation::forbidden([[1, 0, 0], [1, 0, 1], [1, 1, 0], [1, 1, 1], [0, 0, 0]]),
        );

        assert_eq!(solver.values(x), vec![0, 2]);
        assert_eq!(solver.values(y), vec![0, 1]);
    }

    #[test]
    fn forbidding_the_only_combination_fails() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 1);
        let y = solver.new_variable(0, 1);
        let _ = post(&mut solver, &[x, y], Relation::forbidden([[0, 1]]));

        let _ = solver.increase_depth();
        solver.solver.assign_value(x, 0).expect("in the domain");
        solver.solver.assign_value(y, 1).expect("in the domain");

        assert!(solver.propagate().is_err());
    }
}
