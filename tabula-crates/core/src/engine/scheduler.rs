use std::fmt::Debug;
use std::fmt::Formatter;

use log::trace;

use super::AuxiliaryQueue;
use super::DomainStore;
use super::Entailment;
use super::VariableId;
use super::VariableQueue;
use super::Watchers;
use crate::basic_types::Conflict;
use crate::basic_types::Depth;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorId;
use crate::propagation::MAX_FILTERING_COMPLEXITY;

pub(crate) type PropagatorStore = KeyedVec<PropagatorId, Box<dyn Propagator>>;

impl Debug for Box<dyn Propagator> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Propagator({})", self.name())
    }
}

create_statistics_struct!(
    /// Counters of the propagation loop.
    PropagationStatistics {
        /// The number of calls to [`Scheduler::propagate`]
        num_propagate_calls: u64,
        /// The number of filter calls, eager and deferred
        num_filter_calls: u64,
        /// The number of filter calls taken from the auxiliary queues
        num_deferred_calls: u64,
        /// The number of propagations which ended in a wipeout
        num_wipeouts: u64,
        /// The number of times the state was restored to an earlier depth
        num_restores: u64,
    }
);

/// Drives filtering to a fixed point.
///
/// Variables whose domains shrank are popped in FIFO order; every active propagator watching the
/// popped variable is either called right away (cheap propagators) or added to the auxiliary
/// queue of its tier. Once the variable queue is empty, the auxiliary queues are flushed in tier
/// order, after which the variable queue is checked again. The first wipeout ends propagation.
#[derive(Debug)]
pub(crate) struct Scheduler {
    pub(crate) variable_queue: VariableQueue,
    auxiliary_queues: Vec<AuxiliaryQueue>,
    pub(crate) watchers: Watchers,
    pub(crate) entailment: Entailment,
    ignored: KeyedVec<PropagatorId, bool>,
    pub(crate) last_wipeout: Option<VariableId>,
    pub(crate) statistics: PropagationStatistics,
}

impl Scheduler {
    pub(crate) fn new(use_auxiliary_queues: bool) -> Scheduler {
        let num_auxiliary_queues = if use_auxiliary_queues {
            MAX_FILTERING_COMPLEXITY
        } else {
            0
        };
        Scheduler {
            variable_queue: VariableQueue::default(),
            auxiliary_queues: vec![AuxiliaryQueue::default(); num_auxiliary_queues],
            watchers: Watchers::default(),
            entailment: Entailment::default(),
            ignored: KeyedVec::default(),
            last_wipeout: None,
            statistics: PropagationStatistics::default(),
        }
    }

    pub(crate) fn ignore(&mut self, propagator: PropagatorId) {
        self.ignored.ensure_key(propagator, false);
        self.ignored[propagator] = true;
    }

    pub(crate) fn is_active(&self, propagator: PropagatorId) -> bool {
        let is_ignored = self.ignored.get(propagator).copied().unwrap_or_default();
        !is_ignored && !self.entailment.is_entailed(propagator)
    }

    pub(crate) fn propagate(
        &mut self,
        domains: &mut DomainStore,
        propagators: &mut PropagatorStore,
        depth: Depth,
    ) -> Result<(), Conflict> {
        self.statistics.num_propagate_calls += 1;

        let result = self.run_to_fixed_point(domains, propagators, depth);
        if let Err(conflict) = result {
            trace!("{conflict}");
            self.statistics.num_wipeouts += 1;
            self.clear_queues();
        }
        result
    }

    fn run_to_fixed_point(
        &mut self,
        domains: &mut DomainStore,
        propagators: &mut PropagatorStore,
        depth: Depth,
    ) -> Result<(), Conflict> {
        loop {
            while let Some(variable) = self.variable_queue.pop() {
                self.pick_and_filter(variable, domains, propagators, depth)?;
            }

            for tier in 0..self.auxiliary_queues.len() {
                while let Some((propagator, trigger)) = self.auxiliary_queues[tier].shift() {
                    if self.is_active(propagator) {
                        self.statistics.num_deferred_calls += 1;
                        self.filter(propagator, trigger, domains, propagators, depth)?;
                    }
                }
            }

            if self.variable_queue.is_empty() {
                return Ok(());
            }
        }
    }

    fn pick_and_filter(
        &mut self,
        variable: VariableId,
        domains: &mut DomainStore,
        propagators: &mut PropagatorStore,
        depth: Depth,
    ) -> Result<(), Conflict> {
        for index in 0..self.watchers.get(variable).len() {
            let watcher = self.watchers.get(variable)[index];
            if !self.is_active(watcher.propagator) {
                continue;
            }

            let trigger = (variable, watcher.variable);
            let tier = propagators[watcher.propagator]
                .filtering_complexity()
                .auxiliary_queue()
                .filter(|&tier| tier < self.auxiliary_queues.len());
            match tier {
                Some(tier) => self.auxiliary_queues[tier].add(watcher.propagator, trigger),
                None => self.filter(watcher.propagator, trigger, domains, propagators, depth)?,
            }
        }
        Ok(())
    }

    fn filter(
        &mut self,
        propagator_id: PropagatorId,
        (variable, local_id): (VariableId, LocalId),
        domains: &mut DomainStore,
        propagators: &mut PropagatorStore,
        depth: Depth,
    ) -> Result<(), Conflict> {
        self.statistics.num_filter_calls += 1;
        self.last_wipeout = None;

        let context = PropagationContextMut::new(
            domains,
            &mut self.variable_queue,
            &mut self.entailment,
            &mut self.last_wipeout,
            propagator_id,
            depth,
        );
        propagators[propagator_id]
            .filter(context, local_id)
            .map_err(|_| {
                // A propagator which fails without going through its context is blamed on the
                // variable that triggered it.
                let wiped_out = *self.last_wipeout.get_or_insert(variable);
                Conflict {
                    variable: wiped_out,
                    propagator: Some(propagator_id),
                    depth,
                }
            })
    }

    pub(crate) fn clear_queues(&mut self) {
        self.variable_queue.clear();
        self.auxiliary_queues
            .iter_mut()
            .for_each(AuxiliaryQueue::clear);
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        self.statistics.num_restores += 1;
        self.entailment.restore_before(depth);
        self.clear_queues();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::basic_types::PropagationStatus;
    use crate::engine::Solver;
    use crate::engine::VariableId;
    use crate::options::SolverOptions;
    use crate::propagation::FilteringComplexity;
    use crate::propagation::LocalId;
    use crate::propagation::PropagationContextMut;
    use crate::propagation::Propagator;
    use crate::propagation::PropagatorConstructor;
    use crate::propagation::PropagatorConstructorContext;

    /// Records the triggers it is called with; removes the value of a fixed variable from the
    /// others, which makes it a small all-different.
    struct RecordingArgs {
        scope: Vec<VariableId>,
        complexity: FilteringComplexity,
        calls: Rc<RefCell<Vec<LocalId>>>,
        entail_after_first_call: bool,
    }

    struct RecordingPropagator {
        scope: Vec<VariableId>,
        complexity: FilteringComplexity,
        calls: Rc<RefCell<Vec<LocalId>>>,
        entail_after_first_call: bool,
    }

    impl PropagatorConstructor for RecordingArgs {
        type PropagatorImpl = RecordingPropagator;

        fn create(self, mut context: PropagatorConstructorContext<'_>) -> RecordingPropagator {
            context.register_scope(&self.scope);
            RecordingPropagator {
                scope: self.scope,
                complexity: self.complexity,
                calls: self.calls,
                entail_after_first_call: self.entail_after_first_call,
            }
        }
    }

    impl Propagator for RecordingPropagator {
        fn name(&self) -> &str {
            "Recording"
        }

        fn filter(
            &mut self,
            mut context: PropagationContextMut,
            trigger: LocalId,
        ) -> PropagationStatus {
            self.calls.borrow_mut().push(trigger);
            if self.entail_after_first_call {
                context.mark_entailed();
                return Ok(());
            }

            for (position, &variable) in self.scope.iter().enumerate() {
                let Some(index) = context.domain(variable).fixed_index() else {
                    continue;
                };
                let value = context.domain(variable).to_value(index);
                for (other_position, &other) in self.scope.iter().enumerate() {
                    if other_position != position {
                        context.remove_value(other, value)?;
                    }
                }
            }
            Ok(())
        }

        fn filtering_complexity(&self) -> FilteringComplexity {
            self.complexity
        }

        fn check_indexes(&self, tuple: &[usize]) -> bool {
            (0..tuple.len()).all(|i| (i + 1..tuple.len()).all(|j| tuple[i] != tuple[j]))
        }
    }

    fn recording(
        solver: &mut Solver,
        scope: Vec<VariableId>,
        complexity: FilteringComplexity,
    ) -> Rc<RefCell<Vec<LocalId>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let _ = solver
            .add_propagator(RecordingArgs {
                scope,
                complexity,
                calls: Rc::clone(&calls),
                entail_after_first_call: false,
            })
            .expect("consistent at the root");
        calls.borrow_mut().clear();
        calls
    }

    #[test]
    fn reductions_are_propagated_to_a_fixed_point() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 1).expect("non-empty");
        let y = solver.new_bounded_variable(0, 1).expect("non-empty");
        let z = solver.new_bounded_variable(0, 1).expect("non-empty");
        let _ = recording(&mut solver, vec![x, y], FilteringComplexity::Cheap);
        let _ = recording(&mut solver, vec![y, z], FilteringComplexity::Cheap);

        let _ = solver.new_depth();
        solver.assign_value(x, 0).expect("0 is in the domain");
        solver.propagate().expect("no wipeout");

        assert_eq!(solver.domain(y).sorted_values(), vec![1]);
        assert_eq!(solver.domain(z).sorted_values(), vec![0]);
    }

    #[test]
    fn deferred_calls_are_coalesced() {
        let mut solver = Solver::default();
        let scope = (0..3)
            .map(|_| solver.new_bounded_variable(0, 5).expect("non-empty"))
            .collect::<Vec<_>>();
        let calls = recording(&mut solver, scope.clone(), FilteringComplexity::Moderate);
        let deferred_at_root = solver.propagation_statistics().num_deferred_calls;

        let _ = solver.new_depth();
        for &variable in scope.iter() {
            solver.remove_value(variable, 5).expect("values remain");
        }
        solver.propagate().expect("no wipeout");

        assert_eq!(*calls.borrow(), vec![LocalId::at(2)]);
        assert_eq!(
            solver.propagation_statistics().num_deferred_calls,
            deferred_at_root + 1
        );
    }

    #[test]
    fn without_auxiliary_queues_every_event_is_a_call() {
        let mut solver = Solver::new(SolverOptions {
            use_auxiliary_queues: false,
            ..SolverOptions::default()
        });
        let scope = (0..3)
            .map(|_| solver.new_bounded_variable(0, 5).expect("non-empty"))
            .collect::<Vec<_>>();
        let calls = recording(&mut solver, scope.clone(), FilteringComplexity::Expensive);

        let _ = solver.new_depth();
        for &variable in scope.iter() {
            solver.remove_value(variable, 5).expect("values remain");
        }
        solver.propagate().expect("no wipeout");

        assert_eq!(
            *calls.borrow(),
            vec![LocalId::at(0), LocalId::at(1), LocalId::at(2)]
        );
    }

    #[test]
    fn propagation_stops_at_the_first_wipeout() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 1).expect("non-empty");
        let y = solver.new_bounded_variable(0, 1).expect("non-empty");
        let first = recording(&mut solver, vec![x, y], FilteringComplexity::Cheap);
        let second = recording(&mut solver, vec![x, y], FilteringComplexity::Cheap);
        first.borrow_mut().clear();

        let depth = solver.new_depth();
        solver.assign_value(x, 0).expect("0 is in the domain");
        solver.assign_value(y, 0).expect("0 is in the domain");
        let conflict = solver.propagate().expect_err("x = y = 0 violates x != y");

        assert_eq!(conflict.variable, y);
        assert_eq!(conflict.depth, depth);
        assert_eq!(solver.last_wipeout(), Some(y));
        assert_eq!(first.borrow().len(), 1);
        assert!(second.borrow().is_empty());

        solver.restore_before(depth);
        assert_eq!(solver.domain(x).size(), 2);
        solver.propagate().expect("nothing is queued after a restore");
    }

    #[test]
    fn entailed_propagators_are_skipped_until_restored() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 3).expect("non-empty");
        let calls = Rc::new(RefCell::new(Vec::new()));

        let depth = solver.new_depth();
        let _ = solver.add_propagator(RecordingArgs {
            scope: vec![x],
            complexity: FilteringComplexity::Cheap,
            calls: Rc::clone(&calls),
            entail_after_first_call: true,
        });
        assert!(solver.num_propagators() == 0);

        solver.restore_before(depth);
        let propagator = solver
            .add_propagator(RecordingArgs {
                scope: vec![x],
                complexity: FilteringComplexity::Cheap,
                calls: Rc::clone(&calls),
                entail_after_first_call: true,
            })
            .expect("added at the root");
        assert!(solver.is_entailed(propagator));

        let depth = solver.new_depth();
        solver.remove_value(x, 0).expect("values remain");
        solver.propagate().expect("no wipeout");
        assert_eq!(calls.borrow().len(), 1);

        solver.restore_before(depth);
        assert!(solver.is_entailed(propagator));
    }

    #[test]
    fn propagating_twice_changes_nothing() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 2).expect("non-empty");
        let y = solver.new_bounded_variable(0, 2).expect("non-empty");
        let calls = recording(&mut solver, vec![x, y], FilteringComplexity::Cheap);

        let _ = solver.new_depth();
        solver.assign_value(x, 1).expect("1 is in the domain");
        solver.propagate().expect("no wipeout");
        let number_of_calls = calls.borrow().len();
        let sizes = (solver.domain(x).size(), solver.domain(y).size());

        solver.propagate().expect("no wipeout");
        assert_eq!(calls.borrow().len(), number_of_calls);
        assert_eq!((solver.domain(x).size(), solver.domain(y).size()), sizes);
    }
}
