use log::trace;

use super::scheduler::PropagationStatistics;
use super::scheduler::PropagatorStore;
use super::Domain;
use super::DomainStore;
use super::Scheduler;
use super::ValueMap;
use super::VariableId;
use crate::basic_types::Conflict;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Depth;
use crate::basic_types::EmptyDomain;
use crate::constraints::Constraint;
use crate::extension::StructureRegistry;
use crate::extension::STAR_VALUE;
use crate::options::SolverOptions;
#[cfg(test)]
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorId;
use crate::propagators::ExtensionPropagator;
use crate::statistics::log_statistic;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The propagation core: the variables with their domains, the propagators posted over them and
/// the scheduler which runs those propagators to a fixed point.
///
/// The solver does not search by itself. A search driver interleaves the following calls:
/// - [`Solver::new_depth`] before each decision,
/// - [`Solver::assign_value`] or [`Solver::remove_value`] to make the decision,
/// - [`Solver::propagate`] to filter the consequences of the decision,
/// - [`Solver::restore_before`] to undo everything done at a depth and below it.
///
/// # Example
/// ```
/// # use tabula_core::constraints;
/// # use tabula_core::extension::Relation;
/// # use tabula_core::Solver;
/// let mut solver = Solver::default();
/// let x = solver.new_bounded_variable(0, 2).expect("non-empty domain");
/// let y = solver.new_bounded_variable(0, 2).expect("non-empty domain");
///
/// let _ = solver
///     .add_constraint(constraints::table(
///         [x, y],
///         Relation::allowed([[0, 0], [1, 1], [2, 2]]),
///     ))
///     .expect("the relation is consistent at the root");
///
/// let depth = solver.new_depth();
/// solver.remove_value(x, 2).expect("x keeps two values");
/// solver.propagate().expect("no wipeout");
/// assert!(!solver.domain(y).contains(2));
///
/// solver.restore_before(depth);
/// assert!(solver.domain(y).contains(2));
/// ```
#[derive(Debug)]
pub struct Solver {
    options: SolverOptions,
    domains: DomainStore,
    propagators: PropagatorStore,
    scheduler: Scheduler,
    structures: StructureRegistry,
    depth: Depth,
    /// Set once a wipeout happened at depth 0; the solver stays infeasible from then on.
    root_conflict: Option<Conflict>,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverOptions::default())
    }
}

impl Solver {
    pub fn new(options: SolverOptions) -> Solver {
        Solver {
            options,
            domains: DomainStore::default(),
            propagators: PropagatorStore::default(),
            scheduler: Scheduler::new(options.use_auxiliary_queues),
            structures: StructureRegistry::default(),
            depth: 0,
            root_conflict: None,
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Creates a variable with the domain `lower_bound..=upper_bound`.
    pub fn new_bounded_variable(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
    ) -> Result<VariableId, ConstraintOperationError> {
        if lower_bound > upper_bound {
            return Err(ConstraintOperationError::EmptyInitialDomain);
        }
        if upper_bound == STAR_VALUE {
            return Err(ConstraintOperationError::ReservedValue(STAR_VALUE));
        }
        Ok(self.grow(ValueMap::interval(lower_bound, upper_bound)))
    }

    /// Creates a variable whose domain holds exactly the given values; duplicates are ignored.
    pub fn new_sparse_variable(
        &mut self,
        values: impl IntoIterator<Item = i32>,
    ) -> Result<VariableId, ConstraintOperationError> {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_unstable();
        values.dedup();

        if values.is_empty() {
            return Err(ConstraintOperationError::EmptyInitialDomain);
        }
        if values.last() == Some(&STAR_VALUE) {
            return Err(ConstraintOperationError::ReservedValue(STAR_VALUE));
        }
        Ok(self.grow(ValueMap::sparse(values)))
    }

    fn grow(&mut self, values: ValueMap) -> VariableId {
        self.scheduler.watchers.grow();
        self.domains.grow(values)
    }

    pub fn num_variables(&self) -> usize {
        self.domains.num_variables()
    }

    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.domains.variables()
    }

    pub fn domain(&self, variable: VariableId) -> &Domain {
        &self.domains[variable]
    }

    /// The current depth; it is 0 until the first call to [`Solver::new_depth`].
    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Opens a new depth and returns it. Removals made from now on are undone by
    /// [`Solver::restore_before`] with this depth.
    pub fn new_depth(&mut self) -> Depth {
        self.depth += 1;
        self.depth
    }

    pub fn is_infeasible(&self) -> bool {
        self.root_conflict.is_some()
    }

    /// Removes `value` from the domain of `variable` at the current depth. Nothing is propagated
    /// until [`Solver::propagate`] is called.
    pub fn remove_value(&mut self, variable: VariableId, value: i32) -> Result<(), Conflict> {
        self.decide(variable, |domain, depth| {
            domain.remove_value_if_present(value, depth).map(|_| ())
        })
    }

    /// Reduces the domain of `variable` to `value` at the current depth.
    pub fn assign_value(&mut self, variable: VariableId, value: i32) -> Result<(), Conflict> {
        self.decide(variable, |domain, depth| domain.reduce_to_value(value, depth))
    }

    fn decide(
        &mut self,
        variable: VariableId,
        update: impl FnOnce(&mut Domain, Depth) -> Result<(), EmptyDomain>,
    ) -> Result<(), Conflict> {
        let domain = &mut self.domains[variable];
        let size_before = domain.size();
        let result = update(domain, self.depth);
        if domain.size() != size_before {
            self.scheduler.variable_queue.enqueue(variable);
        }

        result.map_err(|_| {
            self.scheduler.last_wipeout = Some(variable);
            let conflict = Conflict {
                variable,
                propagator: None,
                depth: self.depth,
            };
            self.record_conflict(conflict);
            conflict
        })
    }

    /// Runs every propagator whose variables changed until a fixed point is reached or a domain
    /// would be wiped out.
    ///
    /// After a conflict the domains are left as they were at the moment of the wipeout; the
    /// caller has to [`restore`](Solver::restore_before) before continuing. A conflict at depth 0
    /// makes the solver permanently infeasible.
    pub fn propagate(&mut self) -> Result<(), Conflict> {
        if let Some(conflict) = self.root_conflict {
            return Err(conflict);
        }

        let result = self
            .scheduler
            .propagate(&mut self.domains, &mut self.propagators, self.depth);
        if let Err(conflict) = result {
            self.record_conflict(conflict);
        }
        result
    }

    fn record_conflict(&mut self, conflict: Conflict) {
        if conflict.is_root_failure() {
            self.root_conflict = Some(conflict);
        }
    }

    /// Undoes every change made at `depth` or deeper, after which the current depth is
    /// `depth - 1`.
    pub fn restore_before(&mut self, depth: Depth) {
        trace!("restoring before depth {depth} (current depth {})", self.depth);

        self.domains.restore_before(depth);
        self.propagators
            .iter_mut()
            .for_each(|propagator| propagator.restore_before(depth));
        self.scheduler.restore_before(depth);
        self.depth = self.depth.min(depth.saturating_sub(1));
    }

    /// Adds a propagator at the root and propagates.
    ///
    /// Returns [`ConstraintOperationError::InfeasibleAtRoot`] when the propagator wipes out a
    /// domain; the solver is infeasible afterwards.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        if self.depth != 0 {
            return Err(ConstraintOperationError::UnsupportedOperation(
                "propagators can only be added at the root",
            ));
        }
        if self.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let slot = self.propagators.new_slot();
        let propagator_id = slot.key();
        let context = PropagatorConstructorContext::new(
            &self.domains,
            &mut self.scheduler.watchers,
            &mut self.scheduler.variable_queue,
            propagator_id,
        );
        let propagator = constructor.create(context);
        let _ = slot.populate(Box::new(propagator));

        self.propagate()
            .map_err(|_| ConstraintOperationError::InfeasibleAtRoot)?;
        Ok(propagator_id)
    }

    /// Posts `constraint` and returns the id of the propagator enforcing it.
    pub fn add_constraint(
        &mut self,
        constraint: impl Constraint,
    ) -> Result<PropagatorId, ConstraintOperationError> {
        constraint.post(self)
    }

    /// Permanently excludes `propagator` from propagation.
    pub fn ignore(&mut self, propagator: PropagatorId) {
        self.scheduler.ignore(propagator);
    }

    pub fn is_entailed(&self, propagator: PropagatorId) -> bool {
        self.scheduler.entailment.is_entailed(propagator)
    }

    /// The variable whose domain would have been wiped out by the last failing propagation.
    pub fn last_wipeout(&self) -> Option<VariableId> {
        self.scheduler.last_wipeout
    }

    /// Whether the tuple of value indices, in the scope order of `propagator`, satisfies its
    /// constraint.
    pub fn check_indexes(&self, propagator: PropagatorId, tuple: &[usize]) -> bool {
        self.propagators[propagator].check_indexes(tuple)
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn propagator_name(&self, propagator: PropagatorId) -> &str {
        self.propagators[propagator].name()
    }

    /// Permanently removes the tuple of `values` from the allowed tuples of `propagator` and
    /// propagates. Returns whether the tuple was allowed before.
    ///
    /// Only constraints filtered with STR2 support this, and only at the root. The tuples are
    /// copied first when other constraints share them.
    pub fn forbid_tuple(
        &mut self,
        propagator: PropagatorId,
        values: &[i32],
    ) -> Result<bool, ConstraintOperationError> {
        if self.depth != 0 {
            return Err(ConstraintOperationError::UnsupportedOperation(
                "tuples can only be forbidden at the root",
            ));
        }
        if self.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let Some(ExtensionPropagator::Str2(str2)) =
            self.propagators[propagator].downcast_mut::<ExtensionPropagator>()
        else {
            return Err(ConstraintOperationError::UnsupportedOperation(
                "only STR2 constraints can forbid tuples",
            ));
        };

        if values.len() != str2.scope().len() {
            return Err(ConstraintOperationError::ArityMismatch {
                tuple: 0,
                expected: str2.scope().len(),
                found: values.len(),
            });
        }
        let indexes = str2
            .scope()
            .iter()
            .zip(values)
            .map(|(&variable, &value)| self.domains[variable].to_index(value))
            .collect::<Option<Vec<_>>>();
        let Some(indexes) = indexes else {
            return Ok(false);
        };

        if !str2.forbid_tuple(&indexes) {
            return Ok(false);
        }
        for &variable in str2.scope() {
            self.scheduler.variable_queue.enqueue(variable);
        }

        self.propagate()
            .map_err(|_| ConstraintOperationError::InfeasibleAtRoot)?;
        Ok(true)
    }

    /// Logs the propagation statistics and those of every propagator, if statistic logging is
    /// configured.
    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }

        self.propagation_statistics()
            .log(StatisticLogger::new(["propagation"]));
        log_statistic("numSharedStructures", self.structures.len());
        for (propagator_id, propagator) in self.propagators.keys().zip(self.propagators.iter()) {
            propagator.log_statistics(StatisticLogger::new([
                propagator.name().to_owned(),
                propagator_id.0.to_string(),
            ]));
        }
        log_statistic_postfix();
    }

    pub(crate) fn propagation_statistics(&self) -> PropagationStatistics {
        self.scheduler.statistics
    }

    pub(crate) fn structures_mut(&mut self) -> &mut StructureRegistry {
        &mut self.structures
    }

    #[cfg(test)]
    pub(crate) fn propagator<P: Propagator>(&self, propagator: PropagatorId) -> Option<&P> {
        self.propagators.get(propagator)?.downcast_ref::<P>()
    }
}
