#![cfg(test)]
//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows setting
//! up specific scenarios under which to test the filtering of a propagator and its restoration.
use super::Solver;
use super::VariableId;
use crate::basic_types::Conflict;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Depth;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;

/// A container for variables and propagators, which can be used to test propagators.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    pub(crate) solver: Solver,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> VariableId {
        self.solver
            .new_bounded_variable(lower_bound, upper_bound)
            .expect("valid bounds")
    }

    pub(crate) fn new_sparse_variable(&mut self, values: Vec<i32>) -> VariableId {
        self.solver
            .new_sparse_variable(values)
            .expect("non-empty values")
    }

    /// Adds the propagator and propagates at the root.
    pub(crate) fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        self.solver.add_propagator(constructor)
    }

    pub(crate) fn propagator<P: Propagator>(&self, propagator: PropagatorId) -> &P {
        self.solver
            .propagator::<P>(propagator)
            .expect("the propagator has the requested type")
    }

    /// Removes `value` from `variable` at the current depth and propagates.
    pub(crate) fn remove(&mut self, variable: VariableId, value: i32) -> Result<(), Conflict> {
        self.solver.remove_value(variable, value)?;
        self.solver.propagate()
    }

    /// Assigns `value` to `variable` at the current depth and propagates.
    pub(crate) fn assign(&mut self, variable: VariableId, value: i32) -> Result<(), Conflict> {
        self.solver.assign_value(variable, value)?;
        self.solver.propagate()
    }

    pub(crate) fn propagate(&mut self) -> Result<(), Conflict> {
        self.solver.propagate()
    }

    pub(crate) fn contains(&self, variable: VariableId, value: i32) -> bool {
        self.solver.domain(variable).contains(value)
    }

    pub(crate) fn size(&self, variable: VariableId) -> usize {
        self.solver.domain(variable).size()
    }

    pub(crate) fn values(&self, variable: VariableId) -> Vec<i32> {
        self.solver.domain(variable).sorted_values()
    }

    pub(crate) fn increase_depth(&mut self) -> Depth {
        self.solver.new_depth()
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        self.solver.restore_before(depth)
    }

    pub(crate) fn is_entailed(&self, propagator: PropagatorId) -> bool {
        self.solver.is_entailed(propagator)
    }
}
