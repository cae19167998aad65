//! Defines the constraints which can be added to the [`Solver`].
//!
//! A constraint is a relation over variables. In the solver, constraints are enforced through
//! propagators; every constraint defined here is enforced by one of the table filters, whose
//! representation is chosen from the [`ExtensionOptions`](crate::options::ExtensionOptions) of
//! the solver.
//!
//! # Example
//! ```
//! # use tabula_core::constraints;
//! # use tabula_core::extension::Automaton;
//! # use tabula_core::extension::Transition;
//! # use tabula_core::Solver;
//! let mut solver = Solver::default();
//! let scope = (0..3)
//!     .map(|_| solver.new_bounded_variable(0, 1).expect("non-empty domain"))
//!     .collect::<Vec<_>>();
//!
//! // At least one of the variables takes the value 1.
//! let automaton = Automaton {
//!     start: 0,
//!     finals: vec![1],
//!     transitions: vec![
//!         Transition::new(0, 0, 0),
//!         Transition::new(0, 1, 1),
//!         Transition::new(1, 0, 1),
//!         Transition::new(1, 1, 1),
//!     ],
//! };
//! let _ = solver
//!     .add_constraint(constraints::regular(scope.clone(), automaton))
//!     .expect("satisfiable at the root");
//!
//! let _ = solver.new_depth();
//! solver.assign_value(scope[0], 0).expect("0 is in the domain");
//! solver.assign_value(scope[1], 0).expect("0 is in the domain");
//! solver.propagate().expect("no wipeout");
//! assert_eq!(solver.domain(scope[2]).sorted_values(), vec![1]);
//! ```
mod decision_diagram;
mod table;

pub use decision_diagram::*;
pub use table::*;

use crate::basic_types::ConstraintOperationError;
use crate::containers::HashSet;
use crate::engine::VariableId;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;
use crate::Solver;

/// A [`Constraint`] is a relation over variables. It disqualifies certain assignments of the
/// variables from making it into a solution.
pub trait Constraint {
    /// Adds the [`Constraint`] to the [`Solver`] and returns the propagator enforcing it.
    ///
    /// This method returns a [`ConstraintOperationError`] if the constraint is malformed or if its
    /// addition led to a conflict at the root.
    fn post(self, solver: &mut Solver) -> Result<PropagatorId, ConstraintOperationError>;
}

impl<ConcretePropagator> Constraint for ConcretePropagator
where
    ConcretePropagator: PropagatorConstructor + 'static,
{
    fn post(self, solver: &mut Solver) -> Result<PropagatorId, ConstraintOperationError> {
        solver.add_propagator(self)
    }
}

/// Checks that every variable of `scope` belongs to `solver` and occurs once.
fn validate_scope(solver: &Solver, scope: &[VariableId]) -> Result<(), ConstraintOperationError> {
    let mut seen: HashSet<VariableId> = HashSet::default();
    for &variable in scope {
        if variable.0 as usize >= solver.num_variables() {
            return Err(ConstraintOperationError::UnknownVariable(variable));
        }
        if !seen.insert(variable) {
            return Err(ConstraintOperationError::DuplicateVariable(variable));
        }
    }
    Ok(())
}

/// The values of the initial domains of `scope`, in ascending order.
fn initial_values(solver: &Solver, scope: &[VariableId]) -> Vec<Vec<i32>> {
    scope
        .iter()
        .map(|&variable| {
            let domain = solver.domain(variable);
            (0..domain.initial_size())
                .map(|index| domain.to_value(index))
                .collect()
        })
        .collect()
}
