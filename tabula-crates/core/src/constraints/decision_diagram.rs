use std::rc::Rc;

use log::debug;

use super::initial_values;
use super::validate_scope;
use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::engine::VariableId;
use crate::extension::Automaton;
use crate::extension::DecisionDiagram;
use crate::extension::KnapsackLimits;
use crate::extension::Transition;
use crate::propagation::PropagatorId;
use crate::propagators::DecisionDiagramArgs;
use crate::propagators::ExtensionArgs;
use crate::Solver;

/// Creates the [`Constraint`] stating that the word formed by the values of `scope` is accepted
/// by `automaton`.
pub fn regular(scope: impl Into<Box<[VariableId]>>, automaton: Automaton) -> DiagramConstraint {
    DiagramConstraint {
        scope: scope.into(),
        source: DiagramSource::Automaton(automaton),
    }
}

/// Creates the [`Constraint`] stating that the values of `scope` label a path through the
/// layered graph given by `transitions`; see [`DecisionDiagram::from_transitions`].
pub fn decision_diagram(
    scope: impl Into<Box<[VariableId]>>,
    transitions: impl Into<Vec<Transition>>,
) -> DiagramConstraint {
    DiagramConstraint {
        scope: scope.into(),
        source: DiagramSource::Transitions(transitions.into()),
    }
}

/// Creates the [`Constraint`] `sum(coefficients[i] * scope[i]) in limits`.
pub fn knapsack(
    scope: impl Into<Box<[VariableId]>>,
    coefficients: impl Into<Vec<i64>>,
    limits: KnapsackLimits,
) -> DiagramConstraint {
    DiagramConstraint {
        scope: scope.into(),
        source: DiagramSource::Knapsack {
            coefficients: coefficients.into(),
            limits,
        },
    }
}

#[derive(Clone, Debug)]
enum DiagramSource {
    Automaton(Automaton),
    Transitions(Vec<Transition>),
    Knapsack {
        coefficients: Vec<i64>,
        limits: KnapsackLimits,
    },
}

/// A constraint compiled into a [`DecisionDiagram`] over the initial domains of its scope; see
/// [`regular`], [`decision_diagram`] and [`knapsack`].
#[derive(Clone, Debug)]
pub struct DiagramConstraint {
    scope: Box<[VariableId]>,
    source: DiagramSource,
}

impl Constraint for DiagramConstraint {
    fn post(self, solver: &mut Solver) -> Result<PropagatorId, ConstraintOperationError> {
        validate_scope(solver, &self.scope)?;
        let domain_values = initial_values(solver, &self.scope);

        let diagram = match &self.source {
            DiagramSource::Automaton(automaton) => {
                DecisionDiagram::from_automaton(automaton, &domain_values)?
            }
            DiagramSource::Transitions(transitions) => {
                DecisionDiagram::from_transitions(transitions, &domain_values)?
            }
            DiagramSource::Knapsack {
                coefficients,
                limits,
            } => DecisionDiagram::from_knapsack(coefficients, limits, &domain_values)?,
        };
        debug!(
            "compiled a decision diagram with {} nodes and {} edges over {} variables",
            diagram.node_count(),
            diagram.edge_count(),
            diagram.arity()
        );

        solver.add_propagator(ExtensionArgs::DecisionDiagram(DecisionDiagramArgs {
            scope: self.scope,
            diagram: Rc::new(diagram),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::decision_diagram;
    use super::knapsack;
    use super::regular;
    use crate::basic_types::ConstraintOperationError;
    use crate::extension::Automaton;
    use crate::extension::DecisionDiagramError;
    use crate::extension::KnapsackLimits;
    use crate::extension::Transition;
    use crate::Solver;

    #[test]
    fn a_regular_constraint_forbids_rejected_words() {
        let mut solver = Solver::default();
        let scope = (0..3)
            .map(|_| solver.new_bounded_variable(0, 1).expect("non-empty"))
            .collect::<Vec<_>>();
        // Words without two consecutive ones.
        let automaton = Automaton {
            start: 0,
            finals: vec![0, 1],
            transitions: vec![
                Transition::new(0, 0, 0),
                Transition::new(0, 1, 1),
                Transition::new(1, 0, 0),
            ],
        };
        let propagator = solver
            .add_constraint(regular(scope.clone(), automaton))
            .expect("consistent");
        assert_eq!(solver.propagator_name(propagator), "DecisionDiagram");

        let _ = solver.new_depth();
        solver.assign_value(scope[1], 1).expect("in the domain");
        solver.propagate().expect("no wipeout");

        assert_eq!(solver.domain(scope[0]).sorted_values(), vec![0]);
        assert_eq!(solver.domain(scope[2]).sorted_values(), vec![0]);
    }

    #[test]
    fn a_layered_graph_is_enforced() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 2).expect("non-empty");
        let y = solver.new_bounded_variable(0, 2).expect("non-empty");
        // Allows (0, 1), (1, 1) and (2, 2).
        let transitions = vec![
            Transition::new(0, 0, 1),
            Transition::new(0, 1, 1),
            Transition::new(0, 2, 2),
            Transition::new(1, 1, 3),
            Transition::new(2, 2, 3),
        ];

        let _ = solver
            .add_constraint(decision_diagram([x, y], transitions))
            .expect("consistent");

        assert_eq!(solver.domain(y).sorted_values(), vec![1, 2]);

        let _ = solver.new_depth();
        solver.remove_value(y, 2).expect("1 remains");
        solver.propagate().expect("no wipeout");
        assert_eq!(solver.domain(x).sorted_values(), vec![0, 1]);
    }

    #[test]
    fn a_knapsack_bounds_the_weighted_sum() {
        let mut solver = Solver::default();
        let scope = (0..3)
            .map(|_| solver.new_bounded_variable(0, 3).expect("non-empty"))
            .collect::<Vec<_>>();

        let _ = solver
            .add_constraint(knapsack(
                scope.clone(),
                vec![3, 2, 1],
                KnapsackLimits::Range(0..=4),
            ))
            .expect("consistent");

        assert_eq!(solver.domain(scope[0]).sorted_values(), vec![0, 1]);
        assert_eq!(solver.domain(scope[1]).sorted_values(), vec![0, 1, 2]);
        assert_eq!(solver.domain(scope[2]).sorted_values(), vec![0, 1, 2, 3]);

        let _ = solver.new_depth();
        solver.assign_value(scope[0], 1).expect("in the domain");
        solver.propagate().expect("no wipeout");
        assert_eq!(solver.domain(scope[1]).sorted_values(), vec![0]);
        assert_eq!(solver.domain(scope[2]).sorted_values(), vec![0, 1]);
    }

    #[test]
    fn malformed_sources_are_reported() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 1).expect("non-empty");
        let y = solver.new_bounded_variable(0, 1).expect("non-empty");

        assert_eq!(
            solver.add_constraint(knapsack([x, y], vec![1], KnapsackLimits::Values(vec![1]))),
            Err(ConstraintOperationError::MalformedDecisionDiagram(
                DecisionDiagramError::CoefficientCount {
                    expected: 2,
                    found: 1
                }
            ))
        );
        assert_eq!(
            solver.add_constraint(knapsack([x, x], vec![1, 1], KnapsackLimits::Values(vec![1]))),
            Err(ConstraintOperationError::DuplicateVariable(x))
        );
    }
}
