use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
#[cfg(doc)]
use crate::Solver;
use crate::engine::Domain;
use crate::engine::DomainStore;
use crate::engine::VariableId;
use crate::engine::VariableQueue;
use crate::engine::Watchers;

/// A propagator constructor creates a fully initialized instance of a [`Propagator`].
///
/// The constructor is responsible for registering the variables the propagator reacts to.
/// Additionally, the propagator can be initialized with values that come from the state of the
/// solver.
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is used when [`Propagator`]s are initialised after creation.
///
/// It represents a communication point between the [`Solver`] and the [`Propagator`].
/// Propagators use the [`PropagatorConstructorContext`] to register to domain changes
/// of variables and to retrieve the initial domains of variables.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    domains: &'a DomainStore,
    watchers: &'a mut Watchers,
    variable_queue: &'a mut VariableQueue,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        domains: &'a DomainStore,
        watchers: &'a mut Watchers,
        variable_queue: &'a mut VariableQueue,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            domains,
            watchers,
            variable_queue,
            propagator_id,
        }
    }

    /// Subscribes the propagator to changes of `variable`, which sits at `local_id` in its scope.
    ///
    /// The variable is enqueued so that the propagator is called at the next propagation.
    pub fn register(&mut self, variable: VariableId, local_id: LocalId) {
        self.watchers.watch(
            variable,
            PropagatorVarId {
                propagator: self.propagator_id,
                variable: local_id,
            },
        );
        self.variable_queue.enqueue(variable);
    }

    /// Registers every variable of `scope` with its position as local id.
    pub fn register_scope(&mut self, scope: &[VariableId]) {
        for (position, &variable) in scope.iter().enumerate() {
            self.register(variable, LocalId::at(position));
        }
    }

    pub fn domain(&self, variable: VariableId) -> &Domain {
        &self.domains[variable]
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }
}
