//! The propagation engine: domains, the queues of pending work and the [`Solver`] which drives
//! the propagators to a fixed point.
mod auxiliary_queue;
pub(crate) mod domains;
mod entailment;
mod scheduler;
mod solver;
#[cfg(test)]
pub(crate) mod test_solver;
mod variable_queue;
mod watchers;

pub(crate) use auxiliary_queue::AuxiliaryQueue;
pub use domains::Domain;
pub(crate) use domains::DomainStore;
pub(crate) use domains::ValueMap;
pub use domains::VariableId;
pub(crate) use entailment::Entailment;
pub(crate) use scheduler::Scheduler;
pub use solver::Solver;
pub(crate) use variable_queue::VariableQueue;
pub(crate) use watchers::Watchers;
