use super::PropagatorId;
use crate::basic_types::Depth;
use crate::basic_types::EmptyDomain;
use crate::basic_types::PropagationStatus;
use crate::engine::Domain;
use crate::engine::DomainStore;
use crate::engine::Entailment;
use crate::engine::VariableId;
use crate::engine::VariableQueue;

/// [`PropagationContextMut`] is passed to [`Propagator::filter`](super::Propagator::filter) and is
/// the only way a propagator reads and reduces domains.
///
/// Every reduction made through the context enqueues the reduced variable; a reduction that would
/// wipe out a domain is refused and recorded as the last wipeout of the solver.
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    domains: &'a mut DomainStore,
    variable_queue: &'a mut VariableQueue,
    entailment: &'a mut Entailment,
    last_wipeout: &'a mut Option<VariableId>,
    propagator_id: PropagatorId,
    depth: Depth,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(
        domains: &'a mut DomainStore,
        variable_queue: &'a mut VariableQueue,
        entailment: &'a mut Entailment,
        last_wipeout: &'a mut Option<VariableId>,
        propagator_id: PropagatorId,
        depth: Depth,
    ) -> Self {
        PropagationContextMut {
            domains,
            variable_queue,
            entailment,
            last_wipeout,
            propagator_id,
            depth,
        }
    }

    pub fn domain(&self, variable: VariableId) -> &Domain {
        &self.domains[variable]
    }

    /// The depth at which reductions made through this context are stamped.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Applies `update` to the domain of `variable`, enqueueing the variable when its domain
    /// shrank.
    pub fn modify(
        &mut self,
        variable: VariableId,
        update: impl FnOnce(&mut Domain, Depth) -> Result<(), EmptyDomain>,
    ) -> PropagationStatus {
        let domain = &mut self.domains[variable];
        let size_before = domain.size();
        let result = update(domain, self.depth);

        if domain.size() != size_before {
            self.variable_queue.enqueue(variable);
        }
        if result.is_err() {
            *self.last_wipeout = Some(variable);
        }
        result
    }

    pub fn remove(&mut self, variable: VariableId, index: usize) -> PropagationStatus {
        self.modify(variable, |domain, depth| domain.remove_index(index, depth))
    }

    pub fn remove_value(&mut self, variable: VariableId, value: i32) -> PropagationStatus {
        self.modify(variable, |domain, depth| {
            domain.remove_value_if_present(value, depth).map(|_| ())
        })
    }

    pub fn reduce_to(&mut self, variable: VariableId, index: usize) -> PropagationStatus {
        self.modify(variable, |domain, depth| domain.reduce_to_index(index, depth))
    }

    /// Removes every present index of `variable` for which `predicate` holds.
    pub fn remove_indexes_checking(
        &mut self,
        variable: VariableId,
        predicate: impl FnMut(usize) -> bool,
    ) -> PropagationStatus {
        self.modify(variable, |domain, depth| {
            domain.remove_indexes_checking(predicate, depth).map(|_| ())
        })
    }

    /// Reports that the constraint cannot be satisfied any more, blaming `variable`.
    pub fn wipe_out(&mut self, variable: VariableId) -> PropagationStatus {
        *self.last_wipeout = Some(variable);
        Err(EmptyDomain)
    }

    /// Declares the propagator entailed: it is not called again until the search backtracks
    /// above the current depth.
    pub fn mark_entailed(&mut self) {
        self.entailment.mark(self.propagator_id, self.depth);
    }
}
