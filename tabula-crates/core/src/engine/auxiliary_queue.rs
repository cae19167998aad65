use std::collections::VecDeque;

use super::VariableId;
use crate::containers::KeyedVec;
use crate::propagation::LocalId;
use crate::propagation::PropagatorId;

/// Deferred calls of the propagators of one filtering complexity tier.
///
/// A propagator is present at most once; enqueueing it again only replaces the variable it will
/// be triggered with, so a burst of events results in a single call with the last triggering
/// variable.
#[derive(Debug, Clone, Default)]
pub(crate) struct AuxiliaryQueue {
    order: VecDeque<PropagatorId>,
    last_trigger: KeyedVec<PropagatorId, Option<(VariableId, LocalId)>>,
}

impl AuxiliaryQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn add(&mut self, propagator: PropagatorId, trigger: (VariableId, LocalId)) {
        self.last_trigger.ensure_key(propagator, None);
        if self.last_trigger[propagator].is_none() {
            self.order.push_back(propagator);
        }
        self.last_trigger[propagator] = Some(trigger);
    }

    /// Removes the propagator which was added first, together with its last trigger.
    pub(crate) fn shift(&mut self) -> Option<(PropagatorId, (VariableId, LocalId))> {
        let propagator = self.order.pop_front()?;
        let trigger = self.last_trigger[propagator]
            .take()
            .expect("queued propagators have a trigger");
        Some((propagator, trigger))
    }

    pub(crate) fn clear(&mut self) {
        while self.shift().is_some() {}
    }
}
