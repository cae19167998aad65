use crate::basic_types::Depth;
use crate::containers::KeyedVec;
use crate::propagation::PropagatorId;

/// Records which propagators are entailed and since which depth.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entailment {
    is_entailed: KeyedVec<PropagatorId, bool>,
    log: Vec<(Depth, PropagatorId)>,
}

impl Entailment {
    pub(crate) fn mark(&mut self, propagator: PropagatorId, depth: Depth) {
        self.is_entailed.ensure_key(propagator, false);
        if !self.is_entailed[propagator] {
            self.is_entailed[propagator] = true;
            self.log.push((depth, propagator));
        }
    }

    pub(crate) fn is_entailed(&self, propagator: PropagatorId) -> bool {
        self.is_entailed
            .get(propagator)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        while let Some(&(entailed_at, propagator)) = self.log.last() {
            if entailed_at < depth {
                break;
            }
            let _ = self.log.pop();
            self.is_entailed[propagator] = false;
        }
    }
}
