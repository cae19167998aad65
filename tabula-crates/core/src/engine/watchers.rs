use super::VariableId;
use crate::containers::KeyedVec;
use crate::propagation::PropagatorVarId;

/// For every variable, the propagators which registered to it, in registration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Watchers {
    watch_lists: KeyedVec<VariableId, Vec<PropagatorVarId>>,
}

impl Watchers {
    pub(crate) fn grow(&mut self) {
        let _ = self.watch_lists.push(Vec::new());
    }

    pub(crate) fn watch(&mut self, variable: VariableId, watcher: PropagatorVarId) {
        self.watch_lists.ensure_key(variable, Vec::new());
        self.watch_lists[variable].push(watcher);
    }

    pub(crate) fn get(&self, variable: VariableId) -> &[PropagatorVarId] {
        self.watch_lists
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
