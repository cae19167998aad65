use super::Domain;
use super::ValueMap;
use super::VariableId;
use crate::basic_types::Depth;
use crate::containers::KeyedVec;

/// Owns the domain of every variable.
#[derive(Clone, Debug, Default)]
pub(crate) struct DomainStore {
    domains: KeyedVec<VariableId, Domain>,
}

impl DomainStore {
    pub(crate) fn grow(&mut self, values: ValueMap) -> VariableId {
        self.domains.push(Domain::new(values))
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn variables(&self) -> impl Iterator<Item = VariableId> {
        self.domains.keys()
    }

    pub(crate) fn restore_before(&mut self, depth: Depth) {
        self.domains
            .iter_mut()
            .for_each(|domain| domain.restore_before(depth));
    }
}

impl std::ops::Index<VariableId> for DomainStore {
    type Output = Domain;

    fn index(&self, variable: VariableId) -> &Domain {
        &self.domains[variable]
    }
}

impl std::ops::IndexMut<VariableId> for DomainStore {
    fn index_mut(&mut self, variable: VariableId) -> &mut Domain {
        &mut self.domains[variable]
    }
}
