use log::debug;

use super::ExtensionStructure;
use super::IndexRelation;
use super::StructureKind;
use crate::basic_types::ConstraintOperationError;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::propagation::PropagatorId;
use crate::tabula_assert_simple;

/// Identifies a structure stored in a [`StructureRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StructureId(u32);

impl StorageKey for StructureId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StructureId(index as u32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StructureKey {
    kind: StructureKind,
    relation: IndexRelation,
}

#[derive(Clone, Debug)]
struct SharedStructure {
    structure: ExtensionStructure,
    /// The propagators filtering with the structure.
    registered: Vec<PropagatorId>,
}

/// Keeps one structure per (representation, relation over domain sizes) so that constraints over
/// identical relations share it.
#[derive(Debug, Default)]
pub(crate) struct StructureRegistry {
    ids: HashMap<StructureKey, StructureId>,
    structures: KeyedVec<StructureId, SharedStructure>,
}

impl StructureRegistry {
    /// Returns the structure of `kind` stored for `relation`, building it with `build` when there
    /// is none yet.
    pub(crate) fn get_or_build(
        &mut self,
        kind: StructureKind,
        relation: &IndexRelation,
        build: impl FnOnce(&IndexRelation) -> Result<ExtensionStructure, ConstraintOperationError>,
    ) -> Result<(StructureId, ExtensionStructure), ConstraintOperationError> {
        let key = StructureKey {
            kind,
            relation: relation.clone(),
        };

        if let Some(&id) = self.ids.get(&key) {
            debug!(
                "sharing {kind:?} structure {} between {} constraints",
                id.0,
                self.structures[id].registered.len() + 1
            );
            return Ok((id, self.structures[id].structure.clone()));
        }

        let structure = build(relation)?;
        tabula_assert_simple!(structure.kind() == kind);
        let id = self.structures.push(SharedStructure {
            structure: structure.clone(),
            registered: vec![],
        });
        let _ = self.ids.insert(key, id);
        Ok((id, structure))
    }

    /// Records that `propagator` filters with the structure `id`.
    pub(crate) fn register(&mut self, id: StructureId, propagator: PropagatorId) {
        self.structures[id].registered.push(propagator);
    }

    #[cfg(test)]
    pub(crate) fn registered(&self, id: StructureId) -> &[PropagatorId] {
        &self.structures[id].registered
    }

    pub(crate) fn len(&self) -> usize {
        self.structures.len()
    }
}
