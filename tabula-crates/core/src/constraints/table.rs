use std::rc::Rc;

use log::debug;
use log::warn;

use super::validate_scope;
use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::engine::VariableId;
use crate::extension::BitsetTable;
use crate::extension::DecisionDiagram;
use crate::extension::ExtensionStructure;
use crate::extension::IndexRelation;
use crate::extension::Relation;
use crate::extension::StructureKind;
use crate::extension::Table;
use crate::options::ExtensionOptions;
use crate::options::NegativeTableBackend;
use crate::options::PositiveTableBackend;
use crate::propagation::PropagatorId;
use crate::propagators::CompactTableArgs;
use crate::propagators::DecisionDiagramArgs;
use crate::propagators::ExtensionArgs;
use crate::propagators::Str2Args;
use crate::propagators::Str2NegativeArgs;
use crate::Solver;

/// Creates the [`Constraint`] stating that the values of `scope` form a tuple of `relation`.
///
/// Tuples mentioning a value outside the initial domain of its variable are ignored. The
/// representation of the relation is chosen according to the
/// [`ExtensionOptions`](crate::options::ExtensionOptions) of the solver it is posted to.
pub fn table(scope: impl Into<Box<[VariableId]>>, relation: Relation) -> TableConstraint {
    TableConstraint {
        scope: scope.into(),
        relation,
    }
}

/// Creates the [`Constraint`] stating that the values of `scope` form none of `tuples`.
pub fn negative_table<Tuple: Into<Vec<i32>>>(
    scope: impl Into<Box<[VariableId]>>,
    tuples: impl IntoIterator<Item = Tuple>,
) -> TableConstraint {
    table(scope, Relation::forbidden(tuples))
}

/// A constraint given by a [`Relation`] over its scope; see [`table`].
#[derive(Clone, Debug)]
pub struct TableConstraint {
    scope: Box<[VariableId]>,
    relation: Relation,
}

impl Constraint for TableConstraint {
    fn post(self, solver: &mut Solver) -> Result<PropagatorId, ConstraintOperationError> {
        validate_scope(solver, &self.scope)?;
        let options = solver.options().extension;

        let relation = {
            let domains = self
                .scope
                .iter()
                .map(|&variable| solver.domain(variable))
                .collect::<Vec<_>>();
            IndexRelation::from_values(&self.relation, &domains)?
        };
        if relation.tuples.is_empty() {
            warn!(
                "{} table over {} variables without tuples in the domains",
                if relation.positive { "positive" } else { "negative" },
                relation.arity()
            );
        }

        let (kind, relation) = select_representation(&options, relation)?;
        debug!(
            "representing a table with {} tuples over {:?} as {kind:?}",
            relation.tuples.len(),
            relation.domain_sizes
        );

        let build = |relation: &IndexRelation| build_structure(&options, kind, relation);
        let (shared, structure) = if options.share_structures {
            let (id, structure) = solver
                .structures_mut()
                .get_or_build(kind, &relation, build)?;
            (Some(id), structure)
        } else {
            (None, build(&relation)?)
        };

        let scope = self.scope;
        let args = match structure {
            ExtensionStructure::Table(table) if table.is_positive() => {
                ExtensionArgs::Str2(Str2Args { scope, table })
            }
            ExtensionStructure::Table(table) => {
                ExtensionArgs::Str2Negative(Str2NegativeArgs { scope, table })
            }
            ExtensionStructure::Bitset(table) => {
                ExtensionArgs::CompactTable(CompactTableArgs { scope, table })
            }
            ExtensionStructure::DecisionDiagram(diagram) => {
                ExtensionArgs::DecisionDiagram(DecisionDiagramArgs { scope, diagram })
            }
        };

        let propagator = solver.add_propagator(args)?;
        if let Some(id) = shared {
            solver.structures_mut().register(id, propagator);
        }
        Ok(propagator)
    }
}

/// Decides how `relation` is stored; negative relations may be complemented on the way.
///
/// The counting filter of negative tables needs tuples without wildcards, so a starred negative
/// relation is only accepted when it is complemented.
fn select_representation(
    options: &ExtensionOptions,
    relation: IndexRelation,
) -> Result<(StructureKind, IndexRelation), ConstraintOperationError> {
    if relation.positive {
        return Ok((select_positive(options, &relation), relation));
    }

    let complement = match options.negative_backend {
        NegativeTableBackend::Complement => true,
        NegativeTableBackend::Str2Negative => false,
        NegativeTableBackend::Automatic => relation.cartesian_size() <= options.complement_limit,
    };

    if complement {
        let relation = relation.complement();
        Ok((select_positive(options, &relation), relation))
    } else if relation.is_starred() {
        Err(ConstraintOperationError::StarredNegativeTable {
            cartesian_size: relation.cartesian_size(),
        })
    } else {
        Ok((StructureKind::Table, relation))
    }
}

fn select_positive(options: &ExtensionOptions, relation: &IndexRelation) -> StructureKind {
    match options.positive_backend {
        PositiveTableBackend::Str2 => StructureKind::Table,
        PositiveTableBackend::CompactTable => StructureKind::Bitset,
        PositiveTableBackend::DecisionDiagram => StructureKind::DecisionDiagram,
        PositiveTableBackend::Automatic => {
            if relation.arity() >= options.decision_diagram_min_arity {
                StructureKind::DecisionDiagram
            } else if relation.tuples.len() >= options.compact_table_min_tuples {
                StructureKind::Bitset
            } else {
                StructureKind::Table
            }
        }
    }
}

fn build_structure(
    options: &ExtensionOptions,
    kind: StructureKind,
    relation: &IndexRelation,
) -> Result<ExtensionStructure, ConstraintOperationError> {
    let structure = match kind {
        StructureKind::Table => ExtensionStructure::Table(Rc::new(Table::new(relation.clone()))),
        StructureKind::Bitset => ExtensionStructure::Bitset(Rc::new(BitsetTable::new(
            relation,
            options.mask_compression_trigger,
            options.mask_compression_limit,
        ))),
        StructureKind::DecisionDiagram => {
            let diagram = DecisionDiagram::from_relation(relation)?;
            debug!(
                "decision diagram with {} nodes and {} edges",
                diagram.node_count(),
                diagram.edge_count()
            );
            ExtensionStructure::DecisionDiagram(Rc::new(diagram))
        }
    };
    Ok(structure)
}
