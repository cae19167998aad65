use std::rc::Rc;

use super::BitsetTable;
use super::DecisionDiagram;
use super::Table;

/// One of the interchangeable representations of a relation. Every variant answers the same
/// question: is a fully instantiated tuple of value indexes allowed?
#[derive(Clone, Debug)]
pub enum ExtensionStructure {
    Table(Rc<Table>),
    DecisionDiagram(Rc<DecisionDiagram>),
    Bitset(Rc<BitsetTable>),
}

impl ExtensionStructure {
    pub fn arity(&self) -> usize {
        match self {
            ExtensionStructure::Table(table) => table.arity(),
            ExtensionStructure::DecisionDiagram(diagram) => diagram.arity(),
            ExtensionStructure::Bitset(bitset) => bitset.arity(),
        }
    }

    pub fn check_indexes(&self, tuple: &[usize]) -> bool {
        match self {
            ExtensionStructure::Table(table) => table.check_indexes(tuple),
            ExtensionStructure::DecisionDiagram(diagram) => diagram.check_indexes(tuple),
            ExtensionStructure::Bitset(bitset) => bitset.check_indexes(tuple),
        }
    }

    pub(crate) fn kind(&self) -> StructureKind {
        match self {
            ExtensionStructure::Table(_) => StructureKind::Table,
            ExtensionStructure::DecisionDiagram(_) => StructureKind::DecisionDiagram,
            ExtensionStructure::Bitset(_) => StructureKind::Bitset,
        }
    }

    /// Whether `self` and `other` are the same shared structure.
    pub fn ptr_eq(&self, other: &ExtensionStructure) -> bool {
        match (self, other) {
            (ExtensionStructure::Table(a), ExtensionStructure::Table(b)) => Rc::ptr_eq(a, b),
            (ExtensionStructure::DecisionDiagram(a), ExtensionStructure::DecisionDiagram(b)) => {
                Rc::ptr_eq(a, b)
            }
            (ExtensionStructure::Bitset(a), ExtensionStructure::Bitset(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum StructureKind {
    Table,
    DecisionDiagram,
    Bitset,
}
