//! Representations of relations given in extension, i.e. as lists of tuples.
//!
//! # Background
//!
//! A table constraint over the scope `x_0, ..., x_{n-1}` states that the tuple of values taken by
//! the scope belongs to a [`Relation`]. Relations are translated to value indexes against the
//! initial domains of the scope and then stored in one of three interchangeable structures:
//! - a [`Table`], the sorted list of index tuples,
//! - a [`DecisionDiagram`], a reduced layered graph sharing common suffixes,
//! - a [`BitsetTable`], one bitset of tuples per (variable, value) pair.
//!
//! All three answer whether a tuple of value indexes is allowed; the propagators in
//! [`crate::propagators`] filter with them. Tuple entries equal to [`STAR`] (or [`STAR_VALUE`] in
//! value tuples) match every value at their position.
mod bitset;
mod decision_diagram;
mod registry;
mod relation;
mod structure;
mod table;

pub use bitset::BitsetTable;
pub use bitset::Mask;
pub use decision_diagram::Automaton;
pub use decision_diagram::DecisionDiagram;
pub use decision_diagram::DecisionDiagramError;
pub use decision_diagram::KnapsackLimits;
pub use decision_diagram::NodeId;
pub use decision_diagram::Transition;
pub(crate) use registry::StructureRegistry;
pub(crate) use relation::n_valid_tuples_bounded;
pub(crate) use relation::IndexRelation;
pub use relation::Relation;
pub use relation::STAR;
pub use relation::STAR_VALUE;
pub use structure::ExtensionStructure;
pub(crate) use structure::StructureKind;
pub use table::Table;
