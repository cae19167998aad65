//! # Tabula
//! A propagation core for finite-domain constraint solving, centred on constraints given in
//! extension.
//!
//! Variables have finite integer domains whose values are addressed through dense indexes. Table
//! constraints are stored as a [list of tuples](extension::Table), a
//! [decision diagram](extension::DecisionDiagram) or a [bitset table](extension::BitsetTable),
//! and filtered to generalized arc consistency by the matching propagator. Every mutation is
//! stamped with the depth of the search tree at which it happened, so that
//! [`Solver::restore_before`] undoes it exactly.
//!
//! # Example
//! ```
//! # use tabula_core::constraints;
//! # use tabula_core::extension::Relation;
//! # use tabula_core::search::DepthFirstSearch;
//! # use tabula_core::Solver;
//! let mut solver = Solver::default();
//! let x = solver.new_bounded_variable(1, 3).expect("non-empty domain");
//! let y = solver.new_bounded_variable(1, 3).expect("non-empty domain");
//!
//! // x < y
//! let _ = solver
//!     .add_constraint(constraints::table(
//!         [x, y],
//!         Relation::allowed([[1, 2], [1, 3], [2, 3]]),
//!     ))
//!     .expect("consistent at the root");
//! assert_eq!(solver.domain(x).sorted_values(), vec![1, 2]);
//!
//! let result = DepthFirstSearch::new([x, y]).solve(&mut solver);
//! assert_eq!(result.solutions.len(), 3);
//! ```
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod propagators;
pub(crate) mod tabula_asserts;

pub mod constraints;
pub mod extension;
pub mod options;
pub mod propagation;
pub mod search;
pub mod statistics;

pub use convert_case;
pub use rand;

pub use crate::basic_types::Conflict;
pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Depth;
pub use crate::basic_types::EmptyDomain;
pub use crate::basic_types::PropagationStatus;
pub use crate::engine::Domain;
pub use crate::engine::Solver;
pub use crate::engine::VariableId;
