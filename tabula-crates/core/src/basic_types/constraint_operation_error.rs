use thiserror::Error;

use crate::engine::VariableId;
use crate::extension::DecisionDiagramError;

/// Errors related to building variables and posting constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    #[error("Tuple {tuple} has arity {found} but the scope has {expected} variables")]
    ArityMismatch {
        tuple: usize,
        expected: usize,
        found: usize,
    },
    #[error("Variable {0} occurs more than once in the scope")]
    DuplicateVariable(VariableId),
    #[error("Variable {0} does not belong to this solver")]
    UnknownVariable(VariableId),
    #[error("The value {0} is reserved to denote a wildcard")]
    ReservedValue(i32),
    #[error("A variable cannot be created with an empty domain")]
    EmptyInitialDomain,
    #[error("Adding the constraint led to a wipeout at the root")]
    InfeasibleAtRoot,
    #[error("The solver is already in an infeasible state")]
    InfeasibleState,
    #[error("A negative table with wildcards over {cartesian_size} combinations is too large to be complemented")]
    StarredNegativeTable { cartesian_size: u64 },
    #[error("Malformed decision diagram: {0}")]
    MalformedDecisionDiagram(#[from] DecisionDiagramError),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
