mod constraint_operation_error;
mod propagation_status;
mod reversible_values;
mod trail;

pub use constraint_operation_error::ConstraintOperationError;
pub use propagation_status::*;
pub(crate) use reversible_values::ReversibleValues;
pub(crate) use trail::Trail;

/// Position in the search tree. Every reversible mutation is stamped with the depth at which it
/// happened.
pub type Depth = usize;
