use std::fmt::Display;

use super::Depth;
use crate::engine::VariableId;
use crate::propagation::PropagatorId;

/// Returned when a removal would leave a domain without any value.
///
/// The removal is refused, so the domain keeps its last value; the search driver has to
/// backtrack before the domain is used again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmptyDomain;

/// The result of a single filtering call.
pub type PropagationStatus = Result<(), EmptyDomain>;

/// Describes a failed propagation: which variable was wiped out, by which propagator (if any),
/// and at which depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub variable: VariableId,
    pub propagator: Option<PropagatorId>,
    pub depth: Depth,
}

impl Conflict {
    /// A wipeout at depth 0 means the problem has no solution; at any deeper depth it only means
    /// the current branch is inconsistent.
    pub fn is_root_failure(&self) -> bool {
        self.depth == 0
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.propagator {
            Some(propagator) => write!(
                f,
                "domain of {} wiped out by {propagator} at depth {}",
                self.variable, self.depth
            ),
            None => write!(
                f,
                "domain of {} wiped out by a decision at depth {}",
                self.variable, self.depth
            ),
        }
    }
}
