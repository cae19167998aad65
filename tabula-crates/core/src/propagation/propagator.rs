use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::LocalId;
use super::PropagationContextMut;
use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::create_statistics_struct;
#[cfg(doc)]
use crate::Solver;
use crate::statistics::StatisticLogger;

// We need to use this to cast from `Box<dyn Propagator>` to a concrete propagator; rust inherently
// does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

/// All propagators implement the [`Propagator`] trait, which defines the filtering logic of a
/// constraint and how its internal state follows the search.
///
/// The only required functions are [`Propagator::name`], [`Propagator::filter`] and
/// [`Propagator::check_indexes`]; all other functions have default implementations.
pub trait Propagator: Downcast {
    /// Return the name of the propagator, this is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// Removes values which have lost their support, given that the domain of the variable at
    /// position `trigger` of the scope changed.
    ///
    /// Removals go through the [`PropagationContextMut`], which enqueues the reduced variables.
    /// When a domain would become empty the call returns [`EmptyDomain`] immediately; removals
    /// made before that point stay in place and are undone by the search driver when it
    /// backtracks.
    ///
    /// Propagators are not required to reach a fixed point; they are called again by the solver
    /// until no further removals happen.
    ///
    /// [`EmptyDomain`]: crate::basic_types::EmptyDomain
    fn filter(&mut self, context: PropagationContextMut, trigger: LocalId) -> PropagationStatus;

    /// Called each time the [`Solver`] backtracks; every internal change made at a depth greater
    /// than or equal to `depth` has to be undone.
    ///
    /// By default this function does nothing.
    fn restore_before(&mut self, _depth: Depth) {}

    /// Determines whether the propagator runs as soon as one of its variables changes, or is
    /// deferred to the auxiliary queue of its tier.
    fn filtering_complexity(&self) -> FilteringComplexity {
        FilteringComplexity::Cheap
    }

    /// Whether the fully instantiated tuple of value indices, given in scope order, satisfies the
    /// constraint.
    fn check_indexes(&self, tuple: &[usize]) -> bool;

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// The number of auxiliary queues, one per non-cheap tier.
pub const MAX_FILTERING_COMPLEXITY: usize = 2;

/// How expensive a call to [`Propagator::filter`] is. Cheap propagators run eagerly; the others
/// are deferred until the variable queue is empty and called once per batch of events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilteringComplexity {
    #[default]
    Cheap = 0,
    Moderate = 1,
    Expensive = 2,
}

impl FilteringComplexity {
    /// The auxiliary queue used for this tier, if any.
    pub(crate) fn auxiliary_queue(self) -> Option<usize> {
        match self {
            FilteringComplexity::Cheap => None,
            tier => Some(tier as usize - 1),
        }
    }
}
