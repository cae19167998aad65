use super::CompactTableArgs;
use super::CompactTablePropagator;
use super::DecisionDiagramArgs;
use super::DecisionDiagramPropagator;
use super::Str2Args;
use super::Str2NegativeArgs;
use super::Str2NegativePropagator;
use super::Str2Propagator;
use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
use crate::propagation::FilteringComplexity;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::StatisticLogger;

/// The arguments of one of the table filters.
#[derive(Clone, Debug)]
pub(crate) enum ExtensionArgs {
    Str2(Str2Args),
    Str2Negative(Str2NegativeArgs),
    CompactTable(CompactTableArgs),
    DecisionDiagram(DecisionDiagramArgs),
}

impl PropagatorConstructor for ExtensionArgs {
    type PropagatorImpl = ExtensionPropagator;

    fn create(self, context: PropagatorConstructorContext<'_>) -> ExtensionPropagator {
        match self {
            ExtensionArgs::Str2(args) => ExtensionPropagator::Str2(args.create(context)),
            ExtensionArgs::Str2Negative(args) => {
                ExtensionPropagator::Str2Negative(args.create(context))
            }
            ExtensionArgs::CompactTable(args) => {
                ExtensionPropagator::CompactTable(args.create(context))
            }
            ExtensionArgs::DecisionDiagram(args) => {
                ExtensionPropagator::DecisionDiagram(args.create(context))
            }
        }
    }
}

/// A table constraint, filtered by the algorithm matching the structure its relation is stored
/// in. Every table constraint posted through [`crate::constraints`] is one of these.
#[derive(Clone, Debug)]
pub(crate) enum ExtensionPropagator {
    Str2(Str2Propagator),
    Str2Negative(Str2NegativePropagator),
    CompactTable(CompactTablePropagator),
    DecisionDiagram(DecisionDiagramPropagator),
}

impl ExtensionPropagator {
    fn inner(&self) -> &dyn Propagator {
        match self {
            ExtensionPropagator::Str2(propagator) => propagator,
            ExtensionPropagator::Str2Negative(propagator) => propagator,
            ExtensionPropagator::CompactTable(propagator) => propagator,
            ExtensionPropagator::DecisionDiagram(propagator) => propagator,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Propagator {
        match self {
            ExtensionPropagator::Str2(propagator) => propagator,
            ExtensionPropagator::Str2Negative(propagator) => propagator,
            ExtensionPropagator::CompactTable(propagator) => propagator,
            ExtensionPropagator::DecisionDiagram(propagator) => propagator,
        }
    }
}

impl Propagator for ExtensionPropagator {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn filter(&mut self, context: PropagationContextMut, trigger: LocalId) -> PropagationStatus {
        self.inner_mut().filter(context, trigger)
    }

    fn restore_before(&mut self, depth: Depth) {
        self.inner_mut().restore_before(depth)
    }

    fn filtering_complexity(&self) -> FilteringComplexity {
        self.inner().filtering_complexity()
    }

    fn check_indexes(&self, tuple: &[usize]) -> bool {
        self.inner().check_indexes(tuple)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.inner().log_statistics(statistic_logger)
    }
}
