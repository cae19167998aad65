use std::rc::Rc;

use crate::basic_types::Depth;
use crate::basic_types::PropagationStatus;
use crate::containers::ReversibleSet;
use crate::create_statistics_struct;
use crate::engine::VariableId;
use crate::extension::DecisionDiagram;
use crate::extension::NodeId;
use crate::propagation::FilteringComplexity;
use crate::propagation::LocalId;
use crate::propagation::PropagationContextMut;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(DecisionDiagramStatistics {
    num_filter_calls: usize,
    num_nodes_killed: usize,
});

#[derive(Clone, Debug)]
pub(crate) struct DecisionDiagramArgs {
    pub(crate) scope: Box<[VariableId]>,
    pub(crate) diagram: Rc<DecisionDiagram>,
}

impl PropagatorConstructor for DecisionDiagramArgs {
    type PropagatorImpl = DecisionDiagramPropagator;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> DecisionDiagramPropagator {
        let DecisionDiagramArgs { scope, diagram } = self;
        context.register_scope(&scope);

        let num_nodes = diagram.node_count();
        DecisionDiagramPropagator {
            alive: ReversibleSet::new(num_nodes),
            visited_in: vec![0; num_nodes].into(),
            reaches_accept: vec![false; num_nodes].into(),
            call: 0,
            supported: diagram
                .domain_sizes()
                .iter()
                .map(|&size| vec![false; size].into())
                .collect(),
            scope,
            diagram,
            statistics: DecisionDiagramStatistics::default(),
        }
    }
}

/// Filtering with a [`DecisionDiagram`].
///
/// Each call explores the diagram depth-first from the root, following only the edges whose
/// value is still present. Nodes from which the accepting terminal cannot be reached any more are
/// removed from a [`ReversibleSet`] of alive nodes, so later calls in the same branch skip them.
/// The values on the edges of the paths that do reach the accepting terminal are supported; all
/// other values are removed.
#[derive(Clone, Debug)]
pub(crate) struct DecisionDiagramPropagator {
    scope: Box<[VariableId]>,
    diagram: Rc<DecisionDiagram>,
    alive: ReversibleSet,

    // Scratch space of a single call.
    visited_in: Box<[u64]>,
    reaches_accept: Box<[bool]>,
    call: u64,
    supported: Box<[Box<[bool]>]>,

    statistics: DecisionDiagramStatistics,
}

impl DecisionDiagramPropagator {
    #[cfg(test)]
    pub(crate) fn num_alive_nodes(&self) -> usize {
        // The terminals are never removed.
        self.alive.len() - 2
    }

    fn explore(
        &mut self,
        diagram: &DecisionDiagram,
        context: &PropagationContextMut,
        node: NodeId,
    ) -> bool {
        if node.is_terminal() {
            return node == NodeId::ACCEPT;
        }
        if !self.alive.contains(node.index()) {
            return false;
        }
        if self.visited_in[node.index()] == self.call {
            return self.reaches_accept[node.index()];
        }
        self.visited_in[node.index()] = self.call;

        let level = diagram.level(node);
        let domain = context.domain(self.scope[level]);
        let mut reaches_accept = false;

        for class in diagram.sons_classes(node).iter() {
            if !class.iter().any(|&index| domain.contains_index(index)) {
                continue;
            }
            let child = diagram.children(node)[class[0]];
            if self.explore(diagram, context, child) {
                reaches_accept = true;
                for &index in class.iter() {
                    self.supported[level][index] = true;
                }
            }
        }

        self.reaches_accept[node.index()] = reaches_accept;
        if !reaches_accept {
            self.alive.remove(node.index(), context.depth());
            self.statistics.num_nodes_killed += 1;
        }
        reaches_accept
    }
}

impl Propagator for DecisionDiagramPropagator {
    fn name(&self) -> &str {
        "DecisionDiagram"
    }

    fn filter(&mut self, mut context: PropagationContextMut, trigger: LocalId) -> PropagationStatus {
        self.statistics.num_filter_calls += 1;
        self.call += 1;
        for supported in self.supported.iter_mut() {
            supported.fill(false);
        }

        let diagram = Rc::clone(&self.diagram);
        if !self.explore(&diagram, &context, diagram.root()) {
            return context.wipe_out(self.scope[trigger.position()]);
        }

        for (level, &variable) in self.scope.iter().enumerate() {
            let supported = &self.supported[level];
            context.remove_indexes_checking(variable, |index| !supported[index])?;
        }

        Ok(())
    }

    fn restore_before(&mut self, depth: Depth) {
        self.alive.restore_before(depth);
    }

    fn filtering_complexity(&self) -> FilteringComplexity {
        FilteringComplexity::Moderate
    }

    fn check_indexes(&self, tuple: &[usize]) -> bool {
        self.diagram.check_indexes(tuple)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}
