use super::DecisionDiagram;
use super::DecisionDiagramError;
use super::NodeId;
use crate::containers::HashMap;
use crate::extension::IndexRelation;
use crate::extension::STAR;
use crate::tabula_assert_moderate;

/// A mutable, unreduced diagram which the different construction methods fill in before handing
/// it to [`DiagramBuilder::finish`].
///
/// Node 0 and 1 are the terminals; every other node is created with [`DiagramBuilder::new_node`].
#[derive(Clone, Debug)]
pub(crate) struct DiagramBuilder {
    domain_sizes: Vec<usize>,
    levels: Vec<usize>,
    children: Vec<Vec<NodeId>>,
}

impl DiagramBuilder {
    pub(crate) fn new(domain_sizes: Vec<usize>) -> DiagramBuilder {
        let arity = domain_sizes.len();
        DiagramBuilder {
            domain_sizes,
            levels: vec![arity, arity],
            children: vec![vec![], vec![]],
        }
    }

    pub(crate) fn arity(&self) -> usize {
        self.domain_sizes.len()
    }

    /// Creates a node at `level` whose children all are `default`.
    pub(crate) fn new_node(&mut self, level: usize, default: NodeId) -> NodeId {
        let id = NodeId(self.levels.len() as u32);
        self.levels.push(level);
        self.children.push(vec![default; self.domain_sizes[level]]);
        id
    }

    pub(crate) fn child(&self, node: NodeId, index: usize) -> NodeId {
        self.children[node.index()][index]
    }

    pub(crate) fn set_child(&mut self, node: NodeId, index: usize, child: NodeId) {
        self.children[node.index()][index] = child;
    }

    /// Makes `tuple`, which may contain [`STAR`], lead to the terminal corresponding to
    /// `positive` from `root`.
    pub(crate) fn add_tuple(&mut self, root: NodeId, tuple: &[usize], positive: bool) {
        let level = self.levels[root.index()];
        if tuple[level] == STAR {
            for index in 0..self.children[root.index()].len() {
                self.add_branch(root, index, tuple, positive);
            }
        } else {
            self.add_branch(root, tuple[level], tuple, positive);
        }
    }

    fn add_branch(&mut self, node: NodeId, index: usize, tuple: &[usize], positive: bool) {
        let level = self.levels[node.index()];
        let child = self.child(node, index);

        if !child.is_terminal() {
            self.add_tuple(child, tuple, positive);
        } else if level + 1 == self.arity() {
            let terminal = if positive {
                NodeId::ACCEPT
            } else {
                NodeId::REJECT
            };
            self.set_child(node, index, terminal);
        } else {
            let default = if positive {
                NodeId::REJECT
            } else {
                NodeId::ACCEPT
            };
            let created = self.new_node(level + 1, default);
            self.set_child(node, index, created);
            self.add_tuple(created, tuple, positive);
        }
    }

    /// Reduces the diagram below `root` and renumbers it into a [`DecisionDiagram`].
    pub(crate) fn finish(mut self, root: NodeId) -> DecisionDiagram {
        let mut reaches_accept = vec![None; self.levels.len()];
        let _ = self.prune_dead_nodes(root, &mut reaches_accept);

        let mut unique = HashMap::default();
        let mut representatives = vec![None; self.levels.len()];
        let root = self.merge_equivalent_nodes(root, &mut unique, &mut representatives);

        let diagram = self.rename_from(root);
        tabula_assert_moderate!(diagram.is_canonical());
        diagram
    }

    /// Redirects every edge towards a node which cannot reach [`NodeId::ACCEPT`] to
    /// [`NodeId::REJECT`]. Returns whether `node` reaches [`NodeId::ACCEPT`].
    fn prune_dead_nodes(&mut self, node: NodeId, reaches_accept: &mut [Option<bool>]) -> bool {
        if node.is_terminal() {
            return node == NodeId::ACCEPT;
        }
        if let Some(known) = reaches_accept[node.index()] {
            return known;
        }

        let mut alive = false;
        for index in 0..self.children[node.index()].len() {
            let child = self.child(node, index);
            if self.prune_dead_nodes(child, reaches_accept) {
                alive = true;
            } else {
                self.set_child(node, index, NodeId::REJECT);
            }
        }
        reaches_accept[node.index()] = Some(alive);
        alive
    }

    /// Merges nodes with the same level and children, bottom-up. Returns the node standing in for
    /// `node` afterwards.
    fn merge_equivalent_nodes(
        &mut self,
        node: NodeId,
        unique: &mut HashMap<(usize, Vec<NodeId>), NodeId>,
        representatives: &mut [Option<NodeId>],
    ) -> NodeId {
        if node.is_terminal() {
            return node;
        }
        if let Some(representative) = representatives[node.index()] {
            return representative;
        }

        for index in 0..self.children[node.index()].len() {
            let child = self.child(node, index);
            let merged = self.merge_equivalent_nodes(child, unique, representatives);
            self.set_child(node, index, merged);
        }

        let key = (self.levels[node.index()], self.children[node.index()].clone());
        let representative = *unique.entry(key).or_insert(node);
        representatives[node.index()] = Some(representative);
        representative
    }

    /// Numbers the nodes reachable from `root` in depth-first pre-order, visiting children by
    /// increasing index, with `root` becoming [`NodeId::ROOT`].
    fn rename_from(self, root: NodeId) -> DecisionDiagram {
        let mut renamed = vec![None; self.levels.len()];
        renamed[NodeId::REJECT.index()] = Some(NodeId::REJECT);
        renamed[NodeId::ACCEPT.index()] = Some(NodeId::ACCEPT);
        let mut order = vec![NodeId::REJECT, NodeId::ACCEPT];

        // Merging never maps an internal node to a terminal, so a dead root stays internal.
        self.visit_in_pre_order(root, &mut renamed, &mut order);
        self.collect(renamed, order)
    }

    fn visit_in_pre_order(
        &self,
        node: NodeId,
        renamed: &mut [Option<NodeId>],
        order: &mut Vec<NodeId>,
    ) {
        if renamed[node.index()].is_some() {
            return;
        }
        renamed[node.index()] = Some(NodeId(order.len() as u32));
        order.push(node);
        for &child in self.children[node.index()].iter() {
            self.visit_in_pre_order(child, renamed, order);
        }
    }

    fn collect(self, renamed: Vec<Option<NodeId>>, order: Vec<NodeId>) -> DecisionDiagram {
        let mut levels = Vec::with_capacity(order.len());
        let mut children = Vec::with_capacity(order.len());
        for node in order {
            levels.push(self.levels[node.index()]);
            children.push(
                self.children[node.index()]
                    .iter()
                    .map(|child| renamed[child.index()].expect("children are visited"))
                    .collect::<Box<[NodeId]>>(),
            );
        }
        DecisionDiagram::from_parts(self.domain_sizes.into(), levels, children)
    }
}

impl DecisionDiagram {
    /// Builds the diagram of the relation over domains of the given sizes listing `tuples`; they
    /// are the allowed tuples when `positive` holds and the forbidden ones otherwise. Tuple entries
    /// equal to [`STAR`] match every index.
    pub fn from_tuples(
        domain_sizes: &[usize],
        tuples: &[Vec<usize>],
        positive: bool,
    ) -> Result<DecisionDiagram, DecisionDiagramError> {
        if domain_sizes.is_empty() {
            return Err(DecisionDiagramError::EmptyLevels);
        }
        for (position, tuple) in tuples.iter().enumerate() {
            if tuple.len() != domain_sizes.len() {
                return Err(DecisionDiagramError::ArityMismatch {
                    tuple: position,
                    expected: domain_sizes.len(),
                    found: tuple.len(),
                });
            }
            if let Some((level, &index)) = tuple
                .iter()
                .enumerate()
                .find(|&(level, &index)| index != STAR && index >= domain_sizes[level])
            {
                return Err(DecisionDiagramError::IndexOutOfRange { level, index });
            }
        }

        let mut builder = DiagramBuilder::new(domain_sizes.to_vec());
        let default = if positive {
            NodeId::REJECT
        } else {
            NodeId::ACCEPT
        };
        let root = builder.new_node(0, default);
        for tuple in tuples {
            builder.add_tuple(root, tuple, positive);
        }
        Ok(builder.finish(root))
    }

    pub(crate) fn from_relation(
        relation: &IndexRelation,
    ) -> Result<DecisionDiagram, DecisionDiagramError> {
        DecisionDiagram::from_tuples(&relation.domain_sizes, &relation.tuples, relation.positive)
    }
}

#[cfg(test)]
mod tests {
    use super::DiagramBuilder;
    use crate::extension::decision_diagram::NodeId;

    #[test]
    fn dead_branches_are_redirected_to_reject() {
        let mut builder = DiagramBuilder::new(vec![2, 2]);
        let root = builder.new_node(0, NodeId::REJECT);
        let dead = builder.new_node(1, NodeId::REJECT);
        let alive = builder.new_node(1, NodeId::REJECT);
        builder.set_child(root, 0, dead);
        builder.set_child(root, 1, alive);
        builder.set_child(alive, 1, NodeId::ACCEPT);

        let diagram = builder.finish(root);

        assert_eq!(diagram.children(diagram.root())[0], NodeId::REJECT);
        assert_eq!(diagram.node_count(), 4);
        assert_eq!(diagram.edge_count(), 2);
    }

    #[test]
    fn a_dead_diagram_keeps_a_root() {
        let mut builder = DiagramBuilder::new(vec![3]);
        let root = builder.new_node(0, NodeId::REJECT);

        let diagram = builder.finish(root);

        assert_eq!(diagram.node_count(), 3);
        assert_eq!(diagram.children(diagram.root()), &[NodeId::REJECT; 3]);
        assert!(diagram.is_canonical());
    }
}
