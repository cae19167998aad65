//! Reduced multi-valued decision diagrams.
//!
//! # Background
//!
//! A decision diagram over the scope `x_0, ..., x_{n-1}` is a layered DAG. A node at level `i`
//! has one child per value index of `x_i`; following the children selected by a tuple from the
//! root ends either in the accepting or in the rejecting terminal, which tells whether the tuple
//! belongs to the relation. Shared suffixes of the relation are represented once, which can make
//! the diagram exponentially smaller than the list of its tuples.
//!
//! # Practical
//!
//! The nodes live in an arena and are addressed by [`NodeId`]; [`NodeId::REJECT`] and
//! [`NodeId::ACCEPT`] are the two terminals. A diagram is obtained from one of the builders
//! ([`DecisionDiagram::from_tuples`], [`DecisionDiagram::from_automaton`],
//! [`DecisionDiagram::from_transitions`] and [`DecisionDiagram::from_knapsack`]), all of which
//! finish in the same way:
//! 1. nodes from which the accepting terminal cannot be reached are redirected to the rejecting
//!    terminal,
//! 2. nodes with the same level and the same children are merged bottom-up,
//! 3. the nodes are renumbered in depth-first pre-order from the root, which gets id 2,
//! 4. the children of every node are grouped into classes of indexes leading to the same child.
//!
//! The result is frozen; filtering state is kept by the propagators using the diagram.
mod automaton;
mod builder;
mod knapsack;

use std::fmt::Display;

pub use automaton::Automaton;
pub use automaton::Transition;
pub(crate) use builder::DiagramBuilder;
pub use knapsack::KnapsackLimits;
use thiserror::Error;

use crate::containers::HashSet;

/// Identifies a node of a [`DecisionDiagram`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The terminal reached by tuples outside the relation.
    pub const REJECT: NodeId = NodeId(0);
    /// The terminal reached by tuples of the relation.
    pub const ACCEPT: NodeId = NodeId(1);
    /// The root of every built diagram.
    pub const ROOT: NodeId = NodeId(2);

    pub fn is_terminal(self) -> bool {
        self == NodeId::REJECT || self == NodeId::ACCEPT
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            NodeId::REJECT => write!(f, "reject"),
            NodeId::ACCEPT => write!(f, "accept"),
            NodeId(id) => write!(f, "n{id}"),
        }
    }
}

/// Reasons for refusing to build a decision diagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionDiagramError {
    #[error("A decision diagram needs at least one level")]
    EmptyLevels,
    #[error("Tuple {tuple} has {found} entries but the diagram has {expected} levels")]
    ArityMismatch {
        tuple: usize,
        expected: usize,
        found: usize,
    },
    #[error("Index {index} at level {level} is outside the domain")]
    IndexOutOfRange { level: usize, index: usize },
    #[error("Value {value} at level {level} is outside the domain")]
    ValueOutsideDomain { level: usize, value: i32 },
    #[error("Expected exactly one state without incoming transitions, found {0}")]
    NoUniqueRoot(usize),
    #[error("Expected exactly one state without outgoing transitions, found {0}")]
    NoUniqueTerminal(usize),
    #[error("State {state} is reached at level {found} but also at level {expected}")]
    InconsistentLevel {
        state: usize,
        expected: usize,
        found: usize,
    },
    #[error("State {state} lies deeper than the last level of the diagram")]
    TooManyLevels { state: usize },
    #[error("State {state} has transitions to different states on value {value}")]
    Nondeterministic { state: usize, value: i32 },
    #[error("Expected {expected} coefficients, found {found}")]
    CoefficientCount { expected: usize, found: usize },
    #[error("The limits of a knapsack must contain at least one weight")]
    InvalidLimits,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Node {
    level: usize,
    children: Box<[NodeId]>,
    /// Indexes of the children grouped by the child they lead to, in order of first occurrence.
    /// Indexes leading to [`NodeId::REJECT`] are left out.
    sons_classes: Box<[Box<[usize]>]>,
}

/// A reduced, canonically numbered decision diagram. See the module level documentation for more
/// information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionDiagram {
    domain_sizes: Box<[usize]>,
    /// Indexed by [`NodeId`]; the two terminals come first.
    nodes: Vec<Node>,
}

impl DecisionDiagram {
    pub(crate) fn from_parts(
        domain_sizes: Box<[usize]>,
        levels: Vec<usize>,
        children: Vec<Box<[NodeId]>>,
    ) -> DecisionDiagram {
        let nodes = levels
            .into_iter()
            .zip(children)
            .map(|(level, children)| {
                let sons_classes = sons_classes(&children);
                Node {
                    level,
                    children,
                    sons_classes,
                }
            })
            .collect();
        DecisionDiagram {
            domain_sizes,
            nodes,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn arity(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    /// The number of nodes, terminals included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges which do not lead to [`NodeId::REJECT`].
    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|node| node.children.iter())
            .filter(|&&child| child != NodeId::REJECT)
            .count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The level of `node`; terminals are at level [`DecisionDiagram::arity`].
    pub fn level(&self, node: NodeId) -> usize {
        self.nodes[node.index()].level
    }

    /// The children of `node`, indexed by the value indexes of the variable at its level.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    /// The value indexes of `node` grouped by the child they lead to.
    pub fn sons_classes(&self, node: NodeId) -> &[Box<[usize]>] {
        &self.nodes[node.index()].sons_classes
    }

    /// Whether the fully instantiated `tuple` is accepted.
    pub fn check_indexes(&self, tuple: &[usize]) -> bool {
        let mut node = self.root();
        while !node.is_terminal() {
            node = self.children(node)[tuple[self.level(node)]];
        }
        node == NodeId::ACCEPT
    }

    /// The number of accepted tuples, saturating at [`u64::MAX`].
    pub fn num_tuples(&self) -> u64 {
        let mut counts = vec![0_u64; self.nodes.len()];
        counts[NodeId::ACCEPT.index()] = 1;
        // Children are one level deeper than their parent, so counting bottom-up by level works.
        let mut internal = (NodeId::ROOT.index()..self.nodes.len()).collect::<Vec<_>>();
        internal.sort_by_key(|&id| std::cmp::Reverse(self.nodes[id].level));
        for id in internal {
            counts[id] = self.nodes[id]
                .children
                .iter()
                .fold(0_u64, |sum, child| sum.saturating_add(counts[child.index()]));
        }
        counts[NodeId::ROOT.index()]
    }

    /// The accepted tuples with every position given as a class of value indexes; the accepted
    /// tuples are the cartesian products of the returned entries.
    pub fn compressed_tuples(&self) -> Vec<Vec<Vec<usize>>> {
        let mut tuples = Vec::new();
        let mut current = Vec::with_capacity(self.arity());
        self.collect_compressed_tuples(self.root(), &mut current, &mut tuples);
        tuples
    }

    fn collect_compressed_tuples(
        &self,
        node: NodeId,
        current: &mut Vec<Vec<usize>>,
        tuples: &mut Vec<Vec<Vec<usize>>>,
    ) {
        if node == NodeId::ACCEPT {
            tuples.push(current.clone());
            return;
        }
        if node.is_terminal() {
            return;
        }

        for class in self.sons_classes(node).iter() {
            current.push(class.to_vec());
            let representative = self.children(node)[class[0]];
            self.collect_compressed_tuples(representative, current, tuples);
            let _ = current.pop();
        }
    }

    /// Whether no two internal nodes have the same level and children, every child lies one level
    /// deeper than its parent (or is a terminal), and ids follow a depth-first pre-order.
    pub fn is_canonical(&self) -> bool {
        let mut seen = HashSet::default();
        let mut next_id = NodeId::ROOT.0;
        let mut visited = vec![false; self.nodes.len()];
        visited[NodeId::REJECT.index()] = true;
        visited[NodeId::ACCEPT.index()] = true;

        self.is_canonical_from(self.root(), &mut seen, &mut next_id, &mut visited)
            && next_id as usize == self.nodes.len()
    }

    fn is_canonical_from(
        &self,
        node: NodeId,
        seen: &mut HashSet<(usize, Box<[NodeId]>)>,
        next_id: &mut u32,
        visited: &mut [bool],
    ) -> bool {
        if visited[node.index()] {
            return true;
        }
        if node.0 != *next_id {
            return false;
        }
        visited[node.index()] = true;
        *next_id += 1;

        let Node {
            level, children, ..
        } = &self.nodes[node.index()];
        if children.len() != self.domain_sizes[*level] {
            return false;
        }
        if !seen.insert((*level, children.clone())) {
            return false;
        }
        children.iter().all(|&child| {
            (child.is_terminal() || self.level(child) == level + 1)
                && self.is_canonical_from(child, seen, next_id, visited)
        })
    }
}

fn sons_classes(children: &[NodeId]) -> Box<[Box<[usize]>]> {
    let mut classes: Vec<(NodeId, Vec<usize>)> = Vec::new();
    for (index, &child) in children.iter().enumerate() {
        if child == NodeId::REJECT {
            continue;
        }
        match classes.iter_mut().find(|(representative, _)| *representative == child) {
            Some((_, class)) => class.push(index),
            None => classes.push((child, vec![index])),
        }
    }
    classes
        .into_iter()
        .map(|(_, class)| class.into_boxed_slice())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::DecisionDiagram;
    use super::DecisionDiagramError;
    use super::NodeId;
    use crate::extension::STAR;

    fn all_tuples(domain_sizes: &[usize]) -> Vec<Vec<usize>> {
        domain_sizes.iter().fold(vec![vec![]], |prefixes, &size| {
            prefixes
                .into_iter()
                .flat_map(|prefix| {
                    (0..size).map(move |index| {
                        let mut tuple = prefix.clone();
                        tuple.push(index);
                        tuple
                    })
                })
                .collect()
        })
    }

    #[test]
    fn membership_matches_the_tuples() {
        let tuples = vec![vec![0, 1, 2], vec![1, 1, 0], vec![2, 0, 2], vec![1, 1, 1]];
        let diagram =
            DecisionDiagram::from_tuples(&[3, 2, 3], &tuples, true).expect("well formed");

        for tuple in all_tuples(&[3, 2, 3]) {
            assert_eq!(diagram.check_indexes(&tuple), tuples.contains(&tuple));
        }
        assert_eq!(diagram.num_tuples(), 4);
        assert!(diagram.is_canonical());
    }

    #[test]
    fn negative_tuples_are_rejected() {
        let tuples = vec![vec![0, 0], vec![1, 1]];
        let diagram = DecisionDiagram::from_tuples(&[2, 2], &tuples, false).expect("well formed");

        assert!(!diagram.check_indexes(&[0, 0]));
        assert!(diagram.check_indexes(&[0, 1]));
        assert!(diagram.check_indexes(&[1, 0]));
        assert!(!diagram.check_indexes(&[1, 1]));
    }

    #[test]
    fn identical_suffixes_are_shared() {
        // Every prefix leads to the same set of suffixes, so each level needs one node.
        let tuples = all_tuples(&[4, 4, 2])
            .into_iter()
            .filter(|tuple| tuple[2] == 1)
            .collect::<Vec<_>>();
        let diagram =
            DecisionDiagram::from_tuples(&[4, 4, 2], &tuples, true).expect("well formed");

        assert_eq!(diagram.node_count(), 2 + 3);
        assert_eq!(diagram.edge_count(), 4 + 4 + 1);
        assert_eq!(diagram.sons_classes(diagram.root()).len(), 1);
        assert_eq!(diagram.sons_classes(diagram.root())[0].len(), 4);
    }

    #[test]
    fn stars_fan_out_and_merge() {
        let starred =
            DecisionDiagram::from_tuples(&[3, 2], &[vec![STAR, 1]], true).expect("well formed");
        let explicit = DecisionDiagram::from_tuples(&[3, 2], &[vec![0, 1], vec![1, 1], vec![2, 1]], true)
            .expect("well formed");

        assert_eq!(starred, explicit);
    }

    #[test]
    fn renaming_is_reproducible() {
        let tuples = vec![vec![2, 0, 1], vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 0]];
        let mut reversed = tuples.clone();
        reversed.reverse();

        let first = DecisionDiagram::from_tuples(&[3, 2, 2], &tuples, true).expect("well formed");
        let second =
            DecisionDiagram::from_tuples(&[3, 2, 2], &reversed, true).expect("well formed");

        assert_eq!(first, second);
        assert!(first.is_canonical());
        assert_eq!(first.root(), NodeId::ROOT);
    }

    #[test]
    fn compressed_tuples_cover_the_relation() {
        let tuples = vec![vec![0, 0], vec![0, 1], vec![2, 0], vec![2, 1], vec![1, 1]];
        let diagram = DecisionDiagram::from_tuples(&[3, 2], &tuples, true).expect("well formed");

        let compressed = diagram.compressed_tuples();
        assert_eq!(
            compressed,
            vec![vec![vec![0, 2], vec![0, 1]], vec![vec![1], vec![1]]]
        );
    }

    #[test]
    fn an_empty_relation_rejects_everything() {
        let diagram = DecisionDiagram::from_tuples(&[2, 2], &[], true).expect("well formed");

        assert_eq!(diagram.num_tuples(), 0);
        assert!(diagram.compressed_tuples().is_empty());
        assert!(all_tuples(&[2, 2])
            .iter()
            .all(|tuple| !diagram.check_indexes(tuple)));
    }

    #[test]
    fn malformed_tuples_are_rejected() {
        assert_eq!(
            DecisionDiagram::from_tuples(&[2, 2], &[vec![0, 1, 0]], true),
            Err(DecisionDiagramError::ArityMismatch {
                tuple: 0,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            DecisionDiagram::from_tuples(&[2, 2], &[vec![0, 2]], true),
            Err(DecisionDiagramError::IndexOutOfRange { level: 1, index: 2 })
        );
        assert_eq!(
            DecisionDiagram::from_tuples(&[], &[], true),
            Err(DecisionDiagramError::EmptyLevels)
        );
    }
}
