use std::collections::VecDeque;

use super::DecisionDiagram;
use super::DecisionDiagramError;
use super::DiagramBuilder;
use super::NodeId;
use crate::containers::HashMap;
use crate::containers::HashSet;

/// A labelled edge `from --value--> to` between two states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: usize,
    pub value: i32,
    pub to: usize,
}

impl Transition {
    pub fn new(from: usize, value: i32, to: usize) -> Transition {
        Transition { from, value, to }
    }
}

/// A deterministic finite automaton; it accepts a sequence of values when reading the sequence
/// from `start` ends in one of the `finals`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Automaton {
    pub start: usize,
    pub finals: Vec<usize>,
    pub transitions: Vec<Transition>,
}

impl Automaton {
    /// Groups the transitions by source state, dropping exact duplicates and rejecting two
    /// different targets for the same state and value.
    fn outgoing(&self) -> Result<HashMap<usize, Vec<Transition>>, DecisionDiagramError> {
        outgoing_transitions(&self.transitions)
    }
}

fn outgoing_transitions(
    transitions: &[Transition],
) -> Result<HashMap<usize, Vec<Transition>>, DecisionDiagramError> {
    let mut outgoing: HashMap<usize, Vec<Transition>> = HashMap::default();
    let mut targets: HashMap<(usize, i32), usize> = HashMap::default();

    for &transition in transitions {
        match targets.get(&(transition.from, transition.value)) {
            Some(&to) if to == transition.to => continue,
            Some(_) => {
                return Err(DecisionDiagramError::Nondeterministic {
                    state: transition.from,
                    value: transition.value,
                })
            }
            None => {
                let _ = targets.insert((transition.from, transition.value), transition.to);
                outgoing
                    .entry(transition.from)
                    .or_default()
                    .push(transition);
            }
        }
    }

    Ok(outgoing)
}

impl DecisionDiagram {
    /// Unfolds `automaton` over as many levels as there are entries in `domain_values`, the
    /// sorted values of the variables. Transitions on values outside the domain of their level are
    /// ignored.
    pub fn from_automaton(
        automaton: &Automaton,
        domain_values: &[Vec<i32>],
    ) -> Result<DecisionDiagram, DecisionDiagramError> {
        if domain_values.is_empty() {
            return Err(DecisionDiagramError::EmptyLevels);
        }

        let outgoing = automaton.outgoing()?;
        let finals = automaton.finals.iter().copied().collect::<HashSet<_>>();
        let arity = domain_values.len();

        let mut builder =
            DiagramBuilder::new(domain_values.iter().map(Vec::len).collect::<Vec<_>>());
        let root = builder.new_node(0, NodeId::REJECT);
        let mut layer = vec![(automaton.start, root)];

        for level in 0..arity {
            let mut next_layer = Vec::new();
            let mut next_nodes: HashMap<usize, NodeId> = HashMap::default();

            for &(state, node) in layer.iter() {
                let Some(transitions) = outgoing.get(&state) else {
                    continue;
                };

                for transition in transitions {
                    let Ok(index) = domain_values[level].binary_search(&transition.value) else {
                        continue;
                    };

                    let child = if level + 1 == arity {
                        if finals.contains(&transition.to) {
                            NodeId::ACCEPT
                        } else {
                            NodeId::REJECT
                        }
                    } else {
                        *next_nodes.entry(transition.to).or_insert_with(|| {
                            let created = builder.new_node(level + 1, NodeId::REJECT);
                            next_layer.push((transition.to, created));
                            created
                        })
                    };
                    builder.set_child(node, index, child);
                }
            }

            layer = next_layer;
        }

        Ok(builder.finish(root))
    }

    /// Builds a diagram from an explicit layered transition graph. The graph must have exactly one
    /// state without incoming transitions (the root) and exactly one state without outgoing
    /// transitions (the terminal), which must lie `domain_values.len()` transitions below the
    /// root on every path. Every value must belong to the sorted values of its level.
    pub fn from_transitions(
        transitions: &[Transition],
        domain_values: &[Vec<i32>],
    ) -> Result<DecisionDiagram, DecisionDiagramError> {
        if domain_values.is_empty() {
            return Err(DecisionDiagramError::EmptyLevels);
        }
        let arity = domain_values.len();

        let sources = transitions
            .iter()
            .map(|transition| transition.from)
            .collect::<HashSet<_>>();
        let targets = transitions
            .iter()
            .map(|transition| transition.to)
            .collect::<HashSet<_>>();

        let roots = sources.difference(&targets).copied().collect::<Vec<_>>();
        if roots.len() != 1 {
            return Err(DecisionDiagramError::NoUniqueRoot(roots.len()));
        }
        let terminals = targets.difference(&sources).copied().collect::<Vec<_>>();
        if terminals.len() != 1 {
            return Err(DecisionDiagramError::NoUniqueTerminal(terminals.len()));
        }
        let (root_state, terminal_state) = (roots[0], terminals[0]);

        let outgoing = outgoing_transitions(transitions)?;

        let mut builder =
            DiagramBuilder::new(domain_values.iter().map(Vec::len).collect::<Vec<_>>());
        let root = builder.new_node(0, NodeId::REJECT);

        let mut levels: HashMap<usize, usize> = HashMap::default();
        let mut nodes: HashMap<usize, NodeId> = HashMap::default();
        let _ = levels.insert(root_state, 0);
        let _ = nodes.insert(root_state, root);

        let mut queue = VecDeque::from([root_state]);
        while let Some(state) = queue.pop_front() {
            let level = levels[&state];
            let node = nodes[&state];

            for transition in outgoing.get(&state).into_iter().flatten() {
                let index = domain_values[level]
                    .binary_search(&transition.value)
                    .map_err(|_| DecisionDiagramError::ValueOutsideDomain {
                        level,
                        value: transition.value,
                    })?;

                let child = if transition.to == terminal_state {
                    if level + 1 != arity {
                        return Err(DecisionDiagramError::InconsistentLevel {
                            state: terminal_state,
                            expected: arity,
                            found: level + 1,
                        });
                    }
                    NodeId::ACCEPT
                } else if let Some(&known) = levels.get(&transition.to) {
                    if known != level + 1 {
                        return Err(DecisionDiagramError::InconsistentLevel {
                            state: transition.to,
                            expected: known,
                            found: level + 1,
                        });
                    }
                    nodes[&transition.to]
                } else {
                    if level + 1 >= arity {
                        return Err(DecisionDiagramError::TooManyLevels {
                            state: transition.to,
                        });
                    }
                    let created = builder.new_node(level + 1, NodeId::REJECT);
                    let _ = levels.insert(transition.to, level + 1);
                    let _ = nodes.insert(transition.to, created);
                    queue.push_back(transition.to);
                    created
                };

                builder.set_child(node, index, child);
            }
        }

        Ok(builder.finish(root))
    }
}
