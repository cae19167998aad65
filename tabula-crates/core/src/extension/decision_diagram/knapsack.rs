use std::ops::RangeInclusive;

use super::DecisionDiagram;
use super::DecisionDiagramError;
use super::DiagramBuilder;
use super::NodeId;
use crate::containers::HashMap;

/// The weights a knapsack constraint accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KnapsackLimits {
    /// Every weight in the range.
    Range(RangeInclusive<i64>),
    /// Exactly the listed weights.
    Values(Vec<i64>),
}

impl KnapsackLimits {
    pub fn contains(&self, weight: i64) -> bool {
        match self {
            KnapsackLimits::Range(range) => range.contains(&weight),
            KnapsackLimits::Values(values) => values.contains(&weight),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            KnapsackLimits::Range(range) => range.is_empty(),
            KnapsackLimits::Values(values) => values.is_empty(),
        }
    }
}

impl DecisionDiagram {
    /// Builds the diagram of `sum(coefficients[i] * x_i) in limits`, where `domain_values` holds
    /// the sorted values of every `x_i`. Intermediate weights are the states of the diagram, so
    /// its width is bounded by the number of distinct partial sums.
    pub fn from_knapsack(
        coefficients: &[i64],
        limits: &KnapsackLimits,
        domain_values: &[Vec<i32>],
    ) -> Result<DecisionDiagram, DecisionDiagramError> {
        if domain_values.is_empty() {
            return Err(DecisionDiagramError::EmptyLevels);
        }
        if coefficients.len() != domain_values.len() {
            return Err(DecisionDiagramError::CoefficientCount {
                expected: domain_values.len(),
                found: coefficients.len(),
            });
        }
        if limits.is_empty() {
            return Err(DecisionDiagramError::InvalidLimits);
        }

        let arity = domain_values.len();
        let mut builder =
            DiagramBuilder::new(domain_values.iter().map(Vec::len).collect::<Vec<_>>());
        let root = builder.new_node(0, NodeId::REJECT);
        let mut layer = vec![(0_i64, root)];

        for (level, (&coefficient, values)) in coefficients.iter().zip(domain_values).enumerate() {
            let mut next_layer = Vec::new();
            let mut next_nodes: HashMap<i64, NodeId> = HashMap::default();

            for &(weight, node) in layer.iter() {
                for (index, &value) in values.iter().enumerate() {
                    let next_weight =
                        weight.saturating_add(coefficient.saturating_mul(i64::from(value)));

                    let child = if level + 1 == arity {
                        if limits.contains(next_weight) {
                            NodeId::ACCEPT
                        } else {
                            NodeId::REJECT
                        }
                    } else {
                        *next_nodes.entry(next_weight).or_insert_with(|| {
                            let created = builder.new_node(level + 1, NodeId::REJECT);
                            next_layer.push((next_weight, created));
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
}
