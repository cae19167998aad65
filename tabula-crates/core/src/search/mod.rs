//! A depth-first search driver on top of the [`Solver`].
//!
//! The driver branches on `x = v` versus `x != v`, each branch at its own depth, and enumerates
//! the solutions over the variables it is given. It exists to exercise the propagation core; it
//! does not restart, learn or optimise.
use std::fmt::Display;

use log::debug;
use log::warn;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::create_statistics_struct;
use crate::engine::Domain;
use crate::engine::VariableId;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::Solver;

/// Which unfixed variable to branch on next.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VariableSelection {
    /// The first unfixed variable in the order given to the search.
    #[default]
    InputOrder,
    /// The unfixed variable with the smallest domain, ties broken by input order.
    FirstFail,
}

impl Display for VariableSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableSelection::InputOrder => write!(f, "input-order"),
            VariableSelection::FirstFail => write!(f, "first-fail"),
        }
    }
}

/// Which value of the selected variable is tried first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ValueSelection {
    #[default]
    Min,
    Max,
    /// A value drawn uniformly from the domain.
    Random,
}

impl Display for ValueSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSelection::Min => write!(f, "min"),
            ValueSelection::Max => write!(f, "max"),
            ValueSelection::Random => write!(f, "random"),
        }
    }
}

/// The values of the search variables, in the order they were given to the search.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Solution {
    values: Box<[i32]>,
}

impl Solution {
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// The value of the search variable at `position`.
    pub fn value(&self, position: usize) -> i32 {
        self.values[position]
    }
}

/// The outcome of [`DepthFirstSearch::solve`].
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    pub solutions: Vec<Solution>,
    /// Whether the whole search space was explored; false when the solution limit was hit.
    pub complete: bool,
}

create_statistics_struct!(SearchStatistics {
    num_decisions: usize,
    num_failures: usize,
    num_solutions: usize,
});

/// Enumerates solutions by binary branching over a fixed list of variables.
///
/// # Example
/// ```
/// # use tabula_core::constraints;
/// # use tabula_core::extension::Relation;
/// # use tabula_core::search::DepthFirstSearch;
/// # use tabula_core::Solver;
/// let mut solver = Solver::default();
/// let x = solver.new_bounded_variable(0, 2).expect("non-empty domain");
/// let y = solver.new_bounded_variable(0, 2).expect("non-empty domain");
/// let _ = solver
///     .add_constraint(constraints::table([x, y], Relation::allowed([[0, 1], [1, 2], [2, 0]])))
///     .expect("consistent at the root");
///
/// let result = DepthFirstSearch::new([x, y]).solve(&mut solver);
/// assert!(result.complete);
/// assert_eq!(result.solutions.len(), 3);
/// ```
#[derive(Debug)]
pub struct DepthFirstSearch {
    variables: Box<[VariableId]>,
    variable_selection: VariableSelection,
    value_selection: ValueSelection,
    solution_limit: Option<usize>,
    rng: SmallRng,
    statistics: SearchStatistics,
}

impl DepthFirstSearch {
    pub fn new(variables: impl Into<Box<[VariableId]>>) -> DepthFirstSearch {
        let variables = variables.into();
        if variables.is_empty() {
            warn!("The search was not provided with any variables");
        }
        DepthFirstSearch {
            variables,
            variable_selection: VariableSelection::default(),
            value_selection: ValueSelection::default(),
            solution_limit: None,
            rng: SmallRng::seed_from_u64(42),
            statistics: SearchStatistics::default(),
        }
    }

    pub fn with_variable_selection(mut self, selection: VariableSelection) -> Self {
        self.variable_selection = selection;
        self
    }

    pub fn with_value_selection(mut self, selection: ValueSelection) -> Self {
        self.value_selection = selection;
        self
    }

    /// Seeds the generator used by [`ValueSelection::Random`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Stops the search once `limit` solutions are found.
    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Enumerates the solutions below the current depth of `solver`. The solver is back at its
    /// current depth afterwards.
    pub fn solve(&mut self, solver: &mut Solver) -> SearchResult {
        let mut result = SearchResult::default();

        if solver.propagate().is_err() {
            debug!("infeasible before the first decision");
            result.complete = true;
            return result;
        }
        if self.solution_limit == Some(0) {
            return result;
        }

        result.complete = self.explore(solver, &mut result.solutions);
        debug!(
            "search found {} solutions (complete: {})",
            result.solutions.len(),
            result.complete
        );
        result
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }

    /// Returns false when the solution limit stopped the search.
    fn explore(&mut self, solver: &mut Solver, solutions: &mut Vec<Solution>) -> bool {
        let Some(variable) = self.select_variable(solver) else {
            self.statistics.num_solutions += 1;
            solutions.push(Solution {
                values: self
                    .variables
                    .iter()
                    .map(|&variable| solver.domain(variable).min_value())
                    .collect(),
            });
            return self
                .solution_limit
                .map_or(true, |limit| solutions.len() < limit);
        };
        let value = self.select_value(solver.domain(variable));

        for refute in [false, true] {
            self.statistics.num_decisions += 1;
            let depth = solver.new_depth();
            let decision = if refute {
                solver.remove_value(variable, value)
            } else {
                solver.assign_value(variable, value)
            };

            let carry_on = if decision.and_then(|()| solver.propagate()).is_ok() {
                self.explore(solver, solutions)
            } else {
                self.statistics.num_failures += 1;
                true
            };
            solver.restore_before(depth);

            if !carry_on {
                return false;
            }
        }
        true
    }

    fn select_variable(&self, solver: &Solver) -> Option<VariableId> {
        let mut unfixed = self
            .variables
            .iter()
            .copied()
            .filter(|&variable| !solver.domain(variable).is_fixed());
        match self.variable_selection {
            VariableSelection::InputOrder => unfixed.next(),
            VariableSelection::FirstFail => {
                unfixed.min_by_key(|&variable| solver.domain(variable).size())
            }
        }
    }

    fn select_value(&mut self, domain: &Domain) -> i32 {
        match self.value_selection {
            ValueSelection::Min => domain.min_value(),
            ValueSelection::Max => domain.max_value(),
            ValueSelection::Random => {
                let position = self.rng.gen_range(0..domain.size());
                domain
                    .values()
                    .nth(position)
                    .expect("the position is within the domain")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DepthFirstSearch;
    use super::ValueSelection;
    use super::VariableSelection;
    use crate::constraints;
    use crate::extension::Relation;
    use crate::Solver;

    fn all_different_pair(solver: &mut Solver, size: i32) -> [crate::engine::VariableId; 2] {
        let x = solver.new_bounded_variable(0, size - 1).expect("non-empty");
        let y = solver.new_bounded_variable(0, size - 1).expect("non-empty");
        let tuples = (0..size)
            .flat_map(|a| (0..size).filter(move |&b| a != b).map(move |b| [a, b]))
            .collect::<Vec<_>>();
        let _ = solver
            .add_constraint(constraints::table([x, y], Relation::allowed(tuples)))
            .expect("consistent");
        [x, y]
    }

    #[test]
    fn every_solution_is_enumerated_once() {
        let mut solver = Solver::default();
        let scope = all_different_pair(&mut solver, 3);

        let result = DepthFirstSearch::new(scope).solve(&mut solver);

        assert!(result.complete);
        let mut found = result
            .solutions
            .iter()
            .map(|solution| solution.values().to_vec())
            .collect::<Vec<_>>();
        found.sort();
        assert_eq!(
            found,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 2],
                vec![2, 0],
                vec![2, 1]
            ]
        );
        assert_eq!(solver.depth(), 0);
        assert_eq!(solver.domain(scope[0]).size(), 3);
    }

    #[test]
    fn the_limit_stops_the_search() {
        let mut solver = Solver::default();
        let scope = all_different_pair(&mut solver, 4);

        let result = DepthFirstSearch::new(scope)
            .with_solution_limit(2)
            .solve(&mut solver);

        assert!(!result.complete);
        assert_eq!(result.solutions.len(), 2);
        assert_eq!(solver.depth(), 0);
    }

    #[test]
    fn selections_do_not_change_the_solution_set() {
        let mut reference = None;
        for (variable_selection, value_selection) in [
            (VariableSelection::InputOrder, ValueSelection::Min),
            (VariableSelection::FirstFail, ValueSelection::Max),
            (VariableSelection::FirstFail, ValueSelection::Random),
        ] {
            let mut solver = Solver::default();
            let scope = all_different_pair(&mut solver, 4);
            let mut solutions = DepthFirstSearch::new(scope)
                .with_variable_selection(variable_selection)
                .with_value_selection(value_selection)
                .with_seed(7)
                .solve(&mut solver)
                .solutions;
            solutions.sort_by(|a, b| a.values().cmp(b.values()));

            match &reference {
                None => reference = Some(solutions),
                Some(expected) => assert_eq!(&solutions, expected),
            }
        }
    }

    #[test]
    fn an_infeasible_problem_has_no_solutions() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_variable(0, 1).expect("non-empty");
        let y = solver.new_bounded_variable(0, 1).expect("non-empty");
        let _ = solver
            .add_constraint(constraints::table([x, y], Relation::allowed([[0, 0]])))
            .expect("consistent");
        assert!(solver
            .add_constraint(constraints::table([x, y], Relation::allowed([[0, 1], [1, 1]])))
            .is_err());

        let result = DepthFirstSearch::new([x, y]).solve(&mut solver);

        assert!(result.complete);
        assert!(result.solutions.is_empty());
    }
}
