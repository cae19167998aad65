#![allow(dead_code, reason = "not every test file uses every helper")]

use rand::rngs::SmallRng;
use rand::Rng;
use tabula_core::extension::STAR_VALUE;
use tabula_core::options::ExtensionOptions;
use tabula_core::options::NegativeTableBackend;
use tabula_core::options::PositiveTableBackend;
use tabula_core::options::SolverOptions;
use tabula_core::Solver;
use tabula_core::VariableId;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn solver_with(
    positive_backend: PositiveTableBackend,
    negative_backend: NegativeTableBackend,
) -> Solver {
    Solver::new(SolverOptions {
        extension: ExtensionOptions {
            positive_backend,
            negative_backend,
            ..ExtensionOptions::default()
        },
        ..SolverOptions::default()
    })
}

/// Creates one variable `0..size` per entry of `sizes`.
pub(crate) fn variables(solver: &mut Solver, sizes: &[i32]) -> Vec<VariableId> {
    sizes
        .iter()
        .map(|&size| {
            solver
                .new_bounded_variable(0, size - 1)
                .expect("non-empty domain")
        })
        .collect()
}

/// Draws every tuple over `0..size` domains independently with probability `density`.
pub(crate) fn random_tuples(rng: &mut SmallRng, sizes: &[i32], density: f64) -> Vec<Vec<i32>> {
    let mut tuples = Vec::new();
    let mut current = vec![0; sizes.len()];
    loop {
        if rng.gen_bool(density) {
            tuples.push(current.clone());
        }

        let mut position = sizes.len();
        loop {
            if position == 0 {
                return tuples;
            }
            position -= 1;
            current[position] += 1;
            if current[position] < sizes[position] {
                break;
            }
            current[position] = 0;
        }
    }
}

/// Every tuple over `0..size` domains which is not listed in `tuples`.
pub(crate) fn complement(sizes: &[i32], tuples: &[Vec<i32>]) -> Vec<Vec<i32>> {
    let mut all = all_tuples(sizes);
    all.retain(|tuple| !tuples.contains(tuple));
    all
}

/// Replaces each entry of `tuples` by [`STAR_VALUE`] with probability `probability`.
pub(crate) fn with_stars(
    rng: &mut SmallRng,
    tuples: &[Vec<i32>],
    probability: f64,
) -> Vec<Vec<i32>> {
    let mut starred = tuples
        .iter()
        .map(|tuple| {
            tuple
                .iter()
                .map(|&value| {
                    if rng.gen_bool(probability) {
                        STAR_VALUE
                    } else {
                        value
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    starred.sort_unstable();
    starred.dedup();
    starred
}

/// The tuples over `0..size` domains matched by at least one of `tuples`, sorted.
pub(crate) fn expand_stars(sizes: &[i32], tuples: &[Vec<i32>]) -> Vec<Vec<i32>> {
    all_tuples(sizes)
        .into_iter()
        .filter(|tuple| {
            tuples.iter().any(|pattern| {
                pattern
                    .iter()
                    .zip(tuple)
                    .all(|(&expected, &value)| expected == STAR_VALUE || expected == value)
            })
        })
        .collect()
}

fn all_tuples(sizes: &[i32]) -> Vec<Vec<i32>> {
    sizes.iter().fold(vec![vec![]], |prefixes, &size| {
        prefixes
            .into_iter()
            .flat_map(|prefix: Vec<i32>| {
                (0..size).map(move |value| {
                    let mut extended = prefix.clone();
                    extended.push(value);
                    extended
                })
            })
            .collect()
    })
}

/// The sorted values of every variable in `scope`.
pub(crate) fn snapshot(solver: &Solver, scope: &[VariableId]) -> Vec<Vec<i32>> {
    scope
        .iter()
        .map(|&variable| solver.domain(variable).sorted_values())
        .collect()
}

/// The domains generalized arc consistency leaves for `allowed` when starting from `domains`, or
/// `None` when no allowed tuple fits in them.
pub(crate) fn supported_values(
    allowed: &[Vec<i32>],
    domains: &[Vec<i32>],
) -> Option<Vec<Vec<i32>>> {
    let mut supported = vec![Vec::new(); domains.len()];
    for tuple in allowed {
        if tuple
            .iter()
            .zip(domains)
            .all(|(value, domain)| domain.contains(value))
        {
            for (values, &value) in supported.iter_mut().zip(tuple) {
                values.push(value);
            }
        }
    }

    if supported.iter().any(Vec::is_empty) {
        return None;
    }
    for values in supported.iter_mut() {
        values.sort_unstable();
        values.dedup();
    }
    Some(supported)
}
