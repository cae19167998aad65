mod common;

use common::init_logger;
use common::snapshot;
use common::solver_with;
use common::variables;
use tabula_core::constraints;
use tabula_core::extension::Automaton;
use tabula_core::extension::DecisionDiagram;
use tabula_core::extension::Relation;
use tabula_core::extension::Transition;
use tabula_core::options::NegativeTableBackend;
use tabula_core::options::PositiveTableBackend;

const POSITIVE_BACKENDS: [PositiveTableBackend; 4] = [
    PositiveTableBackend::Automatic,
    PositiveTableBackend::Str2,
    PositiveTableBackend::CompactTable,
    PositiveTableBackend::DecisionDiagram,
];

fn at_least_one_one() -> Automaton {
    Automaton {
        start: 0,
        finals: vec![1],
        transitions: vec![
            Transition::new(0, 0, 0),
            Transition::new(0, 1, 1),
            Transition::new(1, 0, 1),
            Transition::new(1, 1, 1),
        ],
    }
}

#[test]
fn removing_a_value_from_one_side_of_an_equality_removes_it_from_the_other() {
    init_logger();
    for backend in POSITIVE_BACKENDS {
        let mut solver = solver_with(backend, NegativeTableBackend::Automatic);
        let x = solver.new_bounded_variable(1, 3).expect("non-empty");
        let y = solver.new_bounded_variable(1, 3).expect("non-empty");
        let _ = solver
            .add_constraint(constraints::table(
                [x, y],
                Relation::allowed([[1, 1], [2, 2], [3, 3]]),
            ))
            .expect("consistent at the root");

        let depth = solver.new_depth();
        solver.remove_value(x, 2).expect("x keeps two values");
        solver.propagate().expect("no wipeout");

        assert_eq!(solver.domain(y).sorted_values(), vec![1, 3], "{backend}");

        solver.restore_before(depth);
        assert_eq!(solver.domain(y).sorted_values(), vec![1, 2, 3], "{backend}");
    }
}

#[test]
fn a_negative_table_with_supports_left_prunes_nothing() {
    init_logger();
    for backend in [
        NegativeTableBackend::Automatic,
        NegativeTableBackend::Str2Negative,
        NegativeTableBackend::Complement,
    ] {
        let mut solver = solver_with(PositiveTableBackend::Automatic, backend);
        let scope = variables(&mut solver, &[2, 2]);

        let _ = solver
            .add_constraint(constraints::negative_table(
                scope.clone(),
                [[0, 0], [1, 1]],
            ))
            .expect("consistent at the root");
        solver.propagate().expect("no wipeout");

        assert_eq!(
            snapshot(&solver, &scope),
            vec![vec![0, 1], vec![0, 1]],
            "{backend}"
        );
    }
}

#[test]
fn an_automaton_rejects_words_without_a_one() {
    init_logger();
    let mut solver = solver_with(PositiveTableBackend::Automatic, NegativeTableBackend::Automatic);
    let scope = variables(&mut solver, &[2, 2, 2]);
    let propagator = solver
        .add_constraint(constraints::regular(scope.clone(), at_least_one_one()))
        .expect("consistent at the root");

    assert!(!solver.check_indexes(propagator, &[0, 0, 0]));
    assert!(solver.check_indexes(propagator, &[0, 1, 0]));

    let depth = solver.new_depth();
    solver.assign_value(scope[0], 0).expect("in the domain");
    solver.assign_value(scope[2], 0).expect("in the domain");
    solver.propagate().expect("(0, 1, 0) is accepted");
    assert_eq!(solver.domain(scope[1]).sorted_values(), vec![1]);
    solver.restore_before(depth);

    let depth = solver.new_depth();
    solver.assign_value(scope[0], 0).expect("in the domain");
    solver.assign_value(scope[1], 0).expect("in the domain");
    solver.assign_value(scope[2], 0).expect("in the domain");
    let conflict = solver.propagate().expect_err("(0, 0, 0) is rejected");
    assert_eq!(conflict.depth, depth);
    assert!(!conflict.is_root_failure());
    solver.restore_before(depth);

    assert_eq!(snapshot(&solver, &scope), vec![vec![0, 1]; 3]);
}

#[test]
fn a_large_bitset_table_tracks_removals_word_by_word() {
    init_logger();
    let mut solver = solver_with(
        PositiveTableBackend::CompactTable,
        NegativeTableBackend::Automatic,
    );
    let x = solver.new_bounded_variable(0, 129).expect("non-empty");
    let y = solver.new_bounded_variable(0, 1).expect("non-empty");
    let propagator = solver
        .add_constraint(constraints::table(
            [x, y],
            Relation::allowed((0..130).map(|i| [i, i % 2])),
        ))
        .expect("consistent at the root");
    assert_eq!(solver.propagator_name(propagator), "CompactTable");

    let depth = solver.new_depth();
    for value in 0..128 {
        if value % 2 == 1 {
            solver.remove_value(x, value).expect("x keeps values");
        }
    }
    solver.remove_value(x, 129).expect("x keeps values");
    solver.propagate().expect("no wipeout");
    assert_eq!(solver.domain(y).sorted_values(), vec![0]);

    solver.restore_before(depth);
    assert_eq!(solver.domain(y).sorted_values(), vec![0, 1]);
    assert_eq!(solver.domain(x).size(), 130);

    let _ = solver.new_depth();
    solver.assign_value(y, 1).expect("in the domain");
    solver.propagate().expect("no wipeout");
    assert_eq!(solver.domain(x).size(), 65);
    assert!(solver.domain(x).values().all(|value| value % 2 == 1));
}

#[test]
fn equivalent_descriptions_compile_to_the_same_diagram() {
    let from_automaton =
        DecisionDiagram::from_automaton(&at_least_one_one(), &[vec![0, 1], vec![0, 1], vec![0, 1]])
            .expect("deterministic");

    let accepted = (0..8_usize)
        .filter(|&word| word != 0)
        .map(|word| vec![(word >> 2) & 1, (word >> 1) & 1, word & 1])
        .rev()
        .collect::<Vec<_>>();
    let from_tuples = DecisionDiagram::from_tuples(&[2, 2, 2], &accepted, true).expect("well formed");
    let from_forbidden =
        DecisionDiagram::from_tuples(&[2, 2, 2], &[vec![0, 0, 0]], false).expect("well formed");

    assert!(from_automaton.is_canonical());
    assert_eq!(from_automaton, from_tuples);
    assert_eq!(from_automaton, from_forbidden);
    assert_eq!(from_automaton.num_tuples(), 7);

    let expanded = from_automaton
        .compressed_tuples()
        .iter()
        .map(|tuple| tuple.iter().map(Vec::len).product::<usize>())
        .sum::<usize>();
    assert_eq!(expanded, 7);
}
