//! End to end tests driving the solver through its DIMACS interface.
use plainsat::Solver;
use plainsat_dimacs::{write_model, DimacsParser};

fn solve_cnf(input: &[u8]) -> (Solver, bool) {
    let mut solver = Solver::new();
    let formula = DimacsParser::parse(input).expect("parsing failed");
    solver.add_formula(&formula);
    let sat = solver.solve();

    if sat {
        let model = solver.model().expect("missing model");
        for clause in formula.iter() {
            assert!(
                clause.iter().any(|lit| model.contains(lit)),
                "model does not satisfy {:?}",
                clause
            );
        }
    }

    (solver, sat)
}

fn output_of(solver: &Solver, sat: bool) -> String {
    let mut output = vec![];
    if sat {
        output.extend_from_slice(b"s SATISFIABLE\n");
        write_model(&mut output, solver.model().unwrap()).unwrap();
    } else {
        output.extend_from_slice(b"s UNSATISFIABLE\n");
    }
    String::from_utf8(output).unwrap()
}

#[test]
fn unit_clauses_force_a_model() {
    let (solver, sat) = solve_cnf(b"p cnf 3 3\n1 0\n-2 3 0\n2 0\n");
    assert!(sat);
    assert_eq!(output_of(&solver, sat), "s SATISFIABLE\nv 1 2 3 0\n");
}

#[test]
fn contradicting_units_are_unsat() {
    let (_, sat) = solve_cnf(b"p cnf 1 2\n1 0\n-1 0\n");
    assert!(!sat);
}

#[test]
fn pigeonhole_three_into_two_is_unsat() {
    // p(i, j) = pigeon i sits in hole j; variable 2 * i + j + 1
    let (solver, sat) = solve_cnf(
        b"c pigeonhole 3 into 2\n\
        p cnf 6 9\n\
        1 2 0\n\
        3 4 0\n\
        5 6 0\n\
        -1 -3 0\n\
        -1 -5 0\n\
        -3 -5 0\n\
        -2 -4 0\n\
        -2 -6 0\n\
        -4 -6 0\n",
    );
    assert!(!sat);
    assert_eq!(output_of(&solver, sat), "s UNSATISFIABLE\n");
}

#[test]
fn two_sat_picks_the_positive_majority() {
    let (solver, sat) = solve_cnf(b"p cnf 2 3\n1 2 0\n-1 2 0\n1 -2 0\n");
    assert!(sat);
    assert_eq!(
        solver.model().unwrap(),
        vec![plainsat::Lit::from_dimacs(1), plainsat::Lit::from_dimacs(2)]
    );
}

#[test]
fn branching_formula_is_satisfiable() {
    let (_, sat) = solve_cnf(b"p cnf 3 4\n1 2 0\n-1 3 0\n-2 -3 0\n-1 -3 0\n");
    assert!(sat);
}

#[test]
fn tautological_clause_is_harmless() {
    let (_, sat) = solve_cnf(b"p cnf 3 3\n1 -1 2 0\n-2 3 0\n-3 0\n");
    assert!(sat);
}

#[test]
fn output_is_deterministic_byte_for_byte() {
    let input = b"p cnf 5 6\n1 2 3 0\n-1 -2 0\n-2 -3 0\n-1 -3 0\n4 5 0\n-4 -5 0\n";

    let (first, first_sat) = solve_cnf(input);
    let (second, second_sat) = solve_cnf(input);

    assert_eq!(
        output_of(&first, first_sat),
        output_of(&second, second_sat)
    );
}

#[test]
fn model_lines_wrap_after_five_literals() {
    let input = b"p cnf 7 7\n1 0\n2 0\n3 0\n4 0\n5 0\n6 0\n7 0\n";
    let (solver, sat) = solve_cnf(input);
    assert!(sat);
    assert_eq!(
        output_of(&solver, sat),
        "s SATISFIABLE\nv 1 2 3 4 5 0\nv 6 7 0\n"
    );
}
