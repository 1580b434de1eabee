#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use workbench_core::Model;
use workbench_core::ModelSolver;
use workbench_core::SolveOptions;
use workbench_core::SolveResult;
use workbench_core::SolveStatus;
use workbench_core::ValidationError;

fn solve(model: &Model) -> SolveResult<'_> {
    let mut solver = ModelSolver::default();
    let result = solver.solve(model);
    assert_eq!(result.status(), solver.status());
    result
}

#[test]
fn chain_of_binary_constraints() {
    let model = Model::builder("chain")
        .singleton("x", "1..9")
        .singleton("y", "1..9")
        .singleton("z", "1..9")
        .constraint("c1", "x != y")
        .constraint("c2", "x <= y")
        .constraint("c3", "y = z")
        .build()
        .expect("valid model");

    let result = solve(&model);
    let solution = result.solution().expect("satisfiable");

    let x = solution.value("x").expect("x is bound");
    let y = solution.value("y").expect("y is bound");
    let z = solution.value("z").expect("z is bound");

    assert_ne!(x, y);
    assert!(x <= y);
    assert_eq!(y, z);
    assert_eq!(Ok(()), solution.check());
}

#[test]
fn greater_than() {
    let model = Model::builder("greater")
        .singleton("x", "1..9")
        .singleton("y", "1..9")
        .constraint("c", "x > y")
        .build()
        .expect("valid model");

    let result = solve(&model);
    let solution = result.solution().expect("satisfiable");

    assert!(solution.value("x") > solution.value("y"));
}

#[test]
fn expander_all_different() {
    let model = Model::builder("all-different")
        .aggregate("x", 10, "1..10")
        .constraint("different", "x[i] <> x[j] | i,j in 1..10,1..10")
        .build()
        .expect("valid model");

    let instances = model
        .constraint("different")
        .map(|constraint| constraint.expand(&model))
        .expect("declared constraint")
        .expect("expands");
    assert_eq!(90, instances.len());

    let result = solve(&model);
    let solution = result.solution().expect("satisfiable");

    let mut values = (1..=10)
        .map(|index| solution.element("x", index).expect("element is bound"))
        .collect::<Vec<_>>();
    values.sort_unstable();

    assert_eq!((1..=10).collect::<Vec<_>>(), values);
    assert_eq!(Ok(()), solution.check());
}

#[test]
fn literal_right_operands_and_shared_domains() {
    let model = Model::builder("literals")
        .shared_domain("small", "-3..3")
        .singleton("x", "small")
        .singleton("y", "small")
        .constraint("c1", "x >= 2")
        .constraint("c2", "y < -2")
        .build()
        .expect("valid model");

    let result = solve(&model);
    let solution = result.solution().expect("satisfiable");

    assert!(solution.value("x") >= Some(2));
    assert_eq!(Some(-3), solution.value("y"));
}

#[test]
fn overrides_narrow_element_domains() {
    let model = Model::builder("overrides")
        .aggregate("q", 3, "1..9")
        .override_element("q", 2, "7..7")
        .constraint("increasing", "$q[i] < $q[i+1] | i in 1..size(q)-1")
        .build()
        .expect("valid model");

    let result = solve(&model);
    let solution = result.solution().expect("satisfiable");

    assert_eq!(Some(7), solution.element("q", 2));
    assert_eq!(Some(1), solution.element("q", 1));
    assert_eq!(Some(8), solution.element("q", 3));
}

#[test]
fn infeasible_model_fails() {
    let model = Model::builder("infeasible")
        .singleton("x", "1..3")
        .singleton("y", "1..3")
        .constraint("c1", "x < y")
        .constraint("c2", "y < x")
        .build()
        .expect("valid model");

    assert_eq!(SolveResult::Failed, solve(&model));
}

#[test]
fn pigeonhole_fails() {
    let model = Model::builder("pigeons")
        .aggregate("p", 4, "1..3")
        .constraint("different", "$p[i] <> $p[j] | i,j in 1..4,i+1..4")
        .build()
        .expect("valid model");

    assert_eq!(SolveStatus::Failed, solve(&model).status());
}

#[test]
fn invalid_model_reports_every_error() {
    let model = Model::builder("invalid")
        .singleton("x", "1..3")
        .constraint("c1", "x = w")
        .constraint("c2", "v = x")
        .build()
        .expect("parses");

    match solve(&model) {
        SolveResult::InvalidModel(errors) => assert_eq!(
            vec![
                ValidationError::UnknownVariable {
                    constraint: "c1".to_owned(),
                    variable: "w".to_owned()
                },
                ValidationError::UnknownVariable {
                    constraint: "c2".to_owned(),
                    variable: "v".to_owned()
                },
            ],
            errors
        ),
        other => panic!("expected an invalid model, got {other:?}"),
    }
}

#[test]
fn raised_interrupt_gives_unknown() {
    let model = Model::builder("interrupted")
        .aggregate("x", 10, "1..10")
        .constraint("different", "$x[i] <> $x[j] | i,j in 1..10,i+1..10")
        .build()
        .expect("valid model");

    let mut solver = ModelSolver::new(SolveOptions {
        time_limit: None,
        interrupt: Some(Arc::new(AtomicBool::new(true))),
    });

    assert_eq!(SolveResult::Unknown, solver.solve(&model));
    assert_eq!(SolveStatus::Unknown, solver.status());
}
