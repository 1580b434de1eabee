#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::sync::Mutex;

use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;
use workbench_core::Model;
use workbench_core::ModelSolver;

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Keeps every warning logged by this test binary.
#[derive(Debug)]
struct WarningLogger;

impl Log for WarningLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            if let Ok(mut warnings) = WARNINGS.lock() {
                warnings.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: WarningLogger = WarningLogger;

fn warnings_about(constraint: &str) -> usize {
    let needle = format!("'{constraint}'");

    WARNINGS
        .lock()
        .expect("logger did not panic")
        .iter()
        .filter(|warning| warning.contains(&needle))
        .count()
}

#[test]
fn empty_expansion_is_reported_once_per_solve() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Warn);

    let model = Model::builder("hollow")
        .aggregate("q", 2, "1..3")
        .constraint("hollow", "$q[i] = 1 | i in 2..1")
        .build()
        .expect("valid model");

    let mut solver = ModelSolver::default();
    let result = solver.solve(&model);
    let solution = result.solution().expect("satisfiable");

    assert_eq!(Ok(()), solution.check());
    assert_eq!(1, warnings_about("hollow"));
}
