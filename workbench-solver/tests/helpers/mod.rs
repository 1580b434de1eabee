#![allow(dead_code, reason = "not every integration test uses every helper")]

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;

use wait_timeout::ChildExt;

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: String,
}

impl Run {
    /// The lines of the output which are not log messages.
    pub(crate) fn output_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter(|line| !line.starts_with('%'))
            .collect()
    }

    /// The log messages, without their prefix.
    pub(crate) fn log_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter_map(|line| line.strip_prefix("% "))
            .collect()
    }
}

pub(crate) fn model_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("models")
        .join(format!("{name}.wb"))
}

pub(crate) fn run_solver(instance_path: impl AsRef<Path>, args: &[&str]) -> Run {
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_workbench-solver"));

    let mut child = Command::new(solver)
        .args(args)
        .arg(instance_path.as_ref())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run solver.");

    let status = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs()),
        Ok(Some(status)) => status,
        Err(e) => panic!("error waiting for solver: {e}"),
    };

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        let _ = std::io::Read::read_to_string(&mut pipe, &mut stdout)
            .expect("solver output is utf-8");
    }

    Run { status, stdout }
}
