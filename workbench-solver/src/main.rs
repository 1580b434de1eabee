mod os_signal;
mod result;
mod script;

use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::debug;
use log::error;
use log::info;
use log::LevelFilter;
use os_signal::OsSignal;
use result::WorkbenchError;
use result::WorkbenchResult;
use workbench_core::ModelSolver;
use workbench_core::SolveOptions;
use workbench_core::SolveResult;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The model script to solve. Each line holds one statement:
    ///  - 'domain <name> = <lower>..<upper>'
    ///  - 'var <name> : <domain>'
    ///  - 'array <name>[<size>] : <domain>'
    ///  - 'override <name>[<index>] : <lower>..<upper>'
    ///  - 'constraint <name> : <expression>'
    ///
    /// Text after a '%' is ignored.
    #[clap(verbatim_doc_comment)]
    instance_path: PathBuf,

    /// The time budget for the solver, given in milliseconds.
    ///
    /// Possible values: u64 (Optional)
    #[arg(short = 't', long = "time-limit", verbatim_doc_comment)]
    time_limit: Option<u64>,

    /// Enables log message output from the solver.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;

            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> WorkbenchResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose);

    let signal = OsSignal::install()?;

    let name = args
        .instance_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = File::open(&args.instance_path)?;
    let model = script::read_model(&name, BufReader::new(file))?;
    debug!(
        "read model '{}' with {} variable(s) and {} constraint(s)",
        model.name(),
        model.variables().count(),
        model.constraints().count()
    );

    let mut solver = ModelSolver::new(SolveOptions {
        time_limit: args.time_limit.map(Duration::from_millis),
        interrupt: Some(signal.flag()),
    });

    match solver.solve(&model) {
        SolveResult::Success(solution) => {
            solution.check()?;

            print!("{solution}");
            println!("----------");
        }
        SolveResult::Failed => println!("=====UNSATISFIABLE====="),
        SolveResult::Unknown => {
            if signal.is_raised() {
                info!("search interrupted by a signal");
            }

            println!("=====UNKNOWN=====");
        }
        SolveResult::InvalidModel(errors) => {
            for error in &errors {
                error!("{error}");
            }

            return Err(WorkbenchError::InvalidModel(errors.len()));
        }
    }

    Ok(())
}
