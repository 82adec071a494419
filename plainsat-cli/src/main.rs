use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Error;
use clap::Parser;
use env_logger::{Builder, Target};
use log::{error, info, Level, LevelFilter};

use plainsat::Solver;
use plainsat_dimacs::write_model;

/// A CDCL based SAT solver.
///
/// Reads a formula in DIMACS CNF format and reports whether it is satisfiable, together with a
/// satisfying assignment when there is one.
#[derive(Parser)]
#[command(name = "plainsat", version)]
struct Args {
    /// The input file in DIMACS CNF format
    input: PathBuf,
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(|buf, record| {
            // All log output is prefixed so it forms a DIMACS comment stream.
            if record.level() == Level::Info {
                writeln!(buf, "c {}", record.args())
            } else {
                writeln!(buf, "c {}: {}", record.level(), record.args())
            }
        })
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("PLAINSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is plainsat {}", env!("CARGO_PKG_VERSION"));
}

fn main_with_err() -> Result<i32, Error> {
    let args = Args::parse();

    init_logging();
    banner();

    let mut solver = Solver::new();

    info!("Reading file '{}'", args.input.display());
    let file = fs::File::open(&args.input)?;

    solver.add_dimacs_cnf(file)?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    if solver.solve() {
        writeln!(stdout, "s SATISFIABLE")?;
        if let Some(model) = solver.model() {
            write_model(&mut stdout, model)?;
        }
    } else {
        writeln!(stdout, "s UNSATISFIABLE")?;
    }

    // Exit code 0 for both verdicts; nonzero is reserved for errors.
    Ok(0)
}
