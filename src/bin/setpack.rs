//! # setpack
//!
//! Decides a set packing instance by encoding it to SAT, writing the formula
//! as DIMACS CNF and running an external SAT solver (glucose-compatible
//! command line) on it.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context;
use clap::Parser;
use setpack::{
    packing::{self, Outcome, SetPacking},
    solvers::{
        external::{self, InputVia},
        ExternalSolver, SolveError,
    },
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// The instance file. The first line is `n m k`, followed by one line of
    /// elements per set.
    #[arg(short, long)]
    input: PathBuf,
    /// The path to write the DIMACS CNF formula to
    #[arg(short, long, default_value = "formula.cnf")]
    output: PathBuf,
    /// Let the solver print its progress and log more details
    #[arg(short, long)]
    verbose: bool,
    /// The path to the SAT solver executable
    #[arg(short, long)]
    solver: PathBuf,
    /// Wall clock limit for the solver in seconds
    #[arg(short, long)]
    timeout: Option<u64>,
    /// Do not check that the decoded sets form a valid packing
    #[arg(long)]
    no_verify: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "info" } else { "warn" }),
    )
    .init();

    let inst = SetPacking::from_path(&args.input)
        .with_context(|| format!("failed to load instance {}", args.input.display()))?;
    log::info!(
        "loaded instance with {} elements, {} sets and minimum packing size {}",
        inst.n_elements(),
        inst.n_sets(),
        inst.min_size()
    );

    let mut solver = ExternalSolver::new(
        external::glucose_command(&args.solver, args.verbose),
        InputVia::file_last(&args.output),
        "glucose",
    );
    if let Some(secs) = args.timeout {
        solver = solver.with_timeout(Duration::from_secs(secs));
    }

    let outcome = match packing::solve(&inst, &mut solver) {
        Ok(outcome) => outcome,
        Err(SolveError::NotFound(path)) => {
            eprintln!("Solver not found: {}", path.display());
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("solving failed"),
    };

    match outcome {
        Outcome::Packing(sel) => {
            if !args.no_verify {
                sel.verify(&inst)
                    .context("solver returned an invalid packing")?;
            }
            println!("{}", sel.summary(&inst));
        }
        Outcome::Unsat => println!("UNSAT"),
        Outcome::Unknown => println!("UNKNOWN"),
    }
    Ok(ExitCode::SUCCESS)
}
