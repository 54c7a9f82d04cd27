//! # Interfaces to SAT Solvers
//!
//! The formula is never solved in-process. [`Solve`] is the seam between the
//! encoding pipeline and a solver; the provided implementation,
//! [`ExternalSolver`], runs a solver executable on a DIMACS file.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::{
    instances::{fio::SatSolverOutputError, ManageVars, SatInstance},
    types::Assignment,
};

pub mod external;
pub use external::Solver as ExternalSolver;

/// Trait for solvers that can decide a [`SatInstance`] once
pub trait Solve {
    /// Gets a signature of the solver implementation
    fn signature(&self) -> &'static str;

    /// Solves the instance
    ///
    /// # Errors
    ///
    /// If the solver could not be run or failed, see [`SolveError`]
    fn solve<VM: ManageVars>(&mut self, inst: &SatInstance<VM>)
        -> Result<SolverResult, SolveError>;

    /// Gets the model found by the last call to [`Solve::solve`]
    ///
    /// # Errors
    ///
    /// [`SolveError::State`] if the solver is not in the satisfiable state
    fn solution(&self) -> Result<&Assignment, SolveError>;
}

/// Return value for solving queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverResult {
    /// The query was found satisfiable.
    Sat,
    /// The query was found unsatisfiable.
    Unsat,
    /// The query was interrupted without returning a result.
    Interrupted,
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Sat => write!(f, "SAT"),
            SolverResult::Unsat => write!(f, "UNSAT"),
            SolverResult::Interrupted => write!(f, "UNKNOWN"),
        }
    }
}

/// States that a solver can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// The solver has not been run yet
    Input,
    /// The last solver call returned satisfiable
    Sat,
    /// The last solver call returned unsatisfiable
    Unsat,
    /// The last solver call was interrupted
    Interrupted,
}

impl fmt::Display for SolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverState::Input => write!(f, "INPUT"),
            SolverState::Sat => write!(f, "SAT"),
            SolverState::Unsat => write!(f, "UNSAT"),
            SolverState::Interrupted => write!(f, "INTERRUPTED"),
        }
    }
}

impl From<SolverResult> for SolverState {
    fn from(value: SolverResult) -> Self {
        match value {
            SolverResult::Sat => SolverState::Sat,
            SolverResult::Unsat => SolverState::Unsat,
            SolverResult::Interrupted => SolverState::Interrupted,
        }
    }
}

/// Errors when running a solver. Note that an unsatisfiable instance is not
/// an error but [`SolverResult::Unsat`].
#[derive(Error, Debug)]
pub enum SolveError {
    /// The solver executable does not exist
    #[error("solver executable `{}` not found", .0.display())]
    NotFound(PathBuf),
    /// The solver process could not be started
    #[error("failed to start solver: {0}")]
    Spawn(#[source] io::Error),
    /// Writing the instance for the solver failed
    #[error("failed to write instance: {0}")]
    Write(#[source] io::Error),
    /// Waiting for or killing the solver process failed
    #[error("failed to wait for solver: {0}")]
    Wait(#[source] io::Error),
    /// The solver exited with a code that is not a SAT solver result code
    #[error("solver returned unexpected exit code {0}")]
    ExitCode(i32),
    /// The solver was terminated by a signal
    #[error("solver process terminated by signal")]
    Signal,
    /// The solver output could not be read
    #[error(transparent)]
    Output(#[from] SatSolverOutputError),
    /// The operation is not possible in the current state
    #[error("action requires {required} state, but solver is in {actual} state")]
    State {
        /// The state required for the operation
        required: SolverState,
        /// The actual solver state
        actual: SolverState,
    },
}
