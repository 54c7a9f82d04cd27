//! # Solver Interface for External Executables
//!
//! The instance is written to a DIMACS file whose path is passed to the solver
//! as the last argument. The solver output is read from `stdout` and parsed
//! with [`fio::parse_sat_solver_output`].

use std::{
    ffi::OsStr,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::{self, Child, Command, ExitStatus},
    thread,
    time::{Duration, Instant},
};

use crate::{
    instances::{
        fio::{self, SolverOutput},
        ManageVars, SatInstance,
    },
    types::Assignment,
};

use super::{Solve, SolveError, SolverResult, SolverState};

/// Interval in which the solver process is polled when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options for how the input instance should be passed to the external solver
#[derive(Debug, Clone)]
pub struct InputVia(InputViaInt);

#[derive(Debug, Clone)]
enum InputViaInt {
    /// Passes the instance by writing it to a file at the specified path
    ///
    /// The file will _not_ be removed afterwards
    File(PathBuf),
    /// Passes the instance by writing it to a temporary file that will automatically be removed
    TempFile,
}

impl InputVia {
    /// Pass the input via a persistent file at `path`, passed to the solver as the last argument
    #[must_use]
    pub fn file_last<P: AsRef<Path>>(path: P) -> Self {
        InputVia(InputViaInt::File(path.as_ref().to_path_buf()))
    }

    /// Pass the input via a temporary file, passed to the solver as the last argument
    #[must_use]
    pub fn tempfile_last() -> Self {
        InputVia(InputViaInt::TempFile)
    }
}

impl Default for InputVia {
    fn default() -> Self {
        InputVia(InputViaInt::TempFile)
    }
}

/// Builds the command line for glucose-style solvers: `-model` makes the
/// solver print value lines and `-verb=0` silences its progress output
pub fn glucose_command<S: AsRef<OsStr>>(solver: S, verbose: bool) -> Command {
    let mut cmd = Command::new(solver);
    cmd.arg("-model");
    if !verbose {
        cmd.arg("-verb=0");
    }
    cmd
}

/// A solver called via an external executable
///
/// The solver can be called once. Afterwards, the result and model stay
/// available until the object is dropped.
#[derive(Debug)]
pub struct Solver {
    signature: &'static str,
    input: InputVia,
    timeout: Option<Duration>,
    state: State,
}

#[derive(Debug)]
enum State {
    Pre(Command),
    Post(Outcome),
}

#[derive(Debug)]
enum Outcome {
    Sat(Assignment),
    Unsat,
    Interrupted,
}

impl Outcome {
    fn state(&self) -> SolverState {
        match self {
            Outcome::Sat(_) => SolverState::Sat,
            Outcome::Unsat => SolverState::Unsat,
            Outcome::Interrupted => SolverState::Interrupted,
        }
    }

    fn result(&self) -> SolverResult {
        match self {
            Outcome::Sat(_) => SolverResult::Sat,
            Outcome::Unsat => SolverResult::Unsat,
            Outcome::Interrupted => SolverResult::Interrupted,
        }
    }
}

impl Solver {
    /// Initializes a solver with a [`Command`] that is fully set up, except for the input instance
    ///
    /// # Example
    ///
    /// ```
    /// use setpack::solvers::{external, ExternalSolver};
    ///
    /// let solver = ExternalSolver::new(
    ///     external::glucose_command("<path to solver binary>", false),
    ///     external::InputVia::file_last("formula.cnf"),
    ///     "glucose",
    /// );
    /// ```
    #[must_use]
    pub fn new(cmd: Command, input: InputVia, signature: &'static str) -> Self {
        Solver {
            signature,
            input,
            timeout: None,
            state: State::Pre(cmd),
        }
    }

    /// Initializes a solver that gets its input via a temporary file
    #[must_use]
    pub fn new_default(cmd: Command, signature: &'static str) -> Self {
        Solver::new(cmd, InputVia::default(), signature)
    }

    /// Sets a wall clock limit for the solver process. When it is exceeded,
    /// the process is killed and the result is [`SolverResult::Interrupted`].
    ///
    /// Only the direct child is killed. Processes it started itself, e.g., by
    /// a wrapper script, keep running until they finish on their own.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Solve for Solver {
    fn signature(&self) -> &'static str {
        self.signature
    }

    fn solve<VM: ManageVars>(
        &mut self,
        inst: &SatInstance<VM>,
    ) -> Result<SolverResult, SolveError> {
        let cmd = match std::mem::replace(&mut self.state, State::Post(Outcome::Interrupted)) {
            State::Pre(cmd) => cmd,
            State::Post(outcome) => {
                let actual = outcome.state();
                self.state = State::Post(outcome);
                return Err(SolveError::State {
                    required: SolverState::Input,
                    actual,
                });
            }
        };
        let outcome = match &self.input.0 {
            InputViaInt::File(path) => {
                inst.write_dimacs_path(path).map_err(SolveError::Write)?;
                call_external(cmd, path, self.timeout)?
            }
            InputViaInt::TempFile => {
                let mut writer =
                    BufWriter::new(tempfile::NamedTempFile::new().map_err(SolveError::Write)?);
                inst.write_dimacs(&mut writer).map_err(SolveError::Write)?;
                let path = writer
                    .into_inner()
                    .map_err(|err| SolveError::Write(err.into_error()))?
                    .into_temp_path();
                let outcome = call_external(cmd, &path, self.timeout)?;
                path.close().map_err(SolveError::Write)?;
                outcome
            }
        };
        let res = outcome.result();
        self.state = State::Post(outcome);
        Ok(res)
    }

    fn solution(&self) -> Result<&Assignment, SolveError> {
        match &self.state {
            State::Pre(_) => Err(SolveError::State {
                required: SolverState::Sat,
                actual: SolverState::Input,
            }),
            State::Post(Outcome::Sat(sol)) => Ok(sol),
            State::Post(outcome) => Err(SolveError::State {
                required: SolverState::Sat,
                actual: outcome.state(),
            }),
        }
    }
}

/// Checks that the exit status is one of the codes SAT solvers use. The codes
/// are not cross-checked against the solver output.
fn check_exit_code(status: ExitStatus) -> Result<(), SolveError> {
    match status.code() {
        Some(0 | 10 | 20) => Ok(()),
        Some(x) => Err(SolveError::ExitCode(x)),
        None => Err(SolveError::Signal),
    }
}

/// Waits for the child to exit or the timeout to expire
fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

fn call_external(
    mut cmd: Command,
    instance: &Path,
    timeout: Option<Duration>,
) -> Result<Outcome, SolveError> {
    cmd.arg(instance).stdout(process::Stdio::piped());
    log::info!("calling solver: {cmd:?}");
    let mut child = cmd.spawn().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            SolveError::NotFound(PathBuf::from(cmd.get_program()))
        } else {
            SolveError::Spawn(err)
        }
    })?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SolveError::Spawn(io::Error::other("solver stdout not captured")))?;
    // drain stdout on a second thread so that the solver never blocks on a full pipe
    let output_handle =
        thread::spawn(move || fio::parse_sat_solver_output(io::BufReader::new(stdout)));

    let status = match timeout {
        None => Some(child.wait().map_err(SolveError::Wait)?),
        Some(timeout) => wait_timeout(&mut child, timeout).map_err(SolveError::Wait)?,
    };
    let Some(status) = status else {
        log::warn!("solver exceeded the time limit, killing it");
        child.kill().map_err(SolveError::Wait)?;
        child.wait().map_err(SolveError::Wait)?;
        // processes started by the solver may still hold the pipe, so the
        // output thread is detached instead of joined
        drop(output_handle);
        return Ok(Outcome::Interrupted);
    };
    log::debug!("solver exited with {status}");

    let output = output_handle
        .join()
        .map_err(|_| SolveError::Wait(io::Error::other("solver output thread panicked")))??;
    check_exit_code(status)?;
    Ok(match output {
        SolverOutput::Sat(model) => Outcome::Sat(model),
        SolverOutput::Unsat => Outcome::Unsat,
    })
}
