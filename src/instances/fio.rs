//! # File IO and Solver Output Parsing
//!
//! Opening (optionally compressed) files and interpreting the textual output
//! of SAT solvers following the SAT competition conventions.

use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};

use thiserror::Error;

use crate::types::{Assignment, Lit};

pub mod dimacs;

/// Opens a reader for the file at `path`.
/// With feature `compression` supports bzip2, gzip and xz compression.
///
/// # Errors
///
/// If the file cannot be opened
pub fn open_compressed_uncompressed_read<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::BufRead>, io::Error> {
    let path = path.as_ref();
    let raw_reader = File::open(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(io::BufReader::new(bzip2::read::MultiBzDecoder::new(
                raw_reader,
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(io::BufReader::new(flate2::read::MultiGzDecoder::new(
                raw_reader,
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(io::BufReader::new(xz2::read::XzDecoder::new_multi_decoder(
                raw_reader,
            ))));
        }
    }
    Ok(Box::new(io::BufReader::new(raw_reader)))
}

/// Opens a writer for the file at `path`.
/// With feature `compression` supports bzip2, gzip and xz compression.
///
/// # Errors
///
/// If the file cannot be created
pub fn open_compressed_uncompressed_write<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Write>, io::Error> {
    let path = path.as_ref();
    let raw_writer = File::create(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(bzip2::write::BzEncoder::new(
                raw_writer,
                bzip2::Compression::fast(),
            )));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(flate2::write::GzEncoder::new(
                raw_writer,
                flate2::Compression::fast(),
            )));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(xz2::write::XzEncoder::new(raw_writer, 1)));
        }
    }
    Ok(Box::new(io::BufWriter::new(raw_writer)))
}

/// Possible results of a SAT solver run as read from its output
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SolverOutput {
    /// The solver reported satisfiability, together with the (possibly
    /// partial or empty) model from the value lines
    Sat(Assignment),
    /// No satisfiable verdict was found in the output
    Unsat,
}

/// Errors when interpreting SAT solver output
#[derive(Error, Debug)]
pub enum SatSolverOutputError {
    /// A token in a value line is not an integer
    #[error("invalid literal `{token}` in value line {line}")]
    InvalidLit {
        /// The offending token
        token: String,
        /// The line number in the solver output
        line: usize,
    },
    /// Reading the output failed
    #[error("failed to read solver output: {0}")]
    Io(#[from] io::Error),
}

/// Checks whether a solution line reports satisfiability. `s UNSATISFIABLE`
/// contains `SATISFIABLE` as well and is excluded explicitly.
fn is_sat_sline(line: &str) -> bool {
    line.contains("SATISFIABLE") && !line.contains("UNSAT")
}

/// Parses the output of a SAT solver
///
/// A line starting with `s` that contains `SATISFIABLE` (and not `UNSAT`)
/// marks the instance as satisfiable. Lines starting with `v` contribute signed
/// literals to the model, `0` tokens are ignored and value lines may appear
/// before the solution line. Without a satisfiable solution line the output is
/// interpreted as [`SolverOutput::Unsat`].
///
/// # Errors
///
/// If reading fails or a value line contains a non-integer token
pub fn parse_sat_solver_output<R: BufRead>(
    reader: R,
) -> Result<SolverOutput, SatSolverOutputError> {
    let mut is_sat = false;
    let mut seen_sline = false;
    let mut model = Assignment::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;

        if let Some(verdict) = line.strip_prefix("s ") {
            seen_sline = true;
            if is_sat_sline(verdict) {
                is_sat = true;
            }
            continue;
        }

        if let Some(values) = line.strip_prefix("v ") {
            for token in values.split_whitespace() {
                let val: i32 = token.parse().map_err(|_| SatSolverOutputError::InvalidLit {
                    token: token.to_owned(),
                    line: idx + 1,
                })?;
                if val == 0 {
                    continue;
                }
                let lit = Lit::from_dimacs(val).map_err(|_| SatSolverOutputError::InvalidLit {
                    token: token.to_owned(),
                    line: idx + 1,
                })?;
                model.assign_lit(lit);
            }
        }
    }

    if !seen_sline {
        log::warn!("solver output contains no solution line, treating as unsatisfiable");
    }
    if !is_sat {
        return Ok(SolverOutput::Unsat);
    }
    Ok(SolverOutput::Sat(model))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{parse_sat_solver_output, SatSolverOutputError, SolverOutput};
    use crate::types::{Assignment, TernaryVal};

    #[test]
    fn parse_solver_output_sat() {
        let ground_truth = SolverOutput::Sat(Assignment::from(vec![
            TernaryVal::True,
            TernaryVal::False,
            TernaryVal::DontCare,
            TernaryVal::True,
            TernaryVal::False,
            TernaryVal::True,
        ]));

        let data = "c this is a comment\ns SATISFIABLE\nv 1 -2 4 -5 6 0\n";
        let res = parse_sat_solver_output(io::Cursor::new(data)).unwrap();
        assert_eq!(res, ground_truth);

        let data = "c this is a comment\nv 1 -2 4 -5 6 0\ns SATISFIABLE\n";
        let res = parse_sat_solver_output(io::Cursor::new(data)).unwrap();
        assert_eq!(res, ground_truth);

        let data = "c this is a comment\ns SATISFIABLE\nv 1 -2 4 \nv -5 6 0\n";
        let res = parse_sat_solver_output(io::Cursor::new(data)).unwrap();
        assert_eq!(res, ground_truth);
    }

    #[test]
    fn parse_solver_output_sat_without_model() {
        let res = parse_sat_solver_output(io::Cursor::new("s SATISFIABLE\n")).unwrap();
        assert_eq!(res, SolverOutput::Sat(Assignment::default()));
    }

    #[test]
    fn parse_solver_output_unsat() {
        let res = parse_sat_solver_output(io::Cursor::new("c bla\ns UNSATISFIABLE\n")).unwrap();
        assert_eq!(res, SolverOutput::Unsat);
    }

    #[test]
    fn parse_solver_output_no_sline() {
        let res = parse_sat_solver_output(io::Cursor::new("c crashed\nv 1 2 0\n")).unwrap();
        assert_eq!(res, SolverOutput::Unsat);
        let res = parse_sat_solver_output(io::Cursor::new("")).unwrap();
        assert_eq!(res, SolverOutput::Unsat);
    }

    #[test]
    fn parse_solver_output_unknown_is_not_sat() {
        let res = parse_sat_solver_output(io::Cursor::new("s UNKNOWN\n")).unwrap();
        assert_eq!(res, SolverOutput::Unsat);
    }

    #[test]
    fn parse_solver_output_invalid_vline() {
        let res = parse_sat_solver_output(io::Cursor::new("s SATISFIABLE\nv 1 x 0\n"));
        assert!(matches!(
            res,
            Err(SatSolverOutputError::InvalidLit { ref token, line: 2 }) if token == "x"
        ));
    }
}
