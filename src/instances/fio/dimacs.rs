//! # Parsing and Writing DIMACS CNF Files
//!
//! The writer produces exactly the format SAT solvers expect: a header line
//! `p cnf <n_vars> <n_clauses>` followed by one line per clause, with the
//! literals separated by single spaces and terminated by `0`.
//!
//! The parser is lean and accepts comment lines and empty lines anywhere.
//!
//! ## References
//!
//! - [DIMACS CNF](http://www.satcompetition.org/2011/format-benchmarks2011.html)

use std::io::{self, BufRead, Write};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{i32, line_ending, multispace0, multispace1, u32, u64},
    combinator::{all_consuming, map_res, recognize, success},
    error::{Error as NomError, ErrorKind, ParseError},
    multi::separated_list0,
    sequence::{pair, terminated, tuple},
    IResult,
};
use thiserror::Error;

use crate::{
    instances::Cnf,
    types::{Clause, Lit},
};

/// Errors occuring within the DIMACS parsing module
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid literal in the file
    #[error("invalid literal: {0}")]
    Lit(String),
    /// Invalid ending of a clause
    #[error("invalid clause ending: {0}")]
    ClauseEnding(String),
    /// The file ended before a p line was found
    #[error("file ended before the p line")]
    PreambleNoEnd,
    /// Invalid p line
    #[error("invalid p-line: {0}")]
    PLine(String),
    /// P line value is too large to fit in a [`usize`]
    #[error("value in p-line too large to fit usize: {0}")]
    PValTooLarge(u64),
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    /// Base error from nom parsing
    #[error("nom error: {0} ({1:?})")]
    NomError(String, ErrorKind),
    /// Incomplete nom error
    #[error("nom parser requested more data")]
    NomIncomplete,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Lit(l0), Self::Lit(r0))
            | (Self::ClauseEnding(l0), Self::ClauseEnding(r0))
            | (Self::PLine(l0), Self::PLine(r0)) => l0 == r0,
            (Self::PValTooLarge(l0), Self::PValTooLarge(r0)) => l0 == r0,
            (Self::NomError(l0, l1), Self::NomError(r0, r1)) => l0 == r0 && l1 == r1,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl ParseError<&str> for Error {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        Self::NomError(String::from(input), kind)
    }

    fn append(_: &str, _: ErrorKind, other: Self) -> Self {
        // Other error always has precedence. This should prefer more meaningful
        // errors than [`Error::NomError`]
        other
    }
}

/// Upper bound on the clauses reserved up front based on the p line
const MAX_PREALLOC_CLAUSES: usize = 1 << 16;

/// The sizes announced in the p line of a CNF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The number of variables
    pub n_vars: u32,
    /// The number of clauses
    pub n_clauses: usize,
}

/// Writes a CNF to a DIMACS CNF file
///
/// # Errors
///
/// If writing fails
pub fn write_cnf<W: Write>(writer: &mut W, cnf: &Cnf, n_vars: u32) -> Result<(), io::Error> {
    writeln!(writer, "p cnf {} {}", n_vars, cnf.len())?;
    cnf.iter().try_for_each(|cl| write_clause(writer, cl))?;
    writer.flush()
}

fn write_clause<W: Write>(writer: &mut W, clause: &Clause) -> Result<(), io::Error> {
    clause
        .iter()
        .try_for_each(|l| write!(writer, "{} ", l.to_dimacs()))?;
    writeln!(writer, "0")
}

/// Parses a DIMACS CNF file, returning the p line data and the clauses.
/// The announced sizes are returned as is and not checked against the body.
///
/// # Errors
///
/// If reading fails, the p line is missing or invalid, or a clause is malformed
pub fn parse_cnf<R: BufRead>(mut reader: R) -> Result<(Header, Cnf), Error> {
    let header = parse_preamble(&mut reader)?;
    // the announced size is untrusted, so only use it as a bounded hint
    let mut cnf = Cnf::with_capacity(header.n_clauses.min(MAX_PREALLOC_CLAUSES));
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Ok((header, cnf));
        }
        let (_, opt_clause) = parse_cnf_line(&buf).map_err(unwrap_dimacs_error)?;
        if let Some(clause) = opt_clause {
            cnf.add_clause(clause);
        }
    }
}

fn unwrap_dimacs_error(err: nom::Err<Error>) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::NomIncomplete,
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
    }
}

/// Skips comments and empty lines and parses the p line
fn parse_preamble<R: BufRead>(reader: &mut R) -> Result<Header, Error> {
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Err(Error::PreambleNoEnd);
        }
        if buf.starts_with('c') || buf.trim().is_empty() {
            continue;
        }
        if buf.starts_with('p') {
            let (_, header) = parse_p_line(&buf).map_err(unwrap_dimacs_error)?;
            return Ok(header);
        }
        return Err(Error::PLine(buf));
    }
}

/// Parses the p line of a CNF file
fn parse_p_line(input: &str) -> IResult<&str, Header, Error> {
    let full_p_line = String::from(input.trim_end());
    let (input, (_, _, _, _, n_vars, _, n_clauses)) = tuple::<_, _, NomError<_>, _>((
        tag("p"),
        multispace1,
        tag("cnf"),
        multispace1,
        u32,
        multispace1,
        u64,
    ))(input)
    .map_err(|e| e.map(|_| Error::PLine(full_p_line)))?;
    let n_clauses = usize::try_from(n_clauses)
        .map_err(|_| nom::Err::Error(Error::PValTooLarge(n_clauses)))?;
    Ok((input, Header { n_vars, n_clauses }))
}

/// Parses a CNF line, either a comment or a clause
fn parse_cnf_line(input: &str) -> IResult<&str, Option<Clause>, Error> {
    let (input, _) = multispace0(input)?;
    if input.trim().is_empty() {
        // Tolerate empty lines
        return Ok((input, None));
    }
    if let Ok((input, _)) = tag::<&str, &str, NomError<&str>>("c")(input) {
        return Ok((input, None));
    }
    let (input, lits) =
        terminated(separated_list0(multispace1, parse_lit), parse_clause_ending)(input)?;
    Ok((input, Some(Clause::from_iter(lits))))
}

/// Nuclear parser for literal
fn parse_lit(input: &str) -> IResult<&str, Lit, Error> {
    map_res(i32, Lit::from_dimacs)(input)
        .map_err(|e| e.map(|e: NomError<&str>| Error::Lit(String::from(e.input))))
}

/// Parses the end of a clause
/// A '0' followed by a linebreak, as well as a '0' followed by
/// whitespace or only a linebreak are treated as valid clause endings.
fn parse_clause_ending(input: &str) -> IResult<&str, &str, Error> {
    recognize(pair(
        multispace0,
        alt((
            recognize(all_consuming(success(""))),
            recognize(all_consuming(tag("0"))),
            recognize(terminated(tag("0"), line_ending)),
            recognize(terminated(tag("0"), multispace1)),
            recognize(line_ending),
        )),
    ))(input)
    .map_err(|e| e.map(|e: NomError<&str>| Error::ClauseEnding(String::from(e.input))))
}
