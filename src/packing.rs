//! # Set Packing Instances
//!
//! A set packing instance consists of a universe of elements `1..=n`, a
//! sequence of `m` sets over that universe, and a minimum packing size `k`.
//! The question is whether there are at least `k` pairwise disjoint sets.
//!
//! ## File Format
//!
//! The first line holds `n m k`, followed by exactly `m` lines each listing
//! the elements of one set separated by whitespace. Lines for empty sets are
//! empty. Blank lines after the last set are ignored.
//!
//! ```text
//! 5 4 2
//! 1 2
//! 3 4
//! 1 3
//! 5
//! ```

use std::{io, path::Path};

use itertools::Itertools;
use thiserror::Error;

use crate::{
    instances::fio,
    solvers::{Solve, SolveError, SolverResult},
};

pub mod decode;
pub mod encoding;

use decode::Selection;
use encoding::Encoding;

/// An instance of the set packing decision problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPacking {
    /// The number of elements in the universe
    n: u32,
    /// The sets, with elements in `1..=n`
    sets: Vec<Vec<u32>>,
    /// The minimum number of sets in a packing
    k: usize,
}

/// Errors for invalid set packing instances
#[derive(Error, Debug)]
pub enum InstanceError {
    /// The input ended before the header
    #[error("missing header line `n m k`")]
    MissingHeader,
    /// The header could not be parsed
    #[error("line {line}: invalid header `{text}`, expected `n m k`")]
    Header {
        /// The line number of the header
        line: usize,
        /// The offending header line
        text: String,
    },
    /// A token in a set line is not a non-negative integer
    #[error("line {line}: invalid element `{token}`")]
    Token {
        /// The line number
        line: usize,
        /// The token that failed to parse
        token: String,
    },
    /// The input ended before all sets were read
    #[error("expected {expected} sets, but found only {found}")]
    TooFewSets {
        /// The number of sets announced in the header
        expected: usize,
        /// The number of set lines found
        found: usize,
    },
    /// There is a non-blank line after the last set
    #[error("line {line}: more set lines than announced in the header")]
    TooManySets {
        /// The line number of the first extra line
        line: usize,
    },
    /// A set contains an element outside the universe
    #[error("set {set} contains element {element}, which is not in 1..={n}")]
    ElementOutOfRange {
        /// The 1-based set index
        set: usize,
        /// The offending element
        element: u32,
        /// The universe size
        n: u32,
    },
    /// The minimum packing size exceeds the number of sets
    #[error("minimum packing size {k} exceeds the number of sets {m}")]
    MinSizeTooLarge {
        /// The minimum packing size
        k: usize,
        /// The number of sets
        m: usize,
    },
    /// Reading the input failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SetPacking {
    /// Creates a new instance over the universe `1..=n`
    ///
    /// Duplicate elements within a set are collapsed, keeping the first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// [`InstanceError::ElementOutOfRange`] if an element is `0` or larger than
    /// `n`, [`InstanceError::MinSizeTooLarge`] if `k` is larger than the number
    /// of sets.
    pub fn new(n: u32, sets: Vec<Vec<u32>>, k: usize) -> Result<Self, InstanceError> {
        if k > sets.len() {
            return Err(InstanceError::MinSizeTooLarge { k, m: sets.len() });
        }
        let sets = sets
            .into_iter()
            .enumerate()
            .map(|(idx, set)| {
                if let Some(&element) = set.iter().find(|&&e| e == 0 || e > n) {
                    return Err(InstanceError::ElementOutOfRange {
                        set: idx + 1,
                        element,
                        n,
                    });
                }
                let len = set.len();
                let set: Vec<u32> = set.into_iter().unique().collect();
                if set.len() < len {
                    log::warn!("set {} contains duplicate elements, collapsing them", idx + 1);
                }
                Ok(set)
            })
            .collect::<Result<_, _>>()?;
        Ok(SetPacking { n, sets, k })
    }

    /// Parses an instance from a reader
    ///
    /// # Errors
    ///
    /// If the input is malformed or reading fails, see [`InstanceError`]
    pub fn from_reader<R: io::BufRead>(reader: R) -> Result<Self, InstanceError> {
        parsing::parse_instance(reader)
    }

    /// Parses an instance from a file. With feature `compression`, the file
    /// is decompressed according to its extension.
    ///
    /// # Errors
    ///
    /// If the file cannot be opened or is malformed, see [`InstanceError`]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        let reader = fio::open_compressed_uncompressed_read(path)?;
        Self::from_reader(reader)
    }

    /// Gets the size of the universe
    #[must_use]
    pub fn n_elements(&self) -> u32 {
        self.n
    }

    /// Gets the number of sets
    #[must_use]
    pub fn n_sets(&self) -> usize {
        self.sets.len()
    }

    /// Gets the minimum packing size, `0` meaning there is no minimum
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.k
    }

    /// Gets all sets, the set with index `i` at position `i - 1`
    #[must_use]
    pub fn sets(&self) -> &[Vec<u32>] {
        &self.sets
    }

    /// Gets the set with the given 1-based index
    #[must_use]
    pub fn set(&self, idx: usize) -> Option<&[u32]> {
        idx.checked_sub(1)
            .and_then(|idx| self.sets.get(idx))
            .map(Vec::as_slice)
    }
}

/// The outcome of solving a set packing instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A packing of the required size was found
    Packing(Selection),
    /// There is no packing of the required size
    Unsat,
    /// The solver did not decide the instance
    Unknown,
}

/// Encodes `inst`, solves the formula with `solver` and decodes the model
///
/// The selection is returned as decoded; use [`Selection::verify`] to check it.
///
/// # Errors
///
/// If the solver fails, see [`SolveError`]
pub fn solve<S: Solve>(inst: &SetPacking, solver: &mut S) -> Result<Outcome, SolveError> {
    let enc = Encoding::new(inst);
    log::info!(
        "solving {} vars and {} clauses with {}",
        enc.instance().n_vars(),
        enc.instance().n_clauses(),
        solver.signature()
    );
    match solver.solve(enc.instance())? {
        SolverResult::Sat => Ok(Outcome::Packing(Selection::decode(
            solver.solution()?,
            enc.indicators(),
        ))),
        SolverResult::Unsat => Ok(Outcome::Unsat),
        SolverResult::Interrupted => Ok(Outcome::Unknown),
    }
}

mod parsing {
    use std::io;

    use nom::{
        character::complete::{space0, space1, u32},
        combinator::all_consuming,
        error::Error as NomErr,
        multi::separated_list0,
        sequence::{delimited, tuple},
    };

    use super::{InstanceError, SetPacking};

    fn header(input: &str) -> nom::IResult<&str, (u32, u32, u32)> {
        let (rest, (_, n, _, m, _, k, _)) =
            all_consuming(tuple((space0, u32, space1, u32, space1, u32, space0)))(input)?;
        Ok((rest, (n, m, k)))
    }

    fn elements(input: &str) -> nom::IResult<&str, Vec<u32>> {
        all_consuming(delimited(space0, separated_list0(space1, u32), space0))(input)
    }

    /// Reads the next line into `buf`, without the line ending
    fn next_line<R: io::BufRead>(reader: &mut R, buf: &mut String) -> io::Result<bool> {
        buf.clear();
        if reader.read_line(buf)? == 0 {
            return Ok(false);
        }
        let len = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(len);
        Ok(true)
    }

    pub fn parse_instance<R: io::BufRead>(mut reader: R) -> Result<SetPacking, InstanceError> {
        let mut buf = String::new();
        if !next_line(&mut reader, &mut buf)? {
            return Err(InstanceError::MissingHeader);
        }
        let (_, (n, m, k)) = header(&buf).map_err(|_| InstanceError::Header {
            line: 1,
            text: buf.clone(),
        })?;
        log::debug!("instance header: n={n} m={m} k={k}");
        let m = m as usize;

        let mut sets = Vec::new();
        let mut line = 1;
        while sets.len() < m {
            if !next_line(&mut reader, &mut buf)? {
                return Err(InstanceError::TooFewSets {
                    expected: m,
                    found: sets.len(),
                });
            }
            line += 1;
            let (_, set) = elements(&buf).map_err(|err| {
                let rest = match err {
                    nom::Err::Error(NomErr { input, .. })
                    | nom::Err::Failure(NomErr { input, .. }) => input,
                    nom::Err::Incomplete(_) => buf.as_str(),
                };
                InstanceError::Token {
                    line,
                    token: rest.split_whitespace().next().unwrap_or(rest).to_string(),
                }
            })?;
            sets.push(set);
        }
        while next_line(&mut reader, &mut buf)? {
            line += 1;
            if !buf.trim().is_empty() {
                return Err(InstanceError::TooManySets { line });
            }
        }

        SetPacking::new(n, sets, k as usize)
    }

}

#[cfg(test)]
mod tests {
    use super::{InstanceError, SetPacking};

    fn parse(input: &str) -> Result<SetPacking, InstanceError> {
        SetPacking::from_reader(input.as_bytes())
    }

    #[test]
    fn parse_valid() {
        let inst = parse("5 4 2\n1 2\n3 4\n1 3\n5\n").unwrap();
        assert_eq!(inst.n_elements(), 5);
        assert_eq!(inst.n_sets(), 4);
        assert_eq!(inst.min_size(), 2);
        assert_eq!(inst.set(1), Some(&[1, 2][..]));
        assert_eq!(inst.set(4), Some(&[5][..]));
        assert_eq!(inst.set(0), None);
        assert_eq!(inst.set(5), None);
    }

    #[test]
    fn parse_empty_sets_and_trailing_blanks() {
        let inst = parse("3 3 0\r\n1 2\r\n\r\n3\r\n\r\n  \n").unwrap();
        assert_eq!(inst.sets(), &[vec![1, 2], vec![], vec![3]]);
        // the last set line may lack a newline
        let inst = parse("3 1 1\n1 2 3").unwrap();
        assert_eq!(inst.sets(), &[vec![1, 2, 3]]);
    }

    #[test]
    fn collapse_duplicates() {
        let inst = SetPacking::new(3, vec![vec![2, 1, 2, 2, 3]], 1).unwrap();
        assert_eq!(inst.sets(), &[vec![2, 1, 3]]);
    }

    #[test]
    fn missing_header() {
        assert!(matches!(parse(""), Err(InstanceError::MissingHeader)));
    }

    #[test]
    fn bad_header() {
        assert!(matches!(
            parse("5 4\n1\n"),
            Err(InstanceError::Header { line: 1, .. })
        ));
        assert!(matches!(
            parse("a b c\n"),
            Err(InstanceError::Header { line: 1, .. })
        ));
    }

    #[test]
    fn bad_token() {
        match parse("5 2 1\n1 2\n3 x 4\n") {
            Err(InstanceError::Token { line, token }) => {
                assert_eq!(line, 3);
                assert_eq!(token, "x");
            }
            res => panic!("unexpected result {res:?}"),
        }
    }

    #[test]
    fn too_few_sets() {
        assert!(matches!(
            parse("5 3 1\n1 2\n3\n"),
            Err(InstanceError::TooFewSets {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn huge_set_count() {
        assert!(matches!(
            parse("1 4294967295 0\n"),
            Err(InstanceError::TooFewSets {
                expected: 4_294_967_295,
                found: 0
            })
        ));
    }

    #[test]
    fn too_many_sets() {
        assert!(matches!(
            parse("5 1 1\n1 2\n\n3\n"),
            Err(InstanceError::TooManySets { line: 4 })
        ));
    }

    #[test]
    fn element_out_of_range() {
        assert!(matches!(
            parse("3 2 1\n1 2\n0\n"),
            Err(InstanceError::ElementOutOfRange {
                set: 2,
                element: 0,
                n: 3
            })
        ));
        assert!(matches!(
            parse("3 1 1\n1 4\n"),
            Err(InstanceError::ElementOutOfRange {
                set: 1,
                element: 4,
                n: 3
            })
        ));
    }

    #[test]
    fn min_size_too_large() {
        assert!(matches!(
            parse("3 2 3\n1\n2\n"),
            Err(InstanceError::MinSizeTooLarge { k: 3, m: 2 })
        ));
    }
}
