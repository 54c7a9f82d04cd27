//! # Common Types for the Set Packing Encoding
//!
//! Variables, literals, clauses and assignments shared by the formula builder,
//! the encodings, the DIMACS reader/writer and the solver interface.

use std::{fmt, ops};

use thiserror::Error;

/// The hash map to use throughout the library
#[cfg(feature = "fxhash")]
pub type RsHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fxhash"))]
pub type RsHashMap<K, V> = std::collections::HashMap<K, V>;

/// The hash set to use throughout the library
#[cfg(feature = "fxhash")]
pub type RsHashSet<V> = rustc_hash::FxHashSet<V>;
#[cfg(not(feature = "fxhash"))]
pub type RsHashSet<V> = std::collections::HashSet<V>;

/// Type representing a boolean variable. Internal indexing starts from 0, in
/// DIMACS files a variable is written as `idx + 1`. The maximum index is
/// `(u32::MAX - 1) / 2` since literals are packed into a single `u32` as well.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Var {
    idx: u32,
}

impl Var {
    /// The maximum index that can be represented.
    pub const MAX_IDX: u32 = (u32::MAX - 1) / 2;

    /// Creates a new variable with a given index.
    /// Panics if `idx > Var::MAX_IDX`.
    #[must_use]
    pub fn new(idx: u32) -> Var {
        assert!(idx <= Var::MAX_IDX, "variable index too high");
        Var { idx }
    }

    /// Creates a new variable with a given index.
    ///
    /// # Errors
    ///
    /// [`TypeError::IdxTooHigh`] if `idx > Var::MAX_IDX`.
    pub fn new_with_error(idx: u32) -> Result<Var, TypeError> {
        if idx > Var::MAX_IDX {
            return Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX));
        }
        Ok(Var { idx })
    }

    /// Creates a literal that is not negated.
    ///
    /// # Examples
    ///
    /// ```
    /// use setpack::types::{Lit, Var};
    ///
    /// assert_eq!(Var::new(5).pos_lit(), Lit::positive(5));
    /// ```
    #[inline]
    #[must_use]
    pub fn pos_lit(self) -> Lit {
        Lit::new_unchecked(self.idx, false)
    }

    /// Creates a negated literal.
    #[inline]
    #[must_use]
    pub fn neg_lit(self) -> Lit {
        Lit::new_unchecked(self.idx, true)
    }

    /// Returns the index of the variable as a `usize` for indexing data structures
    #[inline]
    #[must_use]
    pub fn idx(&self) -> usize {
        self.idx as usize
    }

    /// Returns the 32 bit index of the variable
    #[inline]
    #[must_use]
    pub fn idx32(&self) -> u32 {
        self.idx
    }

    /// Converts the variable to its (1-based) DIMACS number
    ///
    /// # Panics
    ///
    /// If the variable does not fit into an `i32`.
    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        (self.idx() + 1)
            .try_into()
            .expect("variable index too high to fit in i32")
    }
}

/// Incrementing variables
impl ops::Add<u32> for Var {
    type Output = Var;

    fn add(self, rhs: u32) -> Self::Output {
        Var {
            idx: self.idx + rhs,
        }
    }
}

impl ops::AddAssign<u32> for Var {
    fn add_assign(&mut self, rhs: u32) {
        self.idx += rhs;
    }
}

/// Decrementing variables
impl ops::Sub<u32> for Var {
    type Output = Var;

    fn sub(self, rhs: u32) -> Self::Output {
        Var {
            idx: self.idx - rhs,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.idx)
    }
}

/// More easily creates variables. Mainly used in tests.
///
/// ```
/// use setpack::{var, types::Var};
///
/// assert_eq!(var![42], Var::new(42));
/// ```
#[macro_export]
macro_rules! var {
    ($v:expr) => {
        $crate::types::Var::new($v)
    };
}

/// Type representing literals, possibly negated boolean variables.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct Lit {
    /// Literal representation is `idx << 1` with the last bit representing
    /// whether the literal is negated or not
    lidx: u32,
}

impl Lit {
    #[inline]
    fn represent(idx: u32, negated: bool) -> u32 {
        (idx << 1) + u32::from(negated)
    }

    /// Creates a new (negated or not) literal with a given index.
    /// Panics if `idx > Var::MAX_IDX`.
    #[must_use]
    pub fn new(idx: u32, negated: bool) -> Lit {
        assert!(idx <= Var::MAX_IDX, "variable index too high");
        Lit {
            lidx: Lit::represent(idx, negated),
        }
    }

    /// Creates a new (negated or not) literal with a given index.
    ///
    /// # Errors
    ///
    /// [`TypeError::IdxTooHigh`] if `idx > Var::MAX_IDX`.
    pub fn new_with_error(idx: u32, negated: bool) -> Result<Lit, TypeError> {
        if idx > Var::MAX_IDX {
            return Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX));
        }
        Ok(Lit {
            lidx: Lit::represent(idx, negated),
        })
    }

    /// Creates a new literal without checking the index.
    /// Only use this if you are sure that `idx <= Var::MAX_IDX`.
    #[inline]
    #[must_use]
    pub fn new_unchecked(idx: u32, negated: bool) -> Lit {
        Lit {
            lidx: Lit::represent(idx, negated),
        }
    }

    /// Creates a new positive literal with a given index.
    #[inline]
    #[must_use]
    pub fn positive(idx: u32) -> Lit {
        Lit::new(idx, false)
    }

    /// Creates a new negated literal with a given index.
    #[inline]
    #[must_use]
    pub fn negative(idx: u32) -> Lit {
        Lit::new(idx, true)
    }

    /// Creates a literal from its signed DIMACS representation.
    ///
    /// # Errors
    ///
    /// [`TypeError::DimacsZero`] if the value is zero, [`TypeError::IdxTooHigh`] if the
    /// variable index is too high.
    pub fn from_dimacs(val: i32) -> Result<Lit, TypeError> {
        if val == 0 {
            return Err(TypeError::DimacsZero);
        }
        Lit::new_with_error(val.unsigned_abs() - 1, val < 0)
    }

    /// Gets the variable index of the literal
    #[inline]
    #[must_use]
    pub fn vidx(&self) -> usize {
        (self.lidx >> 1) as usize
    }

    /// Gets the variable of the literal
    #[inline]
    #[must_use]
    pub fn var(&self) -> Var {
        Var {
            idx: self.lidx >> 1,
        }
    }

    /// Checks whether the literal is positive
    #[inline]
    #[must_use]
    pub fn is_pos(&self) -> bool {
        (self.lidx & 1u32) == 0
    }

    /// Checks whether the literal is negated
    #[inline]
    #[must_use]
    pub fn is_neg(&self) -> bool {
        (self.lidx & 1u32) == 1
    }

    /// Converts the literal to its signed DIMACS representation
    ///
    /// # Panics
    ///
    /// If the variable does not fit into an `i32`.
    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        let num = self.var().to_dimacs();
        if self.is_neg() {
            -num
        } else {
            num
        }
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            lidx: self.lidx ^ 1u32,
        }
    }
}

impl ops::Neg for Lit {
    type Output = Lit;

    #[inline]
    fn neg(self) -> Lit {
        !self
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neg() {
            write!(f, "~x{}", self.vidx())
        } else {
            write!(f, "x{}", self.vidx())
        }
    }
}

/// More easily creates literals. Mainly used in tests.
///
/// ```
/// use setpack::{lit, types::Lit};
///
/// assert_eq!(lit![42], Lit::positive(42));
/// assert_eq!(!lit![42], Lit::negative(42));
/// ```
#[macro_export]
macro_rules! lit {
    ($l:expr) => {
        $crate::types::Lit::positive($l)
    };
}

/// Creates literals from DIMACS numbering (starts from 1, negative value is
/// negation). Mainly used in tests.
///
/// ```
/// use setpack::{lit, dimacs_lit};
///
/// assert_eq!(dimacs_lit![42], lit![41]);
/// assert_eq!(dimacs_lit![-42], !lit![41]);
/// ```
#[macro_export]
macro_rules! dimacs_lit {
    ($l:expr) => {
        $crate::types::Lit::from_dimacs($l).unwrap()
    };
}

/// Type representing a clause, a disjunction of literals
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash, Clone, Default, Debug)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    /// Creates a new empty clause
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the clause as a slice of literals
    #[must_use]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Gets the length of the clause
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Checks if the clause is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Adds a literal to the clause
    #[inline]
    pub fn add(&mut self, lit: Lit) {
        self.lits.push(lit);
    }

    /// Gets an iterator over the clause
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Lit> {
        self.lits.iter()
    }

    /// Checks whether the clause is satisfied by an assignment.
    /// Unassigned literals count as not satisfying.
    #[must_use]
    pub fn is_sat(&self, assign: &Assignment) -> bool {
        self.lits
            .iter()
            .any(|&lit| assign.lit_value(lit) == TernaryVal::True)
    }
}

impl From<&[Lit]> for Clause {
    fn from(value: &[Lit]) -> Self {
        Self {
            lits: Vec::from(value),
        }
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        Self {
            lits: iter.into_iter().collect(),
        }
    }
}

impl Extend<Lit> for Clause {
    fn extend<T: IntoIterator<Item = Lit>>(&mut self, iter: T) {
        self.lits.extend(iter);
    }
}

impl ops::Index<usize> for Clause {
    type Output = Lit;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.lits[index]
    }
}

impl IntoIterator for Clause {
    type Item = Lit;
    type IntoIter = std::vec::IntoIter<Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.lits.into_iter()
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Lit;
    type IntoIter = std::slice::Iter<'a, Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.lits.iter()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, lit) in self.lits.iter().enumerate() {
            if idx > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, ")")
    }
}

/// Creates a clause from a list of literals
///
/// ```
/// use setpack::{clause, lit};
///
/// let cl = clause![lit![0], !lit![1]];
/// assert_eq!(cl.len(), 2);
/// ```
#[macro_export]
macro_rules! clause {
    ( $($l:expr),* ) => {
        {
            let mut tmp_clause = $crate::types::Clause::new();
            $(
                tmp_clause.add($l);
            )*
            tmp_clause
        }
    };
}

/// Ternary value assigned to a literal or variable, including possible "don't care"
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum TernaryVal {
    /// Positive assignment.
    True,
    /// Negative assignment.
    False,
    /// The value was not reported.
    DontCare,
}

impl TernaryVal {
    /// Converts a [`TernaryVal`] to a bool with a default value for "don't cares"
    #[must_use]
    pub fn to_bool_with_def(self, def: bool) -> bool {
        match self {
            TernaryVal::True => true,
            TernaryVal::False => false,
            TernaryVal::DontCare => def,
        }
    }
}

impl fmt::Display for TernaryVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TernaryVal::True => write!(f, "1"),
            TernaryVal::False => write!(f, "0"),
            TernaryVal::DontCare => write!(f, "_"),
        }
    }
}

impl From<bool> for TernaryVal {
    fn from(value: bool) -> Self {
        if value {
            return TernaryVal::True;
        }
        TernaryVal::False
    }
}

/// Type representing an assignment of variables, as reported by a solver
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[repr(transparent)]
pub struct Assignment {
    assignment: Vec<TernaryVal>,
}

impl Assignment {
    /// Get the value that the assignment gives a variable.
    /// Variables beyond the assignment are [`TernaryVal::DontCare`].
    #[must_use]
    pub fn var_value(&self, var: Var) -> TernaryVal {
        self.assignment
            .get(var.idx())
            .copied()
            .unwrap_or(TernaryVal::DontCare)
    }

    /// Same as [`Assignment::var_value`], but for literals.
    #[must_use]
    pub fn lit_value(&self, lit: Lit) -> TernaryVal {
        match self.var_value(lit.var()) {
            TernaryVal::DontCare => TernaryVal::DontCare,
            TernaryVal::True if lit.is_neg() => TernaryVal::False,
            TernaryVal::False if lit.is_neg() => TernaryVal::True,
            val => val,
        }
    }

    /// Assigns a variable in the assignment
    pub fn assign_var(&mut self, var: Var, val: TernaryVal) {
        if self.assignment.len() < var.idx() + 1 {
            self.assignment.resize(var.idx() + 1, TernaryVal::DontCare);
        }
        self.assignment[var.idx()] = val;
    }

    /// Assigns a literal to true
    pub fn assign_lit(&mut self, lit: Lit) {
        self.assign_var(lit.var(), TernaryVal::from(lit.is_pos()));
    }

    /// Gets the number of variables covered by the assignment
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// Checks whether the assignment is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Get the maximum variable in the assignment
    #[must_use]
    pub fn max_var(&self) -> Option<Var> {
        let len = u32::try_from(self.assignment.len()).ok()?;
        len.checked_sub(1).map(Var::new)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.assignment.iter().try_for_each(|tv| write!(f, "{tv}"))
    }
}

impl FromIterator<Lit> for Assignment {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        let mut assignment = Assignment::default();
        iter.into_iter().for_each(|l| assignment.assign_lit(l));
        assignment
    }
}

impl From<Vec<TernaryVal>> for Assignment {
    fn from(assignment: Vec<TernaryVal>) -> Self {
        Self { assignment }
    }
}

impl From<Vec<bool>> for Assignment {
    fn from(values: Vec<bool>) -> Self {
        Self {
            assignment: values.into_iter().map(TernaryVal::from).collect(),
        }
    }
}

/// Errors related to types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// The requested index is too high.
    /// Contains the requested and the maximum index.
    #[error("index {0} is too high (maximum {1})")]
    IdxTooHigh(u32, u32),
    /// DIMACS literal is zero
    #[error("zero is an invalid DIMACS literal")]
    DimacsZero,
}
