//! # Satisfiability Instance Representations

use std::{io, ops::Index, path::Path};

use crate::{
    clause,
    encodings::CollectClauses,
    types::{Assignment, Clause, Lit, Var},
};

use super::{fio, BasicVarManager, ManageVars};

/// Simple type representing a CNF formula. Other than [`SatInstance<VM>`], this
/// type only supports clauses and does not have an internal variable manager.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cnf {
    clauses: Vec<Clause>,
}

impl Cnf {
    /// Creates a new [`Cnf`]
    #[must_use]
    pub fn new() -> Cnf {
        Cnf::default()
    }

    /// Creates a new [`Cnf`] with a given capacity of clauses
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Cnf {
        Cnf {
            clauses: Vec::with_capacity(capacity),
        }
    }

    /// Adds a clause to the CNF
    #[inline]
    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Adds a unit clause to the CNF
    pub fn add_unit(&mut self, unit: Lit) {
        self.add_clause(clause![unit]);
    }

    /// Adds a binary clause to the CNF
    pub fn add_binary(&mut self, lit1: Lit, lit2: Lit) {
        self.add_clause(clause![lit1, lit2]);
    }

    /// Checks if the CNF is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of clauses in the CNF
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns an iterator over references to the clauses
    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    /// Gets the highest variable appearing in any clause
    #[must_use]
    pub fn max_var(&self) -> Option<Var> {
        self.clauses
            .iter()
            .flat_map(Clause::iter)
            .map(Lit::var)
            .max()
    }

    /// Checks whether every clause is satisfied by an assignment
    #[must_use]
    pub fn is_sat(&self, assign: &Assignment) -> bool {
        self.clauses.iter().all(|cl| cl.is_sat(assign))
    }
}

impl CollectClauses for Cnf {
    fn n_clauses(&self) -> usize {
        self.clauses.len()
    }
}

impl Extend<Clause> for Cnf {
    fn extend<Iter: IntoIterator<Item = Clause>>(&mut self, iter: Iter) {
        self.clauses.extend(iter);
    }
}

impl FromIterator<Clause> for Cnf {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Cnf {
    type Item = Clause;

    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cnf {
    type Item = &'a Clause;

    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

/// A growing CNF formula together with the variable manager that allocated its
/// variables. This is the formula builder that the problem encodings write to.
///
/// Clauses are stored verbatim: they are neither deduplicated nor simplified,
/// and literals are not checked against the variable manager. Only variables
/// obtained from [`SatInstance::new_var`] (or from the variable manager) may be
/// used in clauses.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SatInstance<VM: ManageVars = BasicVarManager> {
    cnf: Cnf,
    var_manager: VM,
}

impl<VM: ManageVars + Default> SatInstance<VM> {
    /// Creates a new, empty satisfiability instance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<VM: ManageVars> SatInstance<VM> {
    /// Allocates a fresh variable, higher than all previously allocated ones
    pub fn new_var(&mut self) -> Var {
        self.var_manager.new_var()
    }

    /// Allocates a fresh variable and returns its positive literal
    pub fn new_lit(&mut self) -> Lit {
        self.var_manager.new_lit()
    }

    /// Adds a clause to the instance
    pub fn add_clause(&mut self, cl: Clause) {
        debug_assert!(
            cl.iter().all(|l| l.var().idx32() < self.var_manager.n_used()),
            "clause {cl} references an unallocated variable"
        );
        self.cnf.add_clause(cl);
    }

    /// Adds a unit clause to the instance
    pub fn add_unit(&mut self, unit: Lit) {
        self.add_clause(clause![unit]);
    }

    /// Adds a binary clause to the instance
    pub fn add_binary(&mut self, lit1: Lit, lit2: Lit) {
        self.add_clause(clause![lit1, lit2]);
    }

    /// Returns the number of allocated variables
    pub fn n_vars(&self) -> u32 {
        self.var_manager.n_used()
    }

    /// Returns the number of clauses in the instance
    pub fn n_clauses(&self) -> usize {
        self.cnf.len()
    }

    /// Gets a reference to the clauses of the instance
    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Gets the clauses and a mutable variable manager at the same time, so
    /// that an encoding can collect into the clauses while allocating variables
    pub fn split_mut(&mut self) -> (&mut Cnf, &mut VM) {
        (&mut self.cnf, &mut self.var_manager)
    }

    /// Writes the instance to a DIMACS CNF file
    ///
    /// # Errors
    ///
    /// If writing fails
    pub fn write_dimacs<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        fio::dimacs::write_cnf(writer, &self.cnf, self.n_vars())
    }

    /// Writes the instance to a DIMACS CNF file at a path. With feature
    /// `compression`, the file is compressed according to its extension.
    ///
    /// # Errors
    ///
    /// If the file cannot be created or writing fails
    pub fn write_dimacs_path<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let mut writer = fio::open_compressed_uncompressed_write(path)?;
        self.write_dimacs(&mut writer)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cnf, SatInstance};
    use crate::{
        clause,
        encodings::CollectClauses,
        lit,
        types::{Assignment, Clause},
        var,
    };

    #[test]
    fn builder_allocates_monotonically() {
        let mut inst: SatInstance = SatInstance::new();
        let a = inst.new_var();
        let b = inst.new_var();
        let c = inst.new_lit();
        assert!(a < b);
        assert!(b < c.var());
        assert_eq!(a.to_dimacs(), 1);
        assert_eq!(inst.n_vars(), 3);
    }

    #[test]
    fn builder_keeps_clauses_verbatim() {
        let mut inst: SatInstance = SatInstance::new();
        let a = inst.new_lit();
        let b = inst.new_lit();
        inst.add_binary(!a, !b);
        inst.add_binary(!a, !b);
        inst.add_clause(clause![a, a, b]);
        assert_eq!(inst.n_clauses(), 3);
        assert_eq!(inst.cnf()[0], inst.cnf()[1]);
        assert_eq!(inst.cnf()[2].len(), 3);
    }

    #[test]
    fn cnf_collects() {
        let mut cnf = Cnf::new();
        cnf.extend([clause![lit![0]], clause![!lit![3], lit![1]]]);
        assert_eq!(cnf.n_clauses(), 2);
        assert_eq!(cnf.max_var(), Some(var![3]));
        assert!(cnf.is_sat(&Assignment::from(vec![true, true, false, false])));
        assert!(!cnf.is_sat(&Assignment::from(vec![true, false, false, true])));
        let empty: Cnf = Vec::<Clause>::new().into_iter().collect();
        assert_eq!(empty.max_var(), None);
    }
}
