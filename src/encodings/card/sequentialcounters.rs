//! # Sequential Counters Encoding
//!
//! Encodes `sum of lits <= ub` with `n * ub` auxiliary counter variables and
//! `O(n * ub)` clauses. The counter variable `s(i, j)` is forced to true if at
//! least `j + 1` of the first `i + 1` input literals are true.
//!
//! ## References
//!
//! - Carsten Sinz: _Towards an Optimal CNF Encoding of Boolean Cardinality Constraints_, CP 2005.

use crate::{
    clause,
    encodings::{atomics, CollectClauses, EncodeStats},
    instances::ManageVars,
    types::Lit,
};

use super::{BoundUpper, Encode};

/// Implementation of the sequential counters encoding
///
/// # Example
///
/// ```
/// use setpack::{
///     encodings::card::{BoundUpper, SequentialCounters},
///     instances::{BasicVarManager, Cnf, ManageVars},
/// };
///
/// let mut vm = BasicVarManager::default();
/// let lits: Vec<_> = (0..4).map(|_| vm.new_lit()).collect();
/// let mut cnf = Cnf::new();
/// let mut enc = SequentialCounters::from(lits);
/// enc.encode_ub(2, &mut cnf, &mut vm);
/// assert_eq!(vm.n_used(), 4 + 4 * 2);
/// ```
///
/// # References
///
/// - Carsten Sinz: _Towards an Optimal CNF Encoding of Boolean Cardinality Constraints_, CP 2005.
#[derive(Default, Debug, Clone)]
pub struct SequentialCounters {
    /// Input literals to the encoding
    in_lits: Vec<Lit>,
    /// The counter variables, `ub` per input literal
    s_lits: Vec<Lit>,
    /// The encoded upper bound
    ub: usize,
    /// The number of variables in the encoding
    n_vars: u32,
    /// The number of clauses in the encoding
    n_clauses: usize,
}

impl SequentialCounters {
    #[must_use]
    fn s_lit(&self, i: usize, j: usize) -> Lit {
        debug_assert!(i < self.in_lits.len());
        debug_assert!(j < self.ub);
        self.s_lits[i * self.ub + j]
    }

    /// Gets the literal meaning "at least `j + 1` of the first `i + 1` inputs
    /// are true", if the counter has been built
    #[must_use]
    pub fn counter_lit(&self, i: usize, j: usize) -> Option<Lit> {
        if i >= self.in_lits.len() || j >= self.ub || self.s_lits.is_empty() {
            return None;
        }
        Some(self.s_lit(i, j))
    }
}

impl Encode for SequentialCounters {
    fn n_lits(&self) -> usize {
        self.in_lits.len()
    }
}

impl BoundUpper for SequentialCounters {
    fn encode_ub<Col>(&mut self, ub: usize, collector: &mut Col, var_manager: &mut dyn ManageVars)
    where
        Col: CollectClauses,
    {
        let n = self.in_lits.len();
        // counters of an earlier bound do not describe this one
        self.ub = 0;
        self.s_lits.clear();
        if n == 0 || ub >= n {
            log::trace!("upper bound {ub} over {n} literals is trivially satisfied");
            return;
        }
        let n_clauses_before = collector.n_clauses();

        if ub == 0 {
            // no literal may be true; there are no counters to build
            collector.extend(self.in_lits.iter().map(|&l| clause![!l]));
            self.n_clauses += collector.n_clauses() - n_clauses_before;
            return;
        }

        self.ub = ub;
        self.s_lits = (0..n * ub).map(|_| var_manager.new_lit()).collect();
        self.n_vars += u32::try_from(n * ub).expect("more counter variables than fit in u32");

        let s_lit = |i: usize, j: usize| self.s_lit(i, j);
        let in_lits = &self.in_lits;

        // x_i -> s(i, 0)
        collector.extend((0..n).map(|i| atomics::lit_impl_lit(in_lits[i], s_lit(i, 0))));
        // s(i-1, j) -> s(i, j)
        collector.extend((1..n).flat_map(|i| {
            (0..ub).map(move |j| atomics::lit_impl_lit(s_lit(i - 1, j), s_lit(i, j)))
        }));
        // x_i & s(i-1, j-1) -> s(i, j)
        collector.extend((1..n).flat_map(|i| {
            (1..ub).map(move |j| {
                atomics::cube_impl_lit(&[in_lits[i], s_lit(i - 1, j - 1)], s_lit(i, j))
            })
        }));
        // x_i -> !s(i-1, ub-1)
        collector.extend((1..n).map(|i| atomics::not_both(in_lits[i], s_lit(i - 1, ub - 1))));

        self.n_clauses += collector.n_clauses() - n_clauses_before;
        log::trace!(
            "sequential counter for {n} literals with bound {ub}: {} vars, {} clauses",
            self.n_vars,
            self.n_clauses
        );
    }
}

impl EncodeStats for SequentialCounters {
    fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    fn n_vars(&self) -> u32 {
        self.n_vars
    }
}

impl From<Vec<Lit>> for SequentialCounters {
    fn from(lits: Vec<Lit>) -> Self {
        Self {
            in_lits: lits,
            ..Default::default()
        }
    }
}

impl FromIterator<Lit> for SequentialCounters {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        Self::from(Vec::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::SequentialCounters;
    use crate::{
        clause,
        encodings::{
            card::{BoundUpper, Encode},
            EncodeStats,
        },
        instances::{BasicVarManager, Cnf, ManageVars},
        lit,
        types::Lit,
        var,
    };

    fn setup(n: u32) -> (Vec<Lit>, BasicVarManager) {
        let lits = (0..n).map(|idx| lit![idx]).collect();
        (lits, BasicVarManager::from_next_free(var![n]))
    }

    #[test]
    fn vacuous_bound_adds_nothing() {
        for n in 0..6 {
            for ub in n..n + 3 {
                let (lits, mut vm) = setup(n);
                let mut cnf = Cnf::new();
                let mut enc = SequentialCounters::from(lits);
                enc.encode_ub(ub as usize, &mut cnf, &mut vm);
                assert!(cnf.is_empty());
                assert_eq!(vm.n_used(), n);
                assert_eq!(enc.n_clauses(), 0);
                assert_eq!(enc.n_vars(), 0);
            }
        }
    }

    #[test]
    fn zero_bound_forbids_all() {
        let (lits, mut vm) = setup(3);
        let mut cnf = Cnf::new();
        let mut enc = SequentialCounters::from(lits);
        enc.encode_ub(0, &mut cnf, &mut vm);
        assert_eq!(vm.n_used(), 3);
        assert_eq!(enc.n_lits(), 3);
        assert_eq!(cnf.len(), 3);
        assert_eq!(cnf[0], clause![!lit![0]]);
        assert_eq!(cnf[1], clause![!lit![1]]);
        assert_eq!(cnf[2], clause![!lit![2]]);
        assert_eq!(enc.counter_lit(0, 0), None);
    }

    #[test]
    fn reencoding_drops_old_counters() {
        let (lits, mut vm) = setup(3);
        let mut cnf = Cnf::new();
        let mut enc = SequentialCounters::from(lits);
        enc.encode_ub(1, &mut cnf, &mut vm);
        assert!(enc.counter_lit(0, 0).is_some());
        enc.encode_ub(0, &mut cnf, &mut vm);
        assert_eq!(enc.counter_lit(0, 0), None);
        enc.encode_ub(2, &mut cnf, &mut vm);
        assert!(enc.counter_lit(2, 1).is_some());
        enc.encode_ub(3, &mut cnf, &mut vm);
        assert_eq!(enc.counter_lit(0, 0), None);
    }

    #[test]
    fn sizes() {
        for n in 2..8usize {
            for ub in 1..n {
                let (lits, mut vm) = setup(u32::try_from(n).unwrap());
                let mut cnf = Cnf::new();
                let mut enc = SequentialCounters::from(lits);
                enc.encode_ub(ub, &mut cnf, &mut vm);
                let expected = n + (n - 1) * ub + (n - 1) * (ub - 1) + (n - 1);
                assert_eq!(cnf.len(), expected);
                assert_eq!(enc.n_clauses(), expected);
                assert_eq!(enc.n_vars() as usize, n * ub);
                assert_eq!(vm.n_used() as usize, n + n * ub);
            }
        }
    }

    #[test]
    fn clause_layout() {
        let (lits, mut vm) = setup(3);
        let mut cnf = Cnf::new();
        let mut enc = SequentialCounters::from(lits);
        enc.encode_ub(1, &mut cnf, &mut vm);
        // counters are allocated directly after the inputs
        let s = |i: usize| enc.counter_lit(i, 0).unwrap();
        assert_eq!(s(0), lit![3]);
        assert_eq!(s(2), lit![5]);
        let expected = vec![
            clause![!lit![0], s(0)],
            clause![!lit![1], s(1)],
            clause![!lit![2], s(2)],
            clause![!s(0), s(1)],
            clause![!s(1), s(2)],
            clause![!lit![1], !s(0)],
            clause![!lit![2], !s(1)],
        ];
        assert_eq!(cnf.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn encode_ub_constr() {
        let mut vm = BasicVarManager::from_next_free(var![4]);
        let mut cnf = Cnf::new();
        SequentialCounters::encode_ub_constr(
            vec![lit![0], lit![1], lit![2], lit![3]],
            2,
            &mut cnf,
            &mut vm,
        );
        assert_eq!(cnf.len(), 4 + 3 * 2 + 3 + 3);
    }
}
