//! # CNF Encodings for Cardinality Constraints
//!
//! Cardinality constraints bound the number of true literals in a sequence.
//! The encodings here are non-incremental: a bound is encoded directly as
//! hard clauses rather than enforced through assumptions.

use crate::{encodings::CollectClauses, instances::ManageVars, types::Lit};

pub mod sequentialcounters;
pub use sequentialcounters::SequentialCounters;

/// Trait for all cardinality encodings of form `sum of lits <> rhs`
pub trait Encode {
    /// Gets the number of input literals of the encoding
    fn n_lits(&self) -> usize;
}

/// Trait for cardinality encodings that allow upper bounding of the form `sum
/// of lits <= ub`
pub trait BoundUpper: Encode {
    /// Encodes the upper bound `sum of lits <= ub` as hard clauses into
    /// `collector`. `var_manager` is the variable manager to use for tracking
    /// new variables.
    fn encode_ub<Col>(&mut self, ub: usize, collector: &mut Col, var_manager: &mut dyn ManageVars)
    where
        Col: CollectClauses;

    /// Encodes an upper bound cardinality constraint over `lits` to CNF
    fn encode_ub_constr<Col, I>(
        lits: I,
        ub: usize,
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) where
        Col: CollectClauses,
        I: IntoIterator<Item = Lit>,
        Self: FromIterator<Lit> + Sized,
    {
        let mut enc = Self::from_iter(lits);
        enc.encode_ub(ub, collector, var_manager);
    }
}
