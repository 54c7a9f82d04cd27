//! # Encodings of Constraints to CNF
//!
//! Building blocks for translating combinatorial constraints into clauses.
//! Encodings push their clauses into a [`CollectClauses`] implementor and take
//! fresh auxiliary variables from a [`crate::instances::ManageVars`]
//! implementor.

pub mod atomics;
pub mod card;

/// Trait for collecting clauses. Mainly used when generating encodings and implemented by
/// [`crate::instances::Cnf`].
pub trait CollectClauses: Extend<crate::types::Clause> {
    /// Gets the number of clauses in the collection
    fn n_clauses(&self) -> usize;
}

/// Trait for encodings that track statistics.
pub trait EncodeStats {
    /// Gets the number of clauses in the encoding
    fn n_clauses(&self) -> usize;

    /// Gets the number of variables in the encoding
    fn n_vars(&self) -> u32;
}
