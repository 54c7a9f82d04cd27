//! # setpack - Set Packing via SAT
//!
//! `setpack` reduces instances of the set packing problem to boolean
//! satisfiability. An instance is encoded into CNF with one indicator variable
//! per set, pairwise conflict clauses for sets sharing an element and a
//! sequential counter encoding for the minimum packing size. The formula is
//! written in DIMACS format, handed to an external SAT solver and the returned
//! model is decoded back into a selection of sets.
//!
//! ## Example
//!
//! ```
//! use setpack::packing::{encoding::Encoding, SetPacking};
//!
//! let inst = SetPacking::new(5, vec![vec![1, 2], vec![3, 4], vec![1, 3], vec![5]], 2).unwrap();
//! let enc = Encoding::new(&inst);
//! assert_eq!(enc.indicators().len(), 4);
//! assert!(enc.instance().n_clauses() > 0);
//! ```
//!
//! ## Crate Features
//!
//! - `fxhash`: use the faster firefox hash function from `rustc-hash`.
//!   _This feature is enabled by default._
//! - `compression`: read and write `.gz`, `.bz2` and `.xz` compressed files.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encodings;
pub mod instances;
pub mod packing;
pub mod solvers;
pub mod types;
