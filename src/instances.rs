//! # Formula Representations
//!
//! The formula builder used by the encodings: variable managers handing out
//! fresh variables, the plain clause container [`Cnf`] and the combination of
//! both in [`SatInstance`].

use crate::types::{Lit, Var};

pub mod fio;

mod sat;
pub use sat::{Cnf, SatInstance};

/// Trait for variable managers keeping track of used variables
pub trait ManageVars {
    /// Uses up the next free variable
    fn new_var(&mut self) -> Var;

    /// Uses up the next free variable and returns its positive literal
    fn new_lit(&mut self) -> Lit {
        self.new_var().pos_lit()
    }

    /// Gets the highest variable handed out so far
    fn max_var(&self) -> Option<Var>;

    /// Increases the next free variable index if the provided variable has a
    /// higher index than the next variable in the manager.
    /// Returns true if the next free index has been increased and false otherwise.
    fn increase_next_free(&mut self, v: Var) -> bool;

    /// Gets the number of used variables. Typically this is just the index of
    /// the next free variable.
    fn n_used(&self) -> u32;
}

/// Simple counter variable manager
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BasicVarManager {
    next_var: Var,
}

impl BasicVarManager {
    /// Creates a new variable manager from a next free variable
    #[must_use]
    pub fn from_next_free(next_var: Var) -> BasicVarManager {
        BasicVarManager { next_var }
    }
}

impl Default for BasicVarManager {
    fn default() -> Self {
        Self {
            next_var: Var::new(0),
        }
    }
}

impl ManageVars for BasicVarManager {
    fn new_var(&mut self) -> Var {
        let v = self.next_var;
        self.next_var += 1;
        v
    }

    fn max_var(&self) -> Option<Var> {
        if self.next_var == Var::new(0) {
            None
        } else {
            Some(self.next_var - 1)
        }
    }

    fn increase_next_free(&mut self, v: Var) -> bool {
        if v > self.next_var {
            self.next_var = v;
            return true;
        };
        false
    }

    fn n_used(&self) -> u32 {
        self.next_var.idx32()
    }
}
