//! # Decoding Models to Packings

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::types::{Assignment, RsHashMap};

use super::{encoding::IndicatorMap, SetPacking};

/// A selection of sets, identified by their 1-based indices in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    sets: Vec<usize>,
}

/// Errors for selections that are not valid packings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Two chosen sets share an element
    #[error("sets {a} and {b} share element {element}")]
    Overlap {
        /// The chosen set with the lower index
        a: usize,
        /// The chosen set with the higher index
        b: usize,
        /// The shared element
        element: u32,
    },
    /// Fewer sets were chosen than required
    #[error("packing has size {size}, but at least {min} sets are required")]
    TooSmall {
        /// The number of chosen sets
        size: usize,
        /// The minimum packing size
        min: usize,
    },
    /// A chosen set does not exist in the instance
    #[error("set {0} does not exist")]
    UnknownSet(usize),
}

impl Selection {
    /// Selects every set whose indicator is assigned true. Indicators missing
    /// from the assignment count as false.
    #[must_use]
    pub fn decode(assign: &Assignment, indicators: &IndicatorMap) -> Self {
        let sets = indicators
            .iter()
            .filter(|&(_, var)| assign.var_value(var).to_bool_with_def(false))
            .map(|(set, _)| set)
            .collect();
        Selection { sets }
    }

    /// Gets the chosen set indices
    #[must_use]
    pub fn sets(&self) -> &[usize] {
        &self.sets
    }

    /// Gets the number of chosen sets
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Checks if no set is chosen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Checks that the chosen sets are pairwise disjoint and at least as many
    /// as the instance requires
    ///
    /// # Errors
    ///
    /// The first violation found, see [`VerifyError`]
    pub fn verify(&self, inst: &SetPacking) -> Result<(), VerifyError> {
        // element -> chosen set covering it
        let mut owner: RsHashMap<u32, usize> = RsHashMap::default();
        for &set in &self.sets {
            let elements = inst.set(set).ok_or(VerifyError::UnknownSet(set))?;
            for &element in elements {
                if let Some(&a) = owner.get(&element) {
                    return Err(VerifyError::Overlap { a, b: set, element });
                }
                owner.insert(element, set);
            }
        }
        if self.sets.len() < inst.min_size() {
            return Err(VerifyError::TooSmall {
                size: self.sets.len(),
                min: inst.min_size(),
            });
        }
        Ok(())
    }

    /// Gets a displayable summary of the chosen sets and their elements
    #[must_use]
    pub fn summary<'a>(&'a self, inst: &'a SetPacking) -> Summary<'a> {
        Summary { sel: self, inst }
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Selection {
            sets: iter.into_iter().sorted_unstable().dedup().collect(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.sets.iter().format(", "))
    }
}

/// Console summary of a [`Selection`]
///
/// ```text
/// Chosen sets: [1, 2]
/// Packing size: 2
/// S1: [1, 2]
/// S2: [3, 4]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    sel: &'a Selection,
    inst: &'a SetPacking,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chosen sets: {}", self.sel)?;
        write!(f, "Packing size: {}", self.sel.len())?;
        for &set in &self.sel.sets {
            let elements = self.inst.set(set).unwrap_or_default();
            write!(f, "\nS{set}: [{}]", elements.iter().format(", "))?;
        }
        Ok(())
    }
}
