//! # SAT Encoding of Set Packing
//!
//! Every set gets an indicator variable that is true iff the set is part of
//! the packing. Two sets sharing an element may not both be chosen, and if a
//! minimum packing size `k` is required, at most `m - k` indicators may be
//! false. The latter is encoded with [`SequentialCounters`] over the negated
//! indicators.

use itertools::Itertools;

use crate::{
    encodings::{
        atomics,
        card::{BoundUpper, SequentialCounters},
        EncodeStats,
    },
    instances::SatInstance,
    types::{RsHashMap, RsHashSet, Var},
};

use super::SetPacking;

/// Maps 1-based set indices to their indicator variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorMap {
    vars: Vec<Var>,
}

impl IndicatorMap {
    /// Gets the indicator of the set with the given 1-based index
    #[must_use]
    pub fn get(&self, set: usize) -> Option<Var> {
        set.checked_sub(1).and_then(|idx| self.vars.get(idx)).copied()
    }

    /// Gets the number of sets
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Checks if there are no sets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates over pairs of 1-based set indices and indicators
    pub fn iter(&self) -> impl Iterator<Item = (usize, Var)> + '_ {
        self.vars.iter().enumerate().map(|(idx, &var)| (idx + 1, var))
    }
}

/// A set packing instance encoded to CNF
#[derive(Debug, Clone)]
pub struct Encoding {
    instance: SatInstance,
    indicators: IndicatorMap,
    n_conflicts: usize,
}

impl Encoding {
    /// Encodes a set packing instance. The indicator of set `i` is the
    /// variable with DIMACS index `i`.
    #[must_use]
    pub fn new(inst: &SetPacking) -> Self {
        let mut instance: SatInstance = SatInstance::new();
        let indicators = IndicatorMap {
            vars: (0..inst.n_sets()).map(|_| instance.new_var()).collect(),
        };

        // element -> sets containing it, in ascending set order
        let mut containing: RsHashMap<u32, Vec<usize>> = RsHashMap::default();
        for (set, elements) in inst.sets().iter().enumerate() {
            for &elem in elements {
                containing.entry(elem).or_default().push(set);
            }
        }

        let mut seen = RsHashSet::default();
        let mut n_conflicts = 0;
        for (_, sets) in containing.iter().sorted_unstable_by_key(|&(&elem, _)| elem) {
            for (&a, &b) in sets.iter().tuple_combinations() {
                if !seen.insert((a, b)) {
                    continue;
                }
                instance.add_clause(atomics::not_both(
                    indicators.vars[a].pos_lit(),
                    indicators.vars[b].pos_lit(),
                ));
                n_conflicts += 1;
            }
        }
        log::debug!("encoded {n_conflicts} conflicting set pairs");

        if inst.min_size() > 0 {
            let at_most = inst.n_sets() - inst.min_size();
            let mut card: SequentialCounters =
                indicators.vars.iter().map(|var| var.neg_lit()).collect();
            let (cnf, var_manager) = instance.split_mut();
            card.encode_ub(at_most, cnf, var_manager);
            log::debug!(
                "encoded at most {at_most} of {} sets unused with {} vars and {} clauses",
                inst.n_sets(),
                card.n_vars(),
                card.n_clauses()
            );
        }

        Encoding {
            instance,
            indicators,
            n_conflicts,
        }
    }

    /// Gets the encoded CNF instance
    #[must_use]
    pub fn instance(&self) -> &SatInstance {
        &self.instance
    }

    /// Gets the indicator variables of the sets
    #[must_use]
    pub fn indicators(&self) -> &IndicatorMap {
        &self.indicators
    }

    /// Gets the number of conflict clauses between sets
    #[must_use]
    pub fn n_conflicts(&self) -> usize {
        self.n_conflicts
    }
}
