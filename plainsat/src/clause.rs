//! Storage of original and learned clauses.
use rustc_hash::FxHashSet;

use plainsat_formula::{Lit, LitIdx};

/// Compact reference to a clause in the [`ClauseDb`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClauseRef {
    index: LitIdx,
}

/// Store of all clauses known to the solver.
///
/// Original clauses are loaded first and are immutable for the lifetime of the solver. Learned
/// clauses are appended by conflict analysis and are never mutated or removed. Iteration order
/// is insertion order, originals before learned clauses, which keeps propagation deterministic.
///
/// Clauses are value equal as sets: literals are kept sorted and duplicate free by the loader
/// and the conflict analyzer, and a hash set over the sorted literal slices collapses repeated
/// clauses, no matter whether the copies are original or learned.
#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<Box<[Lit]>>,
    original_count: usize,
    known: FxHashSet<Box<[Lit]>>,
}

impl ClauseDb {
    /// Add an original clause to the store.
    ///
    /// The literals must be sorted and duplicate free. Returns `None` if an equal clause is
    /// already present.
    pub fn add_original(&mut self, lits: &[Lit]) -> Option<ClauseRef> {
        debug_assert_eq!(
            self.original_count,
            self.clauses.len(),
            "original clauses must be loaded before any clause is learned"
        );
        let cref = self.add(lits)?;
        self.original_count += 1;
        Some(cref)
    }

    /// Add a learned clause to the store.
    ///
    /// The literals must be sorted and duplicate free. Returns `None` if an equal clause is
    /// already present.
    pub fn add_learned(&mut self, lits: &[Lit]) -> Option<ClauseRef> {
        self.add(lits)
    }

    fn add(&mut self, lits: &[Lit]) -> Option<ClauseRef> {
        debug_assert!(!lits.is_empty());
        if !self.known.insert(lits.into()) {
            return None;
        }
        let cref = ClauseRef {
            index: self.clauses.len() as LitIdx,
        };
        self.clauses.push(lits.into());
        Some(cref)
    }

    /// The literals of a clause.
    pub fn lits(&self, cref: ClauseRef) -> &[Lit] {
        &self.clauses[cref.index as usize]
    }

    /// References to all clauses, originals before learned clauses, in insertion order.
    pub fn refs(&self) -> impl Iterator<Item = ClauseRef> {
        (0..self.clauses.len() as LitIdx).map(|index| ClauseRef { index })
    }

    /// References to the learned clauses in insertion order.
    pub fn learned_refs(&self) -> impl Iterator<Item = ClauseRef> {
        (self.original_count as LitIdx..self.clauses.len() as LitIdx)
            .map(|index| ClauseRef { index })
    }

    /// Number of original clauses.
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// Number of learned clauses.
    pub fn learned_count(&self) -> usize {
        self.clauses.len() - self.original_count
    }
}
