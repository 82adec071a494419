//! Learns a new clause by analyzing a conflict.
//!
//! Starting from the falsified clause, literals assigned at the current decision level are
//! resolved against their reason clauses, most recently assigned first, until a single
//! current-level literal remains. The remaining literals form the learned clause; the largest
//! level among the literals from earlier levels is the backjump target.
use partial_ref::{partial, PartialRef};

use plainsat_formula::{Lit, Var};

use crate::context::{AnalyzeConflictP, ClauseDbP, Context, ImplGraphP, TrailP};
use crate::prop::{Conflict, Reason};

/// Temporaries for conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// This is the learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Literals of the working clause assigned at the current decision level.
    curr: Vec<Lit>,
    /// Literals of the working clause assigned at earlier levels.
    prev: Vec<Lit>,
    /// Literals waiting to be partitioned into `curr` and `prev`.
    pool: Vec<Lit>,
    /// Per variable: present in `curr`.
    in_curr: Vec<bool>,
    /// Per variable: present in `prev`.
    in_prev: Vec<bool>,
    /// Per variable: already resolved on, its literals are dropped from reason clauses.
    done: Vec<bool>,
    /// Entries to clean in the per-variable flags.
    to_clean: Vec<Var>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.in_curr.resize(count, false);
        self.in_prev.resize(count, false);
        self.done.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// Returns the decision level to backtrack to, or `None` for a conflict at level 0, which means
/// the formula is unsatisfiable. The learned clause is available from
/// [`AnalyzeConflict::clause`] and is nonempty whenever a level is returned; the returned level
/// is always strictly below the current one.
pub fn analyze_conflict(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ClauseDbP, ImplGraphP, TrailP),
    conflict: Conflict,
) -> Option<usize> {
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let db = ctx.part(ClauseDbP);
    let graph = ctx.part(ImplGraphP);
    let trail = ctx.part(TrailP);

    analyze.clause.clear();

    let level = trail.current_level();
    if level == 0 {
        return None;
    }

    analyze.curr.clear();
    analyze.prev.clear();
    analyze.pool.clear();
    analyze.pool.extend_from_slice(db.lits(conflict.0));

    loop {
        // Partition the pool by assignment level.
        for pool_index in 0..analyze.pool.len() {
            let lit = analyze.pool[pool_index];
            let var = lit.var();
            if graph.level(var) == level {
                if !analyze.in_curr[var.index()] {
                    analyze.in_curr[var.index()] = true;
                    analyze.curr.push(lit);
                    analyze.to_clean.push(var);
                }
            } else if !analyze.in_prev[var.index()] {
                analyze.in_prev[var.index()] = true;
                analyze.prev.push(lit);
                analyze.to_clean.push(var);
            }
        }
        analyze.pool.clear();

        if analyze.curr.len() == 1 {
            break;
        }

        // Find the most recently assigned variable of the working clause by scanning the
        // current level's history in reverse, decision last. Matching is by variable, either
        // polarity.
        let record = trail.level_record(level);
        let last = record
            .propagated
            .iter()
            .rev()
            .map(|lit| lit.var())
            .chain(Some(record.decision))
            .find(|&var| analyze.in_curr[var.index()]);
        let last = match last {
            Some(var) => var,
            None => unreachable!("conflict has no literal at the current decision level"),
        };

        // Resolve: drop both polarities of the resolved variable from the working clause and
        // replace them by the remaining literals of its reason. A decision has no reason; the
        // remaining current-level literals are then dropped one per iteration.
        analyze.curr.retain(|lit| lit.var() != last);
        analyze.in_curr[last.index()] = false;
        analyze.done[last.index()] = true;

        if let Reason::Propagated(reason) = graph.reason(last) {
            for &lit in db.lits(reason) {
                if !analyze.done[lit.var().index()] {
                    analyze.pool.push(lit);
                }
            }
        }
    }

    analyze.clause.extend_from_slice(&analyze.curr);
    analyze.clause.extend_from_slice(&analyze.prev);
    analyze.clause.sort_unstable();

    let backjump = analyze
        .prev
        .iter()
        .map(|lit| graph.level(lit.var()))
        .max()
        .unwrap_or(level - 1);

    for var in analyze.to_clean.drain(..) {
        analyze.in_curr[var.index()] = false;
        analyze.in_prev[var.index()] = false;
        analyze.done[var.index()] = false;
    }

    Some(backjump)
}
