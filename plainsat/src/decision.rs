//! Decision heuristic.
//!
//! Branching uses a dynamic largest individual sum (DLIS) style count: for every unassigned
//! variable, count how often each polarity occurs in the still unresolved clauses and branch on
//! the polarity/variable pair with the largest count.
use partial_ref::{partial, PartialRef};

use plainsat_formula::{Lit, Var};

use crate::clause::ClauseDb;
use crate::context::{
    AssignmentP, ClauseDbP, Context, DlisP, ImplGraphP, TrailP, VariablesP,
};
use crate::prop::sweep::{classify_clause, ClauseStatus};
use crate::prop::{enqueue_assignment, Assignment, Reason};
use crate::variables::Variables;

/// Occurrence counters for the DLIS decision heuristic.
#[derive(Default)]
pub struct Dlis {
    /// Positive occurrences per variable, only valid for unassigned variables.
    pos: Vec<usize>,
    /// Negative occurrences per variable, only valid for unassigned variables.
    neg: Vec<usize>,
}

impl Dlis {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.pos.resize(count, 0);
        self.neg.resize(count, 0);
    }

    /// Pick the literal to branch on.
    ///
    /// Counts, over all unresolved clauses, the occurrences of both polarities of every
    /// unassigned variable. The polarity with the larger maximum wins, ties between variables go
    /// to the lower index and a tie between the polarities picks the negative branch. Returns
    /// `None` if every variable of the formula is assigned.
    fn pick(
        &mut self,
        assignment: &Assignment,
        clause_db: &ClauseDb,
        variables: &Variables,
    ) -> Option<Lit> {
        for count in self.pos.iter_mut() {
            *count = 0;
        }
        for count in self.neg.iter_mut() {
            *count = 0;
        }

        for cref in clause_db.refs() {
            let lits = clause_db.lits(cref);
            if classify_clause(lits, assignment) != ClauseStatus::Unresolved {
                continue;
            }
            for &lit in lits {
                if assignment.var_value(lit.var()).is_some() {
                    continue;
                }
                if lit.is_positive() {
                    self.pos[lit.index()] += 1;
                } else {
                    self.neg[lit.index()] += 1;
                }
            }
        }

        let mut best_pos: Option<(Var, usize)> = None;
        let mut best_neg: Option<(Var, usize)> = None;

        for var in variables.iter() {
            if assignment.var_value(var).is_some() {
                continue;
            }
            if best_pos.map_or(true, |(_, count)| self.pos[var.index()] > count) {
                best_pos = Some((var, self.pos[var.index()]));
            }
            if best_neg.map_or(true, |(_, count)| self.neg[var.index()] > count) {
                best_neg = Some((var, self.neg[var.index()]));
            }
        }

        let (pos_var, pos_count) = best_pos?;
        let (neg_var, neg_count) = best_neg?;

        if pos_count > neg_count {
            Some(pos_var.lit(true))
        } else {
            Some(neg_var.lit(false))
        }
    }
}

/// Make a decision and enqueue it.
///
/// Opens a new decision level. Returns `false` if no decision was made because all variables of
/// the formula are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut DlisP,
        mut ImplGraphP,
        mut TrailP,
        ClauseDbP,
        VariablesP,
    ),
) -> bool {
    let (dlis, mut ctx) = ctx.split_part_mut(DlisP);

    let decision = dlis.pick(
        ctx.part(AssignmentP),
        ctx.part(ClauseDbP),
        ctx.part(VariablesP),
    );

    match decision {
        Some(lit) => {
            ctx.part_mut(TrailP).new_decision_level(lit.var());
            enqueue_assignment(ctx.borrow(), lit, Reason::Decision);
            true
        }
        None => false,
    }
}
