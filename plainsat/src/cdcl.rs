//! Conflict driven clause learning.
use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseDbP, Context, DlisP, ImplGraphP, SolverStateP, TrailP,
    VariablesP,
};
use crate::decision::make_decision;
use crate::prop::{backtrack, propagate};
use crate::state::SatState;
use crate::variables::have_unassigned;

/// Perform one iteration of the CDCL main loop.
///
/// Either propagates to a fixpoint and makes a decision, or resolves a conflict by learning a
/// clause and backtracking. Termination is recorded in the solver state: `Sat` once every
/// variable of the formula is assigned without a conflict, `Unsat` on a conflict at level 0.
pub fn search_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseDbP,
        mut DlisP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TrailP,
        VariablesP,
    ),
) {
    if !have_unassigned(ctx.borrow()) {
        ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
        return;
    }

    match propagate(ctx.borrow()) {
        Err(conflict) => {
            let backjump = match analyze_conflict(ctx.borrow(), conflict) {
                None => {
                    ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
                    return;
                }
                Some(level) => level,
            };

            let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);

            // The learned clause becomes unit after backtracking; the next propagation sweep
            // applies it.
            let _ = ctx.part_mut(ClauseDbP).add_learned(analyze.clause());

            backtrack(ctx.borrow(), backjump);
        }
        Ok(()) => {
            // A propagation sweep may complete the assignment without a conflict, hence the
            // second check.
            if !have_unassigned(ctx.borrow()) {
                ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            } else {
                let made_decision = make_decision(ctx.borrow());
                debug_assert!(made_decision);
            }
        }
    }
}
