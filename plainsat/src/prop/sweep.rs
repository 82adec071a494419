//! Fixpoint Boolean constraint propagation.
//!
//! The propagator repeatedly sweeps over all stored clauses, originals and learned alike, in
//! insertion order. Each sweep either finds a falsified clause, collects the unit clauses it
//! encounters and applies them, or detects that a fixpoint is reached.
use partial_ref::{partial, PartialRef};

use rustc_hash::FxHashSet;

use plainsat_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{AssignmentP, ClauseDbP, Context, ImplGraphP, TrailP};

use super::{enqueue_assignment, Assignment, Reason};

/// Status of a clause under a partial assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ClauseStatus {
    /// Some literal is true.
    Satisfied,
    /// Every literal is false.
    Falsified,
    /// Exactly one literal is unassigned, all others are false.
    Unit(Lit),
    /// No literal is true and at least two are unassigned.
    Unresolved,
}

/// Classify a clause under the current assignment.
pub fn classify_clause(lits: &[Lit], assignment: &Assignment) -> ClauseStatus {
    let mut unit_lit = None;
    let mut unassigned_count = 0;

    for &lit in lits {
        match assignment.lit_value(lit) {
            Some(true) => return ClauseStatus::Satisfied,
            Some(false) => (),
            None => {
                unit_lit = Some(lit);
                unassigned_count += 1;
            }
        }
    }

    match (unit_lit, unassigned_count) {
        (None, _) => ClauseStatus::Falsified,
        (Some(lit), 1) => ClauseStatus::Unit(lit),
        _ => ClauseStatus::Unresolved,
    }
}

/// A clause that was found falsified during propagation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict(pub ClauseRef);

/// Propagate unit clauses to fixpoint or find a falsified clause.
///
/// Each sweep first collects all `(unit literal, clause)` pairs of the current assignment,
/// deduplicated, then applies them in collection order at the current decision level. A pair
/// whose variable got assigned by an earlier pair of the same sweep is a no-op; when the earlier
/// assignment has the opposite polarity, the next sweep returns one of the two clauses as
/// falsified.
pub fn propagate(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, ClauseDbP),
) -> Result<(), Conflict> {
    let mut pairs: Vec<(Lit, ClauseRef)> = vec![];
    let mut seen: FxHashSet<(Lit, ClauseRef)> = FxHashSet::default();

    loop {
        pairs.clear();
        seen.clear();

        {
            let db = ctx.part(ClauseDbP);
            let assignment = ctx.part(AssignmentP);

            for cref in db.refs() {
                match classify_clause(db.lits(cref), assignment) {
                    ClauseStatus::Satisfied | ClauseStatus::Unresolved => (),
                    ClauseStatus::Falsified => return Err(Conflict(cref)),
                    ClauseStatus::Unit(lit) => {
                        if seen.insert((lit, cref)) {
                            pairs.push((lit, cref));
                        }
                    }
                }
            }
        }

        if pairs.is_empty() {
            return Ok(());
        }

        for &(lit, cref) in pairs.iter() {
            if ctx.part(AssignmentP).lit_value(lit).is_some() {
                continue;
            }
            enqueue_assignment(ctx.borrow(), lit, Reason::Propagated(cref));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use proptest::prelude::*;

    use plainsat_formula::{cnf::strategy::*, lits, var, CnfFormula, Var};

    use crate::context::{set_var_count, DlisP, TmpDataP, VariablesP};
    use crate::decision::make_decision;
    use crate::load::load_clause;
    use crate::variables::have_unassigned;

    fn load_formula(
        mut ctx: partial!(Context, mut ClauseDbP, mut TmpDataP, mut VariablesP),
        formula: &CnfFormula,
    ) {
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    #[test]
    fn unit_chain_is_forced_at_level_0() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        load_clause(ctx.borrow(), &lits![1]);
        load_clause(ctx.borrow(), &lits![-2, 3]);
        load_clause(ctx.borrow(), &lits![2]);

        assert!(propagate(ctx.borrow()).is_ok());

        assert_eq!(ctx.part(AssignmentP).var_value(var!(1)), Some(true));
        assert_eq!(ctx.part(AssignmentP).var_value(var!(2)), Some(true));
        assert_eq!(ctx.part(AssignmentP).var_value(var!(3)), Some(true));

        // forced assignments at level 0 carry their unit clause as reason
        match ctx.part(ImplGraphP).reason(var!(3)) {
            Reason::Propagated(cref) => {
                assert_eq!(ctx.part(ClauseDbP).lits(cref), &lits![-2, 3][..])
            }
            Reason::Decision => panic!("variable 3 was propagated, not decided"),
        }
    }

    #[test]
    fn contradicting_units_are_a_conflict() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 1);

        load_clause(ctx.borrow(), &lits![1]);
        load_clause(ctx.borrow(), &lits![-1]);

        let conflict = propagate(ctx.borrow()).unwrap_err();
        let conflict_lits = ctx.part(ClauseDbP).lits(conflict.0);
        assert!(conflict_lits == &lits![1][..] || conflict_lits == &lits![-1][..]);
    }

    #[test]
    fn tautologies_never_become_unit() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        load_clause(ctx.borrow(), &lits![1, -1, 2]);
        load_clause(ctx.borrow(), &lits![-2]);

        assert!(propagate(ctx.borrow()).is_ok());

        assert_eq!(ctx.part(AssignmentP).var_value(var!(2)), Some(false));
        // the tautology must not have forced its remaining variable
        assert_eq!(ctx.part(AssignmentP).var_value(var!(1)), None);
    }

    /// Drive decisions and propagation to a fixpoint or conflict, checking the implication
    /// graph invariant at every fixpoint: all literals of a reason clause other than the forced
    /// one are false at a level not above the forced variable's level.
    fn check_graph_integrity(
        mut ctx: partial!(
            Context,
            mut AssignmentP,
            mut DlisP,
            mut ImplGraphP,
            mut TrailP,
            ClauseDbP,
            VariablesP,
        ),
    ) {
        loop {
            if propagate(ctx.borrow()).is_err() {
                return;
            }

            let assignment = ctx.part(AssignmentP);
            let graph = ctx.part(ImplGraphP);
            let db = ctx.part(ClauseDbP);

            for index in 0..assignment.assignment().len() {
                let var = Var::from_index(index);
                if assignment.var_value(var).is_none() {
                    continue;
                }
                if let Reason::Propagated(cref) = graph.reason(var) {
                    let forced_level = graph.level(var);
                    for &lit in db.lits(cref) {
                        if lit.var() == var {
                            assert!(assignment.lit_is_true(lit));
                        } else {
                            assert_eq!(assignment.lit_value(lit), Some(false));
                            assert!(graph.level(lit.var()) <= forced_level);
                        }
                    }
                }
            }

            if !have_unassigned(ctx.borrow()) {
                return;
            }
            make_decision(ctx.borrow());
        }
    }

    proptest! {
        #[test]
        fn implication_graph_integrity(formula in cnf_formula(1..15usize, 1..60, 1..6)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());
            load_formula(ctx.borrow(), &formula);

            check_graph_integrity(ctx.borrow());
        }

        #[test]
        fn propagation_is_idempotent(formula in cnf_formula(1..15usize, 1..60, 1..6)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());
            load_formula(ctx.borrow(), &formula);

            if propagate(ctx.borrow()).is_ok() {
                let snapshot = ctx.part(AssignmentP).assignment().to_vec();
                let level = ctx.part(TrailP).current_level();

                prop_assert!(propagate(ctx.borrow()).is_ok());

                prop_assert_eq!(ctx.part(AssignmentP).assignment(), &snapshot[..]);
                prop_assert_eq!(ctx.part(TrailP).current_level(), level);
            }
        }
    }
}
