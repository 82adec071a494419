//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use plainsat_formula::Lit;

use crate::context::{ClauseDbP, Context, TmpDataP, VariablesP};

/// Adds a clause to the current formula.
///
/// Sorts the literals and removes duplicates, so that equal clauses collapse to one copy in the
/// store. Tautological clauses are kept: they can never become unit or falsified and are
/// harmless. Unit clauses are stored like any other clause; the first propagation sweep applies
/// them at level 0.
///
/// The clause must be nonempty (empty clauses are rejected by the input parser). Does not adjust
/// the solver's variable count. If necessary that has to be done before calling this.
pub fn load_clause(
    mut ctx: partial!(Context, mut ClauseDbP, mut TmpDataP, mut VariablesP),
    lits: &[Lit],
) {
    debug_assert!(!lits.is_empty());

    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp.lits.clear();
    tmp.lits.extend_from_slice(lits);
    tmp.lits.sort_unstable();
    tmp.lits.dedup();

    let variables = ctx.part_mut(VariablesP);
    for &lit in tmp.lits.iter() {
        variables.mark_in_formula(lit.var());
    }

    let _ = ctx.part_mut(ClauseDbP).add_original(&tmp.lits);
}
