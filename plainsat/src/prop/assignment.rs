//! Partial assignment, per-level history and backtracking.
use partial_ref::{partial, PartialRef};

use plainsat_formula::{Lit, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP};

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = Some(lit.is_positive())
    }

    pub fn clear_var(&mut self, var: Var) {
        self.assignment[var.index()] = None
    }
}

/// History of one decision level.
pub struct LevelRecord {
    /// The variable picked by the decision heuristic when opening the level.
    pub decision: Var,
    /// Literals propagated at this level, in the order they were forced.
    pub propagated: Vec<Lit>,
}

/// Decision and propagation history, indexed by decision level.
///
/// Level `lvl >= 1` is stored at index `lvl - 1`; level 0 has no decision and its propagations
/// are not recorded. Backtracking truncates this history.
#[derive(Default)]
pub struct Trail {
    levels: Vec<LevelRecord>,
}

impl Trail {
    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.levels.len()
    }

    /// Open a new decision level for the given decision variable.
    ///
    /// Does not assign the decision itself.
    pub fn new_decision_level(&mut self, decision: Var) {
        self.levels.push(LevelRecord {
            decision,
            propagated: vec![],
        });
    }

    /// Append a propagated literal to the current level's history.
    ///
    /// Must not be called at level 0.
    pub fn record_propagation(&mut self, lit: Lit) {
        match self.levels.last_mut() {
            Some(record) => record.propagated.push(lit),
            None => unreachable!("propagation recorded at level 0"),
        }
    }

    /// The history record of a level `>= 1`.
    pub fn level_record(&self, level: usize) -> &LevelRecord {
        &self.levels[level - 1]
    }

    fn truncate(&mut self, level: usize) {
        self.levels.truncate(level);
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment, the implication graph and the per-level history. The literal has
/// to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let level = trail.current_level();

    ctx.part_mut(ImplGraphP).set_node(lit.var(), reason, level);

    if let Reason::Propagated(_) = reason {
        if level > 0 {
            trail.record_propagation(lit);
        }
    }
}

/// Undo all assignments in decision levels deeper than the given level.
pub fn backtrack(
    mut ctx: partial!(Context, mut AssignmentP, mut TrailP, ImplGraphP),
    level: usize,
) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    if level >= trail.current_level() {
        return;
    }

    let (assignment, ctx) = ctx.split_part_mut(AssignmentP);
    let graph = ctx.part(ImplGraphP);

    for index in 0..assignment.assignment().len() {
        let var = Var::from_index(index);
        if assignment.var_value(var).is_some() && graph.level(var) > level {
            assignment.clear_var(var);
        }
    }

    trail.truncate(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use plainsat_formula::{lit, lits, var};

    use crate::context::set_var_count;
    use crate::load::load_clause;
    use crate::prop::propagate;

    #[test]
    fn backtracking_clears_deeper_levels_only() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 6);

        load_clause(ctx.borrow(), &lits![1]);
        load_clause(ctx.borrow(), &lits![-2, 3]);
        load_clause(ctx.borrow(), &lits![-4, 5]);

        // level 0: the unit clause forces 1
        propagate(ctx.borrow()).unwrap();

        ctx.part_mut(TrailP).new_decision_level(var!(2));
        enqueue_assignment(ctx.borrow(), lit!(2), Reason::Decision);
        propagate(ctx.borrow()).unwrap();

        ctx.part_mut(TrailP).new_decision_level(var!(4));
        enqueue_assignment(ctx.borrow(), lit!(4), Reason::Decision);
        propagate(ctx.borrow()).unwrap();

        assert_eq!(ctx.part(TrailP).current_level(), 2);
        assert_eq!(ctx.part(AssignmentP).var_value(var!(5)), Some(true));

        backtrack(ctx.borrow(), 1);

        assert_eq!(ctx.part(TrailP).current_level(), 1);
        assert_eq!(ctx.part(AssignmentP).var_value(var!(4)), None);
        assert_eq!(ctx.part(AssignmentP).var_value(var!(5)), None);
        // level 1 and level 0 assignments survive
        assert_eq!(ctx.part(AssignmentP).var_value(var!(2)), Some(true));
        assert_eq!(ctx.part(AssignmentP).var_value(var!(3)), Some(true));
        assert_eq!(ctx.part(AssignmentP).var_value(var!(1)), Some(true));

        // no variable is left above the target level
        for index in 0..6 {
            let var = Var::from_index(index);
            if ctx.part(AssignmentP).var_value(var).is_some() {
                assert!(ctx.part(ImplGraphP).level(var) <= 1);
            }
        }

        backtrack(ctx.borrow(), 0);

        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert_eq!(ctx.part(AssignmentP).var_value(var!(2)), None);
        assert_eq!(ctx.part(AssignmentP).var_value(var!(1)), Some(true));
    }
}
