//! The variable universe of the loaded formula.
use partial_ref::{partial, PartialRef};

use plainsat_formula::Var;

use crate::context::{AssignmentP, Context, VariablesP};

/// Tracks which variables occur in the formula.
///
/// Variable numbering follows the input and may have gaps. Only variables that occur in at least
/// one clause take part in branching, termination checks and the model.
#[derive(Default)]
pub struct Variables {
    in_formula: Vec<bool>,
}

impl Variables {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.in_formula.resize(count, false);
    }

    /// Number of variable slots, including gaps in the numbering.
    pub fn var_count(&self) -> usize {
        self.in_formula.len()
    }

    /// Record that a variable occurs in the formula.
    pub fn mark_in_formula(&mut self, var: Var) {
        self.in_formula[var.index()] = true;
    }

    /// Whether a variable occurs in the formula.
    pub fn is_in_formula(&self, var: Var) -> bool {
        self.in_formula[var.index()]
    }

    /// All variables of the formula in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Var> + '_ {
        self.in_formula
            .iter()
            .enumerate()
            .filter(|&(_, &in_formula)| in_formula)
            .map(|(index, _)| Var::from_index(index))
    }
}

/// Whether some variable of the formula is still unassigned.
pub fn have_unassigned(ctx: partial!(Context, AssignmentP, VariablesP)) -> bool {
    let assignment = ctx.part(AssignmentP);
    ctx.part(VariablesP)
        .iter()
        .any(|var| assignment.var_value(var).is_none())
}
