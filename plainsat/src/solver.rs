//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;

use plainsat_dimacs::DimacsParser;
use plainsat_formula::{CnfFormula, Lit};

use crate::cdcl::search_step;
use crate::context::{ensure_var_count, AssignmentP, Context, SolverStateP, VariablesP};
use crate::load::load_clause;
use crate::state::SatState;

/// A boolean satisfiability solver.
///
/// A solver instance is meant to decide a single formula: load the clauses, call
/// [`solve`](Solver::solve) once and read off the verdict and model.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let formula = DimacsParser::parse(input)?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );

        self.add_formula(&formula);

        Ok(())
    }

    /// Check the satisfiability of the loaded formula.
    pub fn solve(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();
        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            search_step(ctx.borrow());
        }
        ctx.part(SolverStateP).sat_state == SatState::Sat
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal per variable of the formula, in ascending variable order: the
    /// variable itself when it is assigned true, its negation when it is assigned false.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state != SatState::Sat {
            return None;
        }

        let assignment = ctx.part(AssignmentP);

        Some(
            ctx.part(VariablesP)
                .iter()
                .filter_map(|var| {
                    assignment
                        .var_value(var)
                        .map(|value| Lit::from_var(var, !value))
                })
                .collect(),
        )
    }
}
