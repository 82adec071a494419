//! The implication graph.
use plainsat_formula::{LitIdx, Var};

use crate::clause::ClauseRef;

/// What caused a variable to be assigned.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// The variable was picked by the decision heuristic.
    Decision,
    /// The clause became unit and forced the variable.
    Propagated(ClauseRef),
}

/// Node and incoming edges of the implication graph.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
}

/// The implication graph.
///
/// This is a DAG having all assigned variables as nodes, with decisions and level 0 unit
/// propagations as sources. For each propagated assignment it has incoming edges from the other
/// literals of the clause that forced the assignment. The edges are never stored explicitly:
/// conflict analysis walks reasons backwards through the assignment history.
#[derive(Default)]
pub struct ImplGraph {
    /// Contains only valid data for indices of assigned variables.
    nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                reason: Reason::Decision,
                level: 0,
            },
        );
    }

    /// Get the reason for an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var.index()].reason
    }

    /// Get the decision level of an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    /// Record reason and level for a variable that is being assigned.
    pub fn set_node(&mut self, var: Var, reason: Reason, level: usize) {
        self.nodes[var.index()] = ImplNode {
            reason,
            level: level as LitIdx,
        };
    }
}
