//! Back-end adapter translating matching programs to the LP solver.
//!
//! This is the only module that names the solver crate. It receives a plain
//! objective vector and `≤` constraint rows, declares every decision as a 0/1
//! integer, maximizes, and reads the assignment back. The solver model is
//! built per call and dropped on every exit path.
use good_lp::constraint;
use good_lp::default_solver;
use good_lp::variable;
use good_lp::variables;
use good_lp::Expression;
use good_lp::Solution;
use good_lp::SolverModel;

use crate::errors::Result;
use crate::errors::SimatchError;
use crate::solvers::ilp::LinearConstraint;

/// Maximizes `objective · z` over 0/1 vectors `z` subject to
/// `coeffs · z ≤ ub` rows, returning the selected decisions.
pub(crate) fn solve_zero_one(
    objective: &[f64],
    constraints: &[LinearConstraint],
) -> Result<Vec<bool>> {
    let mut vars = variables!();
    let decision: Vec<_> = (0..objective.len())
        .map(|_| vars.add(variable().binary()))
        .collect();

    let mut objective_expr = Expression::default();
    for (z, &c) in decision.iter().zip(objective) {
        if c != 0.0 {
            objective_expr += c * *z;
        }
    }

    let mut model = vars.maximise(objective_expr).using(default_solver);
    for row in constraints {
        let mut lhs = Expression::default();
        for (z, &c) in decision.iter().zip(&row.coeffs) {
            if c != 0.0 {
                lhs += c * *z;
            }
        }
        model = model.with(constraint!(lhs <= row.ub));
    }

    let solution = model
        .solve()
        .map_err(|e| SimatchError::SolverFailure(e.to_string()))?;
    Ok(decision.iter().map(|z| solution.value(*z) > 0.5).collect())
}
