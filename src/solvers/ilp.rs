//! 0/1 integer linear programming formulation of constrained matching.
//!
//! A matching problem has a 0/1 decision `t[i,j]` for every item pair and,
//! when latent variables are present, a 0/1 decision `s[p,q]` for every
//! variable pair. Decisions are packed left-to-right as `[t-block | s-block]`
//! in row-major order. The objective maximizes the gram-weighted sum of the
//! `t` decisions; variable pairs contribute nothing to the objective.
use crate::constraint::MatchingKind;
use crate::errors::Result;
use crate::solvers::assignment::IndexedScore;
use crate::solvers::backend;

/// A linear row of the `≤` constraint system.
pub struct LinearConstraint {
    /// Coefficients over the packed decision vector.
    pub coeffs: Vec<f64>,

    /// Upper bound of the row.
    pub ub: f64,
}

/// A constrained matching problem between two indexed item sets, solved as a
/// 0/1 integer linear program.
pub struct IlpMatchingProblem {
    n_x: usize,
    n_y: usize,
    n_x_vars: usize,
    n_y_vars: usize,
    gram: Vec<Vec<f64>>,
    constraints: Vec<LinearConstraint>,
}

impl IlpMatchingProblem {
    /// Creates a problem from the pairwise gram matrix and the number of
    /// latent variables on each side (zero when no variables are involved).
    pub fn new(gram: Vec<Vec<f64>>, n_x_vars: usize, n_y_vars: usize) -> Self {
        let n_x = gram.len();
        let n_y = gram.first().map_or(0, Vec::len);
        Self {
            n_x,
            n_y,
            n_x_vars,
            n_y_vars,
            gram,
            constraints: Vec::new(),
        }
    }

    fn n_cols(&self) -> usize {
        self.n_x * self.n_y + self.n_x_vars * self.n_y_vars
    }

    fn index_pair(&self, i: usize, j: usize) -> usize {
        i * self.n_y + j
    }

    fn index_var_pair(&self, p: usize, q: usize) -> usize {
        self.n_x * self.n_y + p * self.n_y_vars + q
    }

    /// Adds the cardinality constraint rows for the matching kind: `≤ 1` per
    /// row and/or per column of the `t` block. Many-to-many adds nothing.
    pub fn add_matching_constraint(&mut self, kind: MatchingKind) {
        let per_i = matches!(kind, MatchingKind::OneToOne | MatchingKind::ManyToOne);
        let per_j = matches!(kind, MatchingKind::OneToOne | MatchingKind::OneToMany);
        if per_j {
            for j in 0..self.n_y {
                let mut coeffs = vec![0.0; self.n_cols()];
                for i in 0..self.n_x {
                    coeffs[self.index_pair(i, j)] = 1.0;
                }
                self.constraints.push(LinearConstraint { coeffs, ub: 1.0 });
            }
        }
        if per_i {
            for i in 0..self.n_x {
                let mut coeffs = vec![0.0; self.n_cols()];
                for j in 0..self.n_y {
                    coeffs[self.index_pair(i, j)] = 1.0;
                }
                self.constraints.push(LinearConstraint { coeffs, ub: 1.0 });
            }
        }
    }

    /// Adds the one-to-one constraint rows on the `s` block. Variables bind
    /// at most once on either side, independently of the item constraint.
    pub fn add_variable_matching_constraint(&mut self) {
        if self.n_x_vars == 0 || self.n_y_vars == 0 {
            return;
        }
        for q in 0..self.n_y_vars {
            let mut coeffs = vec![0.0; self.n_cols()];
            for p in 0..self.n_x_vars {
                coeffs[self.index_var_pair(p, q)] = 1.0;
            }
            self.constraints.push(LinearConstraint { coeffs, ub: 1.0 });
        }
        for p in 0..self.n_x_vars {
            let mut coeffs = vec![0.0; self.n_cols()];
            for q in 0..self.n_y_vars {
                coeffs[self.index_var_pair(p, q)] = 1.0;
            }
            self.constraints.push(LinearConstraint { coeffs, ub: 1.0 });
        }
    }

    /// Adds the reachability-monotonicity rows: for candidate pairs
    /// `(u0, v0)` and `(u1, v1)` with positive gram weight whose reachability
    /// bits disagree between the two sides, forbid selecting both.
    pub fn add_monotonicity_constraint(
        &mut self,
        x_reachability: &[Vec<bool>],
        y_reachability: &[Vec<bool>],
    ) {
        let candidates: Vec<(usize, usize)> = (0..self.n_x)
            .flat_map(|u| (0..self.n_y).map(move |v| (u, v)))
            .filter(|&(u, v)| self.gram[u][v] > 0.0)
            .collect();
        for &(u0, v0) in &candidates {
            for &(u1, v1) in &candidates {
                if x_reachability[u0][u1] != y_reachability[v0][v1] {
                    let mut coeffs = vec![0.0; self.n_cols()];
                    coeffs[self.index_pair(u0, v0)] = 1.0;
                    coeffs[self.index_pair(u1, v1)] = 1.0;
                    self.constraints.push(LinearConstraint { coeffs, ub: 1.0 });
                }
            }
        }
    }

    /// Adds the latent implication rows `t[i,j] − s[p,q] ≤ 0`: matching the
    /// items forces binding the variables they reference. Implications are
    /// `(i, j, p, q)` index quadruples over the item and variable sets.
    pub fn add_latent_variable_constraint(&mut self, implications: &[(usize, usize, usize, usize)]) {
        for &(i, j, p, q) in implications {
            let mut coeffs = vec![0.0; self.n_cols()];
            coeffs[self.index_pair(i, j)] = 1.0;
            coeffs[self.index_var_pair(p, q)] = -1.0;
            self.constraints.push(LinearConstraint { coeffs, ub: 0.0 });
        }
    }

    /// Solves the program, returning the objective value and the selected
    /// item pairs with their gram weights, in row-major order.
    ///
    /// # Errors
    ///
    /// * [`crate::errors::SimatchError::SolverFailure`] if the back-end
    ///   reports infeasibility or numerical failure.
    pub fn solve(&self) -> Result<(f64, Vec<IndexedScore>)> {
        if self.n_x * self.n_y == 0 {
            return Ok((0.0, Vec::new()));
        }
        let mut objective = vec![0.0; self.n_cols()];
        for i in 0..self.n_x {
            for j in 0..self.n_y {
                objective[self.index_pair(i, j)] = self.gram[i][j];
            }
        }
        let selected = backend::solve_zero_one(&objective, &self.constraints)?;
        let mut total = 0.0;
        let mut pairs = Vec::new();
        for i in 0..self.n_x {
            for j in 0..self.n_y {
                if selected[self.index_pair(i, j)] {
                    total += self.gram[i][j];
                    pairs.push((i, j, self.gram[i][j]));
                }
            }
        }
        Ok((total, pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_to_one_matches_hungarian() {
        let gram = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
        let mut problem = IlpMatchingProblem::new(gram.clone(), 0, 0);
        problem.add_matching_constraint(MatchingKind::OneToOne);
        let (total, pairs) = problem.solve().unwrap();
        assert_relative_eq!(total, 4.0);
        assert_eq!(pairs, vec![(0, 0, 2.0), (1, 1, 2.0)]);
    }

    #[test]
    fn test_many_to_many_selects_everything_positive() {
        let gram = vec![vec![1.0, 0.5], vec![0.0, 1.0]];
        let mut problem = IlpMatchingProblem::new(gram, 0, 0);
        problem.add_matching_constraint(MatchingKind::ManyToMany);
        let (total, _) = problem.solve().unwrap();
        assert_relative_eq!(total, 2.5);
    }

    #[test]
    fn test_monotonicity_forbids_inconsistent_pairs() {
        // Two nodes on each side, all pairs weigh 1. The prediction has an
        // edge 0 -> 1 but the reference has none, so the only consistent
        // matchings keep a single pair.
        let gram = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let x_reach = vec![vec![true, true], vec![false, true]];
        let y_reach = vec![vec![true, false], vec![false, true]];
        let mut problem = IlpMatchingProblem::new(gram, 0, 0);
        problem.add_matching_constraint(MatchingKind::OneToOne);
        problem.add_monotonicity_constraint(&x_reach, &y_reach);
        let (total, pairs) = problem.solve().unwrap();
        assert_relative_eq!(total, 1.0);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_latent_constraint_couples_items_to_bindings() {
        // Two items on each side, both scoring 1 against either opposite
        // item. Item matches imply conflicting bindings of one prediction
        // variable against two reference variables, and bindings are
        // one-to-one, so only one item pair survives per binding.
        let gram = vec![vec![1.0, 1.0]];
        let mut problem = IlpMatchingProblem::new(gram, 1, 2);
        problem.add_matching_constraint(MatchingKind::ManyToMany);
        problem.add_variable_matching_constraint();
        problem.add_latent_variable_constraint(&[(0, 0, 0, 0), (0, 1, 0, 1)]);
        let (total, pairs) = problem.solve().unwrap();
        assert_relative_eq!(total, 1.0);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_empty_problem() {
        let problem = IlpMatchingProblem::new(Vec::new(), 0, 0);
        assert_eq!(problem.solve().unwrap(), (0.0, Vec::new()));
    }
}
