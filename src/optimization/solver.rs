// src/optimization/solver.rs

use crate::error::{EngineError, EngineResult};
use std::time::Instant;

const TOL: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// coeffs . x <= rhs
    Le,
    /// coeffs . x >= rhs
    Ge,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub coeffs: Vec<f64>,
    pub sense: Sense,
    pub rhs: f64,
}

/// A minimization LP over non-negative variables:
/// minimize `objective . x` subject to the constraint rows and `x >= 0`.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone)]
pub enum LpSolution {
    Optimal { x: Vec<f64>, objective: f64 },
    Infeasible,
}

/// Narrow solve capability. Any exact LP solver can stand in for the
/// bundled simplex without touching the optimizer's policy logic.
pub trait LinearSolver: Send + Sync {
    fn solve(&self, lp: &LinearProgram, deadline: Option<Instant>) -> EngineResult<LpSolution>;
}

/// Dense two-phase simplex with Bland's rule.
///
/// Bland's lowest-index pivoting makes the solve deterministic and cycle-free:
/// among degenerate optima it lands on the basis favoring the lowest-index
/// (lexicographically first) columns, which is the tie-break policy the
/// optimizer documents for supplier orderings.
#[derive(Debug, Clone, Default)]
pub struct SimplexSolver;

impl SimplexSolver {
    pub fn new() -> Self {
        Self
    }
}

impl LinearSolver for SimplexSolver {
    fn solve(&self, lp: &LinearProgram, deadline: Option<Instant>) -> EngineResult<LpSolution> {
        let n = lp.objective.len();
        let m = lp.constraints.len();
        if n == 0 {
            return Err(EngineError::InvalidInput(
                "linear program has no variables".into(),
            ));
        }
        for row in &lp.constraints {
            if row.coeffs.len() != n {
                return Err(EngineError::InvalidInput(format!(
                    "constraint has {} coefficients, expected {}",
                    row.coeffs.len(),
                    n
                )));
            }
        }

        // Normalize rows to rhs >= 0 so slack columns can seed the basis.
        let mut rows: Vec<(Vec<f64>, Sense, f64)> = lp
            .constraints
            .iter()
            .map(|c| {
                if c.rhs < 0.0 {
                    let flipped = match c.sense {
                        Sense::Le => Sense::Ge,
                        Sense::Ge => Sense::Le,
                    };
                    (c.coeffs.iter().map(|v| -v).collect(), flipped, -c.rhs)
                } else {
                    (c.coeffs.clone(), c.sense, c.rhs)
                }
            })
            .collect();

        // Column layout: structural | one slack/surplus per row | artificials.
        let n_art = rows.iter().filter(|(_, s, _)| *s == Sense::Ge).count();
        let cols = n + m + n_art;
        let mut tab = vec![vec![0.0; cols + 1]; m];
        let mut basis = vec![0usize; m];
        let mut art_cols = Vec::with_capacity(n_art);

        let mut next_art = n + m;
        for (i, (coeffs, sense, rhs)) in rows.drain(..).enumerate() {
            tab[i][..n].copy_from_slice(&coeffs);
            tab[i][cols] = rhs;
            match sense {
                Sense::Le => {
                    tab[i][n + i] = 1.0;
                    basis[i] = n + i;
                }
                Sense::Ge => {
                    tab[i][n + i] = -1.0;
                    tab[i][next_art] = 1.0;
                    basis[i] = next_art;
                    art_cols.push(next_art);
                    next_art += 1;
                }
            }
        }

        // Phase 1: drive the artificials to zero.
        if n_art > 0 {
            let mut phase1 = vec![0.0; cols];
            for &a in &art_cols {
                phase1[a] = 1.0;
            }
            let mut obj = reduced_costs(&phase1, &tab, &basis, cols);
            pivot_to_optimal(&mut tab, &mut basis, &mut obj, cols, &art_cols, deadline)?;
            if -obj[cols] > 1e-7 {
                return Ok(LpSolution::Infeasible);
            }
        }

        // Phase 2: original objective, artificial columns barred from entering.
        let mut costs = vec![0.0; cols];
        costs[..n].copy_from_slice(&lp.objective);
        let mut obj = reduced_costs(&costs, &tab, &basis, cols);
        pivot_to_optimal(&mut tab, &mut basis, &mut obj, cols, &art_cols, deadline)?;

        let mut x = vec![0.0; n];
        for (i, &b) in basis.iter().enumerate() {
            if b < n {
                x[b] = tab[i][cols].max(0.0);
            }
        }
        let objective = lp
            .objective
            .iter()
            .zip(&x)
            .map(|(c, v)| c * v)
            .sum::<f64>();
        Ok(LpSolution::Optimal { x, objective })
    }
}

/// Reduced-cost row for cost vector `costs` given the current basis.
/// The rhs slot holds the negated objective value.
fn reduced_costs(costs: &[f64], tab: &[Vec<f64>], basis: &[usize], cols: usize) -> Vec<f64> {
    let mut obj = vec![0.0; cols + 1];
    obj[..cols].copy_from_slice(costs);
    for (i, &b) in basis.iter().enumerate() {
        let cb = costs[b];
        if cb != 0.0 {
            for j in 0..=cols {
                obj[j] -= cb * tab[i][j];
            }
        }
    }
    obj
}

fn pivot_to_optimal(
    tab: &mut [Vec<f64>],
    basis: &mut [usize],
    obj: &mut [f64],
    cols: usize,
    barred: &[usize],
    deadline: Option<Instant>,
) -> EngineResult<()> {
    loop {
        if let Some(limit) = deadline {
            if Instant::now() >= limit {
                return Err(EngineError::Timeout);
            }
        }

        // Bland: entering column is the lowest index with a negative
        // reduced cost. Barred (artificial) columns never re-enter.
        let entering = (0..cols).find(|&j| !barred.contains(&j) && obj[j] < -TOL);
        let Some(col) = entering else {
            return Ok(());
        };

        // Ratio test; ties go to the row whose basic variable has the
        // lowest index, again per Bland.
        let mut pivot_row: Option<usize> = None;
        let mut best_ratio = f64::INFINITY;
        for (i, row) in tab.iter().enumerate() {
            if row[col] > TOL {
                let ratio = row[cols] / row[col];
                let better = match pivot_row {
                    None => true,
                    Some(r) => {
                        ratio < best_ratio - TOL
                            || ((ratio - best_ratio).abs() <= TOL && basis[i] < basis[r])
                    }
                };
                if better {
                    pivot_row = Some(i);
                    best_ratio = ratio;
                }
            }
        }
        let Some(row) = pivot_row else {
            // Unbounded below; with the engine's non-negative cost rows this
            // only happens on malformed input.
            return Err(EngineError::InvalidInput(
                "linear program is unbounded".into(),
            ));
        };

        let pivot = tab[row][col];
        for j in 0..=cols {
            tab[row][j] /= pivot;
        }
        for i in 0..tab.len() {
            if i != row && tab[i][col].abs() > TOL {
                let factor = tab[i][col];
                for j in 0..=cols {
                    tab[i][j] -= factor * tab[row][j];
                }
            }
        }
        if obj[col].abs() > TOL {
            let factor = obj[col];
            for j in 0..=cols {
                obj[j] -= factor * tab[row][j];
            }
        }
        basis[row] = col;
    }
}
