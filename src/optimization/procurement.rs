// src/optimization/procurement.rs

use crate::error::{EngineError, EngineResult};
use crate::model::catalog::{DemandForecast, Supplier};
use crate::optimization::solver::{
    Constraint, LinearProgram, LinearSolver, LpSolution, Sense, SimplexSolver,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Fraction of aggregate mean forecast demand that committed orders must
/// cover (the service-level floor).
pub const SERVICE_LEVEL: f64 = 0.9;

/// Order quantities at or below this many units are treated as solver noise
/// and omitted from the plan.
pub const ORDER_THRESHOLD: f64 = 0.1;

/// Objective weights for the cost/carbon trade-off. Weights need not sum
/// to 1; the frontier scanner normalizes them, direct callers may not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightVector {
    pub cost: f64,
    pub carbon: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            cost: 0.5,
            carbon: 0.1,
        }
    }
}

/// The result of one optimization call. `orders` maps supplier id to
/// quantity; a BTreeMap keeps serialization byte-for-byte reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementPlan {
    pub orders: BTreeMap<String, f64>,
    pub total_cost: f64,
    pub carbon_emissions: f64,
    pub suppliers_used: usize,
}

/// Solves one weighted-objective allocation over suppliers:
/// minimize `w.cost * procurement_cost + w.carbon * carbon` subject to the
/// service-level floor and per-supplier capacity.
pub struct ProcurementOptimizer {
    solver: Box<dyn LinearSolver>,
    deadline: Option<Duration>,
}

impl Default for ProcurementOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcurementOptimizer {
    pub fn new() -> Self {
        Self {
            solver: Box::new(SimplexSolver::new()),
            deadline: None,
        }
    }

    /// Substitute a different exact solver.
    pub fn with_solver(solver: Box<dyn LinearSolver>) -> Self {
        Self {
            solver,
            deadline: None,
        }
    }

    /// Fail with `Timeout` instead of solving past this budget.
    pub fn with_deadline(mut self, budget: Duration) -> Self {
        self.deadline = Some(budget);
        self
    }

    pub fn optimize(
        &self,
        suppliers: &[Supplier],
        forecast: &DemandForecast,
        weights: &WeightVector,
    ) -> EngineResult<ProcurementPlan> {
        if suppliers.is_empty() {
            return Err(EngineError::InvalidInput("empty supplier set".into()));
        }
        if weights.cost < 0.0 || weights.carbon < 0.0 {
            return Err(EngineError::InvalidInput(
                "objective weights must be non-negative".into(),
            ));
        }

        // Columns in supplier-id order: degenerate optima then resolve to
        // the lexicographically smallest supplier ordering under Bland.
        let mut ordered: Vec<&Supplier> = suppliers.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        let n = ordered.len();

        let demand_floor = SERVICE_LEVEL * forecast.total_mean();
        let total_capacity: f64 = ordered.iter().map(|s| s.capacity).sum();
        if total_capacity + 1e-9 < demand_floor {
            return Err(EngineError::Infeasible {
                shortfall: demand_floor - total_capacity,
            });
        }

        let objective: Vec<f64> = ordered
            .iter()
            .map(|s| weights.cost * s.base_price + weights.carbon * s.carbon_intensity)
            .collect();

        let mut constraints = Vec::with_capacity(n + 1);
        constraints.push(Constraint {
            coeffs: vec![1.0; n],
            sense: Sense::Ge,
            rhs: demand_floor,
        });
        for (j, s) in ordered.iter().enumerate() {
            let mut coeffs = vec![0.0; n];
            coeffs[j] = 1.0;
            constraints.push(Constraint {
                coeffs,
                sense: Sense::Le,
                rhs: s.capacity,
            });
        }

        let lp = LinearProgram {
            objective,
            constraints,
        };
        let deadline = self.deadline.map(|d| Instant::now() + d);
        let x = match self.solver.solve(&lp, deadline)? {
            LpSolution::Optimal { x, .. } => x,
            LpSolution::Infeasible => {
                let shortfall = (demand_floor - total_capacity).max(0.0);
                return Err(EngineError::Infeasible { shortfall });
            }
        };

        let mut orders = BTreeMap::new();
        let mut total_cost = 0.0;
        let mut carbon_emissions = 0.0;
        for (s, &qty) in ordered.iter().zip(&x) {
            if qty > ORDER_THRESHOLD {
                orders.insert(s.id.clone(), qty);
                total_cost += qty * s.base_price;
                carbon_emissions += qty * s.carbon_intensity;
            }
        }
        let suppliers_used = orders.len();
        debug!(
            suppliers_used,
            total_cost, carbon_emissions, "procurement plan solved"
        );

        Ok(ProcurementPlan {
            orders,
            total_cost,
            carbon_emissions,
            suppliers_used,
        })
    }
}
