// src/optimization/pareto.rs

use crate::cancel::CancelToken;
use crate::error::{EngineError, EngineResult};
use crate::model::catalog::{DemandForecast, Supplier};
use crate::optimization::procurement::{ProcurementOptimizer, ProcurementPlan, WeightVector};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// One swept point. Infeasible points stay in the frontier with an explicit
/// marker so the output always has exactly `n_points` entries.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrontierOutcome {
    Feasible(ProcurementPlan),
    Infeasible { shortfall: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct FrontierPoint {
    pub weights: WeightVector,
    pub outcome: FrontierOutcome,
}

/// Traces the cost/carbon trade-off by sweeping `cost_weight` linearly over
/// [0.1, 0.9] with `carbon_weight = 1 - cost_weight`.
pub struct ParetoFrontierScanner<'a> {
    optimizer: &'a ProcurementOptimizer,
}

impl<'a> ParetoFrontierScanner<'a> {
    pub fn new(optimizer: &'a ProcurementOptimizer) -> Self {
        Self { optimizer }
    }

    /// Points are solved in parallel but always returned in weight order,
    /// lowest cost weight first.
    pub fn compute_frontier(
        &self,
        suppliers: &[Supplier],
        forecast: &DemandForecast,
        n_points: usize,
        cancel: &CancelToken,
    ) -> EngineResult<Vec<FrontierPoint>> {
        if n_points == 0 {
            return Err(EngineError::InvalidInput(
                "frontier needs at least one point".into(),
            ));
        }

        let points: Vec<EngineResult<FrontierPoint>> = (0..n_points)
            .into_par_iter()
            .map(|i| {
                if cancel.is_cancelled() {
                    return Err(EngineError::Cancelled);
                }
                let cost = sweep_weight(i, n_points);
                let weights = WeightVector {
                    cost,
                    carbon: 1.0 - cost,
                };
                let outcome = match self.optimizer.optimize(suppliers, forecast, &weights) {
                    Ok(plan) => FrontierOutcome::Feasible(plan),
                    Err(EngineError::Infeasible { shortfall }) => {
                        FrontierOutcome::Infeasible { shortfall }
                    }
                    Err(other) => return Err(other),
                };
                Ok(FrontierPoint { weights, outcome })
            })
            .collect();

        let frontier: Vec<FrontierPoint> = points.into_iter().collect::<EngineResult<_>>()?;
        info!(n_points, "pareto frontier computed");
        Ok(frontier)
    }
}

/// Linear sweep over [0.1, 0.9] inclusive; a single point sits at 0.1.
fn sweep_weight(i: usize, n_points: usize) -> f64 {
    if n_points == 1 {
        return 0.1;
    }
    0.1 + 0.8 * (i as f64) / ((n_points - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::Region;

    fn supplier(id: &str, price: f64, capacity: f64, carbon: f64) -> Supplier {
        Supplier {
            id: id.to_string(),
            region: Region::Eu,
            base_price: price,
            capacity,
            reliability: 0.9,
            carbon_intensity: carbon,
        }
    }

    fn forecast_totalling(total_mean: f64) -> DemandForecast {
        let mut f = DemandForecast::new();
        f.insert("SKU_000", vec![total_mean]);
        f
    }

    #[test]
    fn frontier_has_exactly_n_points_with_convex_weights() {
        let suppliers = vec![
            supplier("SUP_000", 10.0, 800.0, 5.0),
            supplier("SUP_001", 12.0, 800.0, 1.0),
        ];
        let forecast = forecast_totalling(1000.0);
        let opt = ProcurementOptimizer::new();
        let frontier = ParetoFrontierScanner::new(&opt)
            .compute_frontier(&suppliers, &forecast, 10, &CancelToken::new())
            .unwrap();

        assert_eq!(frontier.len(), 10);
        for point in &frontier {
            assert!((point.weights.cost + point.weights.carbon - 1.0).abs() < 1e-9);
        }
        assert!((frontier[0].weights.cost - 0.1).abs() < 1e-9);
        assert!((frontier[9].weights.cost - 0.9).abs() < 1e-9);
        // Weight order must hold regardless of parallel completion order.
        for pair in frontier.windows(2) {
            assert!(pair[0].weights.cost < pair[1].weights.cost);
        }
    }

    #[test]
    fn infeasible_points_are_marked_not_dropped() {
        let suppliers = vec![supplier("SUP_000", 10.0, 100.0, 1.0)];
        let forecast = forecast_totalling(1000.0);
        let opt = ProcurementOptimizer::new();
        let frontier = ParetoFrontierScanner::new(&opt)
            .compute_frontier(&suppliers, &forecast, 5, &CancelToken::new())
            .unwrap();
        assert_eq!(frontier.len(), 5);
        for point in &frontier {
            assert!(matches!(
                point.outcome,
                FrontierOutcome::Infeasible { shortfall } if shortfall > 0.0
            ));
        }
    }

    #[test]
    fn cancelled_scan_returns_cancelled() {
        let suppliers = vec![supplier("SUP_000", 10.0, 1000.0, 1.0)];
        let forecast = forecast_totalling(500.0);
        let opt = ProcurementOptimizer::new();
        let token = CancelToken::new();
        token.cancel();
        let err = ParetoFrontierScanner::new(&opt)
            .compute_frontier(&suppliers, &forecast, 5, &token)
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }

    #[test]
    fn zero_points_is_invalid() {
        let opt = ProcurementOptimizer::new();
        let err = ParetoFrontierScanner::new(&opt)
            .compute_frontier(&[], &DemandForecast::new(), 0, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
