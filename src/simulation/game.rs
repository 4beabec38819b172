// src/simulation/game.rs

use crate::error::{EngineError, EngineResult};
use crate::model::catalog::Supplier;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Markup choices a supplier may pick from. Kept as a fixed discrete grid;
/// widening it changes convergence behavior.
pub const MARKUP_GRID: [f64; 4] = [0.0, 0.1, 0.2, 0.3];

/// Fraction of the sale price a supplier pays as cost of goods.
const COST_OF_GOODS: f64 = 0.7;

const INITIAL_MARKUP: f64 = 0.1;
const INITIAL_ALLOCATION: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupplierStrategy {
    pub price_markup: f64,
    pub capacity_allocation: f64,
}

impl Default for SupplierStrategy {
    fn default() -> Self {
        Self {
            price_markup: INITIAL_MARKUP,
            capacity_allocation: INITIAL_ALLOCATION,
        }
    }
}

/// Result of a best-response run. `converged` reports whether the final
/// round left every supplier's markup unchanged; callers must treat a
/// false flag as a valid but unsettled outcome, not a failure.
#[derive(Debug, Clone, Serialize)]
pub struct EquilibriumOutcome {
    pub strategies: BTreeMap<String, SupplierStrategy>,
    pub converged: bool,
    pub rounds: usize,
}

/// Best-response iteration over discretized supplier pricing strategies
/// with a logit market-share model.
pub struct SupplierGame<'a> {
    suppliers: &'a [Supplier],
    demand_forecast: f64,
}

impl<'a> SupplierGame<'a> {
    pub fn new(suppliers: &'a [Supplier], demand_forecast: f64) -> Self {
        Self {
            suppliers,
            demand_forecast,
        }
    }

    /// Gauss-Seidel rounds: suppliers update in id order, and each best
    /// response sees peers already updated this round. The ordering is part
    /// of the contract; synchronous updates reach different fixed points.
    pub fn find_equilibrium(&self, max_iter: usize) -> EngineResult<EquilibriumOutcome> {
        if self.suppliers.is_empty() {
            return Err(EngineError::InvalidInput("empty supplier set".into()));
        }
        if max_iter == 0 {
            return Err(EngineError::InvalidInput("max_iter must be > 0".into()));
        }
        if self.demand_forecast < 0.0 {
            return Err(EngineError::InvalidInput(
                "demand forecast must be non-negative".into(),
            ));
        }

        let mut ordered: Vec<&Supplier> = self.suppliers.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let mut strategies: BTreeMap<String, SupplierStrategy> = ordered
            .iter()
            .map(|s| (s.id.clone(), SupplierStrategy::default()))
            .collect();

        let mut converged = false;
        let mut rounds = 0;
        for round in 0..max_iter {
            let mut changed = false;
            for supplier in &ordered {
                let best = self.best_response(supplier, &strategies);
                let current = strategies.get_mut(&supplier.id).unwrap();
                if (current.price_markup - best.price_markup).abs() > f64::EPSILON {
                    changed = true;
                }
                *current = best;
            }
            rounds = round + 1;
            if !changed {
                converged = true;
                break;
            }
        }
        debug!(rounds, converged, "equilibrium search finished");

        Ok(EquilibriumOutcome {
            strategies,
            converged,
            rounds,
        })
    }

    /// Best markup on the grid for one supplier, peers held fixed.
    /// Ties go to the lowest (cheapest) markup.
    fn best_response(
        &self,
        supplier: &Supplier,
        strategies: &BTreeMap<String, SupplierStrategy>,
    ) -> SupplierStrategy {
        let mut best = strategies[&supplier.id];
        let mut best_payoff = f64::NEG_INFINITY;

        for markup in MARKUP_GRID {
            let candidate = SupplierStrategy {
                price_markup: markup,
                capacity_allocation: INITIAL_ALLOCATION,
            };
            let payoff = self.payoff(supplier, &candidate, strategies);
            // Strict improvement keeps the first (lowest) markup on ties.
            if payoff > best_payoff {
                best_payoff = payoff;
                best = candidate;
            }
        }
        best
    }

    /// Payoff under a logit share of the forecast demand, capped at the
    /// capacity the strategy allocates to this buyer.
    fn payoff(
        &self,
        supplier: &Supplier,
        strategy: &SupplierStrategy,
        strategies: &BTreeMap<String, SupplierStrategy>,
    ) -> f64 {
        let price = supplier.base_price * (1.0 + strategy.price_markup);
        let capacity = supplier.capacity * strategy.capacity_allocation;

        // Utility is negative effective price; softmax over all suppliers.
        // Max-subtraction keeps exp() in range for large prices.
        let utilities: Vec<(bool, f64)> = self
            .suppliers
            .iter()
            .map(|s| {
                if s.id == supplier.id {
                    (true, -price)
                } else {
                    let markup = strategies
                        .get(&s.id)
                        .map(|st| st.price_markup)
                        .unwrap_or(INITIAL_MARKUP);
                    (false, -(s.base_price * (1.0 + markup)))
                }
            })
            .collect();
        let max_u = utilities
            .iter()
            .map(|(_, u)| *u)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut own_exp = 0.0;
        let mut sum_exp = 0.0;
        for (own, u) in &utilities {
            let e = (u - max_u).exp();
            sum_exp += e;
            if *own {
                own_exp = e;
            }
        }
        let market_share = own_exp / sum_exp;

        let volume = (self.demand_forecast * market_share).min(capacity);
        let revenue = volume * price;
        let cost = volume * supplier.base_price * COST_OF_GOODS;
        revenue - cost
    }
}
