//! End-to-end runs of the four numeric components over one generated catalog.

use procurement_engine::cancel::CancelToken;
use procurement_engine::io::generator::CatalogGenerator;
use procurement_engine::optimization::pareto::{FrontierOutcome, ParetoFrontierScanner};
use procurement_engine::optimization::procurement::{ProcurementOptimizer, WeightVector};
use procurement_engine::simulation::game::{SupplierGame, MARKUP_GRID};
use procurement_engine::simulation::stress::{
    calculate_cvar, DisruptionScenario, ReorderPolicy, StressTester,
};

#[test]
fn generated_catalog_flows_through_every_component() {
    let mut gen = CatalogGenerator::new(2024);
    let skus = gen.generate_skus(5).unwrap();
    let suppliers = gen.generate_suppliers(5).unwrap();
    let forecast = gen.generate_forecast(&skus, 26).unwrap();
    let cancel = CancelToken::new();

    // Optimizer: a feasible plan obeys both invariant families; an
    // infeasible catalog must say so rather than return an empty plan.
    let optimizer = ProcurementOptimizer::new();
    match optimizer.optimize(&suppliers, &forecast, &WeightVector::default()) {
        Ok(plan) => {
            let floor = 0.9 * forecast.total_mean();
            let total: f64 = plan.orders.values().sum();
            assert!(total >= floor - 1e-6);
            for (id, qty) in &plan.orders {
                let cap = suppliers.iter().find(|s| &s.id == id).unwrap().capacity;
                assert!(*qty <= cap + 1e-6);
            }
            assert_eq!(plan.suppliers_used, plan.orders.len());
        }
        Err(procurement_engine::EngineError::Infeasible { shortfall }) => {
            assert!(shortfall > 0.0);
        }
        Err(other) => panic!("unexpected error: {other:?}"),
    }

    // Frontier: exactly as many points as requested, in weight order.
    let frontier = ParetoFrontierScanner::new(&optimizer)
        .compute_frontier(&suppliers, &forecast, 10, &cancel)
        .unwrap();
    assert_eq!(frontier.len(), 10);
    for point in &frontier {
        assert!((point.weights.cost + point.weights.carbon - 1.0).abs() < 1e-9);
        if let FrontierOutcome::Feasible(plan) = &point.outcome {
            assert!(plan.total_cost >= 0.0);
        }
    }

    // Stress test: report statistics are ordered as expected ≤ CVaR ≤ worst.
    let scenario = DisruptionScenario::new("port_closure", 5, 0.5, 0.1);
    let policy = ReorderPolicy {
        order_qty: 1000.0,
        safety_stock: 500.0,
    };
    let tester = StressTester::new(100, 7);
    let losses = tester.simulate_impact(&scenario, &policy, &cancel).unwrap();
    assert_eq!(losses.len(), 100);
    let mean = losses.iter().sum::<f64>() / losses.len() as f64;
    assert!(mean > 0.0);
    let cvar = calculate_cvar(&losses, 0.95).unwrap();
    let worst = losses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(mean <= cvar + 1e-9);
    assert!(cvar <= worst + 1e-9);

    // Equilibrium: one on-grid strategy per supplier.
    let outcome = SupplierGame::new(&suppliers, forecast.total_mean())
        .find_equilibrium(20)
        .unwrap();
    assert_eq!(outcome.strategies.len(), suppliers.len());
    for strategy in outcome.strategies.values() {
        assert!(MARKUP_GRID
            .iter()
            .any(|m| (m - strategy.price_markup).abs() < 1e-12));
    }
}

#[test]
fn frontier_cost_decreases_as_cost_weight_grows() {
    // Along the sweep, putting more weight on monetary cost can only lower
    // the plan's monetary cost (the frontier is monotone in each objective).
    let mut gen = CatalogGenerator::new(11);
    let skus = gen.generate_skus(4).unwrap();
    let mut suppliers = gen.generate_suppliers(6).unwrap();
    let forecast = gen.generate_forecast(&skus, 13).unwrap();

    // Make sure the instance is feasible by granting ample capacity.
    let floor = 0.9 * forecast.total_mean();
    for s in &mut suppliers {
        s.capacity = floor;
    }

    let optimizer = ProcurementOptimizer::new();
    let frontier = ParetoFrontierScanner::new(&optimizer)
        .compute_frontier(&suppliers, &forecast, 8, &CancelToken::new())
        .unwrap();

    let costs: Vec<f64> = frontier
        .iter()
        .filter_map(|p| match &p.outcome {
            FrontierOutcome::Feasible(plan) => Some(plan.total_cost),
            FrontierOutcome::Infeasible { .. } => None,
        })
        .collect();
    assert_eq!(costs.len(), 8);
    for pair in costs.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-6);
    }
}
