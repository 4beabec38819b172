use procurement_engine::cancel::CancelToken;
use procurement_engine::io::{generator::CatalogGenerator, reporting};
use procurement_engine::optimization::pareto::ParetoFrontierScanner;
use procurement_engine::optimization::procurement::{ProcurementOptimizer, WeightVector};
use procurement_engine::simulation::game::SupplierGame;
use procurement_engine::simulation::stress::{DisruptionScenario, ReorderPolicy, StressTester};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Procurement Decision Engine ===");

    // 1. SYNTHESIZE A CATALOG
    let seed = 42;
    let mut gen = CatalogGenerator::new(seed);
    let skus = gen.generate_skus(10).expect("sku generation");
    let suppliers = gen.generate_suppliers(6).expect("supplier generation");
    let forecast = gen.generate_forecast(&skus, 52).expect("forecast generation");
    info!(
        skus = skus.len(),
        suppliers = suppliers.len(),
        "catalog generated"
    );

    let cancel = CancelToken::new();

    // 2. SINGLE-SHOT OPTIMIZATION
    let optimizer = ProcurementOptimizer::new().with_deadline(Duration::from_secs(5));
    match optimizer.optimize(&suppliers, &forecast, &WeightVector::default()) {
        Ok(plan) => {
            println!(
                "Plan: {} suppliers, cost ${:.2}, carbon {:.2}",
                plan.suppliers_used, plan.total_cost, plan.carbon_emissions
            );
        }
        Err(e) => eprintln!("Optimization failed: {e}"),
    }

    // 3. PARETO FRONTIER
    let scanner = ParetoFrontierScanner::new(&optimizer);
    match scanner.compute_frontier(&suppliers, &forecast, 10, &cancel) {
        Ok(frontier) => {
            if let Err(e) = reporting::write_frontier("pareto_frontier.csv", &frontier) {
                eprintln!("Error writing frontier CSV: {e}");
            } else {
                println!("Frontier written to ./pareto_frontier.csv");
            }
        }
        Err(e) => eprintln!("Frontier scan failed: {e}"),
    }

    // 4. TAIL-RISK STRESS TEST
    let scenarios = vec![
        DisruptionScenario::new("port_closure", 5, 0.5, 0.1),
        DisruptionScenario::new("regional_outage", 12, 0.3, 0.05),
        DisruptionScenario::new("pandemic", 26, 0.7, 0.01),
    ];
    let policy = ReorderPolicy {
        order_qty: 1000.0,
        safety_stock: 500.0,
    };
    let tester = StressTester::new(1000, seed);
    match tester.run_stress_test(&scenarios, &policy, &cancel) {
        Ok(reports) => {
            println!("\n=== Stress Test ===");
            for r in &reports {
                println!(
                    "{}: expected ${:.0}, CVaR-95 ${:.0}, worst ${:.0}",
                    r.scenario, r.expected_cost, r.cvar_95, r.worst_case
                );
            }
            if let Err(e) = reporting::write_stress_report("stress_report.csv", &reports) {
                eprintln!("Error writing stress CSV: {e}");
            }
        }
        Err(e) => eprintln!("Stress test failed: {e}"),
    }

    // 5. SUPPLIER EQUILIBRIUM
    let game = SupplierGame::new(&suppliers, forecast.total_mean());
    match game.find_equilibrium(20) {
        Ok(outcome) => {
            println!(
                "\n=== Supplier Equilibrium (converged: {}, rounds: {}) ===",
                outcome.converged, outcome.rounds
            );
            for (id, strategy) in &outcome.strategies {
                println!(
                    "{id}: markup {:.0}%, allocation {:.0}%",
                    strategy.price_markup * 100.0,
                    strategy.capacity_allocation * 100.0
                );
            }
        }
        Err(e) => eprintln!("Equilibrium search failed: {e}"),
    }

    println!("\nDone.");
}
