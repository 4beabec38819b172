// src/io/reporting.rs

use crate::optimization::pareto::{FrontierOutcome, FrontierPoint};
use crate::simulation::stress::ScenarioReport;
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Flat CSV row for one frontier point.
#[derive(Debug, Serialize)]
struct FrontierRow {
    cost_weight: f64,
    carbon_weight: f64,
    status: &'static str,
    total_cost: f64,
    carbon_emissions: f64,
    suppliers_used: usize,
}

/// Writes the Pareto frontier to a CSV file, one row per swept weight.
/// Infeasible points keep their row with zeroed metrics.
pub fn write_frontier(file_path: &str, points: &[FrontierPoint]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for point in points {
        let row = match &point.outcome {
            FrontierOutcome::Feasible(plan) => FrontierRow {
                cost_weight: point.weights.cost,
                carbon_weight: point.weights.carbon,
                status: "feasible",
                total_cost: plan.total_cost,
                carbon_emissions: plan.carbon_emissions,
                suppliers_used: plan.suppliers_used,
            },
            FrontierOutcome::Infeasible { .. } => FrontierRow {
                cost_weight: point.weights.cost,
                carbon_weight: point.weights.carbon,
                status: "infeasible",
                total_cost: 0.0,
                carbon_emissions: 0.0,
                suppliers_used: 0,
            },
        };
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a stress-test report to a CSV file, one row per scenario.
pub fn write_stress_report(
    file_path: &str,
    reports: &[ScenarioReport],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for report in reports {
        wtr.serialize(report)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::procurement::WeightVector;

    #[test]
    fn frontier_csv_has_one_row_per_point() {
        let points = vec![
            FrontierPoint {
                weights: WeightVector {
                    cost: 0.1,
                    carbon: 0.9,
                },
                outcome: FrontierOutcome::Infeasible { shortfall: 42.0 },
            },
            FrontierPoint {
                weights: WeightVector {
                    cost: 0.9,
                    carbon: 0.1,
                },
                outcome: FrontierOutcome::Infeasible { shortfall: 42.0 },
            },
        ];
        let dir = std::env::temp_dir().join("procurement_engine_frontier_test.csv");
        let path = dir.to_str().unwrap();
        write_frontier(path, &points).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        // Header plus two data rows.
        assert_eq!(contents.lines().count(), 3);
        std::fs::remove_file(path).ok();
    }
}
