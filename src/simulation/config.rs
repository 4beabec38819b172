// src/simulation/config.rs

/// Cost rates and demand-shape parameters for the tail-risk simulator.
/// These are configuration, not policy: a run holds them fixed.
#[derive(Debug, Clone)]
pub struct StressConfig {
    pub n_periods: usize,
    /// Cost per unit of supply brought in each period.
    pub procurement_rate: f64,
    /// Cost per unit of inventory carried per period.
    pub holding_rate: f64,
    /// Penalty per unit of demand lost to a stockout.
    pub stockout_rate: f64,
    /// Log-normal demand shape (mean and std dev of the underlying normal).
    pub demand_mu: f64,
    pub demand_sigma: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            n_periods: 52,
            procurement_rate: 25.0,
            holding_rate: 0.1,
            stockout_rate: 50.0,
            demand_mu: 7.0,
            demand_sigma: 0.5,
        }
    }
}
