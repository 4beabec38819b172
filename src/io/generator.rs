// src/io/generator.rs

use crate::error::{EngineError, EngineResult};
use crate::model::catalog::{Category, DemandForecast, Region, Sku, Supplier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution, Gamma, LogNormal};

const CATEGORIES: [Category; 4] = [
    Category::Electronics,
    Category::Apparel,
    Category::Food,
    Category::Industrial,
];

const REGIONS: [Region; 4] = [Region::Na, Region::Eu, Region::Apac, Region::Latam];

/// Synthetic catalog and demand generator. All draws come from one seeded
/// RNG owned by the generator, so a seed fully determines the dataset.
pub struct CatalogGenerator {
    rng: StdRng,
}

impl CatalogGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `n` SKU records. Base demand is heavy-tailed (log-normal);
    /// volatility stays well inside (0, 1).
    pub fn generate_skus(&mut self, n: usize) -> EngineResult<Vec<Sku>> {
        let base_demand = LogNormal::new(8.0, 1.5)
            .map_err(|e| EngineError::InvalidInput(format!("sku demand distribution: {e}")))?;
        let mut skus = Vec::with_capacity(n);
        for i in 0..n {
            skus.push(Sku {
                id: format!("SKU_{i:03}"),
                category: CATEGORIES[self.rng.gen_range(0..CATEGORIES.len())],
                base_demand: base_demand.sample(&mut self.rng),
                demand_volatility: self.rng.gen_range(0.1..0.4),
            });
        }
        Ok(skus)
    }

    /// Generate `n` supplier records. Reliability is beta-distributed and
    /// clipped to [0.7, 0.99]; price carries a reliability premium.
    pub fn generate_suppliers(&mut self, n: usize) -> EngineResult<Vec<Supplier>> {
        let reliability_dist: Beta<f64> = Beta::new(7.0, 2.0)
            .map_err(|e| EngineError::InvalidInput(format!("reliability distribution: {e}")))?;
        let price_dist = LogNormal::new(2.0, 0.5)
            .map_err(|e| EngineError::InvalidInput(format!("price distribution: {e}")))?;
        let capacity_dist = LogNormal::new(10.0, 1.0)
            .map_err(|e| EngineError::InvalidInput(format!("capacity distribution: {e}")))?;
        let carbon_dist = LogNormal::new(0.0, 0.5)
            .map_err(|e| EngineError::InvalidInput(format!("carbon distribution: {e}")))?;

        let mut suppliers = Vec::with_capacity(n);
        for i in 0..n {
            let reliability = reliability_dist.sample(&mut self.rng).clamp(0.7, 0.99);
            suppliers.push(Supplier {
                id: format!("SUP_{i:03}"),
                region: REGIONS[self.rng.gen_range(0..REGIONS.len())],
                base_price: price_dist.sample(&mut self.rng) * (1.0 + (reliability - 0.8) * 2.0),
                capacity: capacity_dist.sample(&mut self.rng),
                reliability,
                carbon_intensity: carbon_dist.sample(&mut self.rng),
            });
        }
        Ok(suppliers)
    }

    /// Per-SKU forecast: base demand scaled by unit-mean gamma noise, so a
    /// volatile SKU gets a rougher series without drifting on average.
    pub fn generate_forecast(&mut self, skus: &[Sku], n_periods: usize) -> EngineResult<DemandForecast> {
        if n_periods == 0 {
            return Err(EngineError::InvalidInput("n_periods must be > 0".into()));
        }
        let mut forecast = DemandForecast::new();
        for sku in skus {
            let vol_sq = sku.demand_volatility * sku.demand_volatility;
            let noise = Gamma::new(1.0 / vol_sq, vol_sq)
                .map_err(|e| EngineError::InvalidInput(format!("demand noise: {e}")))?;
            let series: Vec<f64> = (0..n_periods)
                .map(|_| (sku.base_demand * noise.sample(&mut self.rng)).max(0.0))
                .collect();
            forecast.insert(sku.id.clone(), series);
        }
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_records_satisfy_catalog_invariants() {
        let mut gen = CatalogGenerator::new(99);
        let skus = gen.generate_skus(20).unwrap();
        assert_eq!(skus.len(), 20);
        for sku in &skus {
            assert!(sku.base_demand > 0.0);
            assert!(sku.demand_volatility > 0.0 && sku.demand_volatility < 1.0);
        }

        let suppliers = gen.generate_suppliers(10).unwrap();
        assert_eq!(suppliers.len(), 10);
        for s in &suppliers {
            assert!(s.base_price > 0.0);
            assert!(s.capacity >= 0.0);
            // Reliability is clamped to [0.7, 0.99] after the beta draw.
            assert!((0.7..=0.99).contains(&s.reliability));
            assert!(s.carbon_intensity >= 0.0);
        }
    }

    #[test]
    fn same_seed_generates_same_catalog() {
        let a = CatalogGenerator::new(5).generate_suppliers(8).unwrap();
        let b = CatalogGenerator::new(5).generate_suppliers(8).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn forecast_covers_every_sku_for_every_period() {
        let mut gen = CatalogGenerator::new(1);
        let skus = gen.generate_skus(4).unwrap();
        let forecast = gen.generate_forecast(&skus, 12).unwrap();
        assert_eq!(forecast.per_sku.len(), 4);
        for series in forecast.per_sku.values() {
            assert_eq!(series.len(), 12);
            assert!(series.iter().all(|d| *d >= 0.0));
        }
    }
}
