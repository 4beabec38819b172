// src/model/catalog.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Apparel,
    Food,
    Industrial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Na,
    Eu,
    Apac,
    Latam,
}

/// A stock-keeping unit as produced by the catalog generator.
/// Immutable once created; the numeric components only borrow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub id: String,
    pub category: Category,
    pub base_demand: f64,
    pub demand_volatility: f64,
}

/// A supplier record. `reliability` is in [0, 1], `carbon_intensity` is
/// emissions per unit ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub region: Region,
    pub base_price: f64,
    pub capacity: f64,
    pub reliability: f64,
    pub carbon_intensity: f64,
}

/// Per-SKU demand forecast: an ordered sequence of per-period estimates.
///
/// Backed by a BTreeMap so iteration order is the SKU id order, which keeps
/// every aggregate we compute from it reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemandForecast {
    pub per_sku: BTreeMap<String, Vec<f64>>,
}

impl DemandForecast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sku_id: impl Into<String>, periods: Vec<f64>) {
        self.per_sku.insert(sku_id.into(), periods);
    }

    /// Mean demand of one SKU's forecast, 0.0 for an empty series.
    pub fn sku_mean(periods: &[f64]) -> f64 {
        if periods.is_empty() {
            return 0.0;
        }
        periods.iter().sum::<f64>() / periods.len() as f64
    }

    /// Aggregate mean demand across all SKUs. This is the quantity the
    /// optimizer's service-level floor is measured against.
    pub fn total_mean(&self) -> f64 {
        self.per_sku.values().map(|p| Self::sku_mean(p)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_sku.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_total_mean_aggregates_across_skus() {
        let mut forecast = DemandForecast::new();
        forecast.insert("SKU_000", vec![100.0, 200.0, 300.0]);
        forecast.insert("SKU_001", vec![50.0, 50.0]);
        assert!((forecast.total_mean() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn forecast_mean_of_empty_series_is_zero() {
        assert_eq!(DemandForecast::sku_mean(&[]), 0.0);
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Electronics).unwrap();
        assert_eq!(json, "\"electronics\"");
    }
}
