pub mod generator;
pub mod reporting;
