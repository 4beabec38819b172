//! Procurement decision engine: a constrained cost/carbon optimizer, a
//! Pareto frontier scanner, a Monte Carlo tail-risk (CVaR) simulator and a
//! supplier-pricing equilibrium solver over a shared supplier catalog.
//!
//! Every component is a synchronous, CPU-bound computation with explicit
//! randomness: repeated calls with the same seed are bitwise reproducible.

pub mod cancel;
pub mod error;
pub mod io;
pub mod model;
pub mod optimization;
pub mod simulation;

pub use cancel::CancelToken;
pub use error::{EngineError, EngineResult};
