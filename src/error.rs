// src/error.rs

use thiserror::Error;

/// Errors shared by all numeric components.
///
/// Non-convergence of the equilibrium solver is deliberately NOT an error:
/// it is reported as a flag on an otherwise valid result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The optimizer's constraint set cannot satisfy the service-level
    /// floor. Carries the demand shortfall in units.
    #[error("infeasible: demand floor misses by {shortfall:.2} units")]
    Infeasible { shortfall: f64 },

    /// A solve or simulation exceeded its deadline.
    #[error("deadline exceeded")]
    Timeout,

    /// Input validation failed at the call boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller requested early exit via a cancellation token.
    #[error("cancelled")]
    Cancelled,
}

pub type EngineResult<T> = Result<T, EngineError>;
