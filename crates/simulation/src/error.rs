//! Errors raised while building or running a simulation.

use thiserror::Error;
use vamm_domain::error::{AmmError, LedgerError};

/// Simulation failure. Rejected trades are counted, not raised.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("scenario setup failed: {0}")]
    Setup(#[from] AmmError),
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LedgerError> for SimulationError {
    fn from(err: LedgerError) -> Self {
        Self::Setup(AmmError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
