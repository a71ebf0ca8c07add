//! Trade size distributions.
//!
//! Sizes are vCash notionals; the generator converts them into an input
//! amount at the input pool's current price.

use rand::rngs::StdRng;
use rand_distr::{Distribution, LogNormal};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Draws the vCash notional of the next trade.
pub trait TradeSizeModel {
    fn next_size(&mut self, rng: &mut StdRng) -> Decimal;
}

/// Every trade has the same notional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantSize {
    pub notional: Decimal,
}

impl ConstantSize {
    #[must_use]
    pub fn new(notional: Decimal) -> Self {
        Self { notional }
    }
}

impl TradeSizeModel for ConstantSize {
    fn next_size(&mut self, _rng: &mut StdRng) -> Decimal {
        self.notional
    }
}

/// Log-normally distributed notionals: many small trades, occasional large ones.
#[derive(Debug, Clone)]
pub struct LogNormalSize {
    distribution: LogNormal<f64>,
    cap: Option<Decimal>,
}

impl LogNormalSize {
    /// `median` is the median notional, `sigma` the standard deviation of its logarithm.
    pub fn new(median: Decimal, sigma: f64) -> Result<Self> {
        let median = median
            .to_f64()
            .filter(|value| *value > 0.0)
            .ok_or_else(|| SimulationError::InvalidScenario("median trade size must be positive".into()))?;
        let distribution = LogNormal::new(median.ln(), sigma)
            .map_err(|err| SimulationError::InvalidScenario(format!("trade size distribution: {err}")))?;
        Ok(Self {
            distribution,
            cap: None,
        })
    }

    /// Clamps every draw to at most `cap`.
    #[must_use]
    pub fn with_cap(mut self, cap: Decimal) -> Self {
        self.cap = Some(cap);
        self
    }
}

impl TradeSizeModel for LogNormalSize {
    fn next_size(&mut self, rng: &mut StdRng) -> Decimal {
        let draw = Decimal::from_f64(self.distribution.sample(rng))
            .unwrap_or(Decimal::ZERO)
            .round_dp(6);
        match self.cap {
            Some(cap) => draw.min(cap),
            None => draw,
        }
    }
}

/// Serializable choice of size model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TradeSizeSpec {
    Constant {
        notional: Decimal,
    },
    LogNormal {
        median: Decimal,
        sigma: f64,
        #[serde(default)]
        cap: Option<Decimal>,
    },
}

impl TradeSizeSpec {
    pub fn build(&self) -> Result<Box<dyn TradeSizeModel>> {
        Ok(match self {
            Self::Constant { notional } => Box::new(ConstantSize::new(*notional)),
            Self::LogNormal { median, sigma, cap } => {
                let model = LogNormalSize::new(*median, *sigma)?;
                Box::new(match cap {
                    Some(cap) => model.with_cap(*cap),
                    None => model,
                })
            }
        })
    }
}

impl TradeSizeModel for Box<dyn TradeSizeModel> {
    fn next_size(&mut self, rng: &mut StdRng) -> Decimal {
        self.as_mut().next_size(rng)
    }
}
