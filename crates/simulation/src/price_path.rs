use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Reference price moving as geometric Brownian motion.
///
/// Used as an external price feed: the runner asks the admin to move official
/// pools towards it, which the engine only accepts after the trading cooldown.
#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    pub drift: f64,      // per-step drift (mu)
    pub volatility: f64, // per-step volatility (sigma)
    normal: Normal<f64>,
}

impl GeometricBrownianMotion {
    pub fn new(drift: f64, volatility: f64) -> Option<Self> {
        Some(Self {
            drift,
            volatility,
            normal: Normal::new(0.0, 1.0).ok()?,
        })
    }

    /// Next price after one step from `price`.
    pub fn step(&self, price: Decimal, rng: &mut StdRng) -> Decimal {
        let drift_term = self.drift - 0.5 * self.volatility.powi(2);
        let z = self.normal.sample(rng);
        let factor = (drift_term + self.volatility * z).exp();
        let current = price.to_f64().unwrap_or(0.0);
        Decimal::from_f64(current * factor)
            .unwrap_or(price)
            .round_dp(12)
    }
}
