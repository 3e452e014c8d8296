use crate::market::objects::VolatilityClass;
use crate::market::random::RandomSource;

pub const RSI_MIN: f64 = 10.0;
pub const RSI_MAX: f64 = 90.0;
pub const STOCHASTIC_MIN: f64 = 5.0;
pub const STOCHASTIC_MAX: f64 = 95.0;

/// Next price in the simulated walk. The base step for the instrument's
/// quote scale is jittered by a uniform multiplier, then the price is
/// perturbed by a signed uniform fraction of that step. No floor or
/// ceiling is applied.
pub fn next_price(current: f64, class: VolatilityClass, rng: &mut dyn RandomSource) -> f64 {
    let step = class.base_step() * rng.uniform(0.8, 1.2);
    current + rng.uniform(-0.5, 0.5) * step
}

/// Bounded random walk for the simulated RSI. Not derived from price.
pub fn next_rsi(previous: f64, rng: &mut dyn RandomSource) -> f64 {
    (previous + rng.uniform(-2.5, 2.5)).clamp(RSI_MIN, RSI_MAX)
}

/// Bounded random walk for the simulated stochastic oscillator.
pub fn next_stochastic(previous: f64, rng: &mut dyn RandomSource) -> f64 {
    (previous + rng.uniform(-4.0, 4.0)).clamp(STOCHASTIC_MIN, STOCHASTIC_MAX)
}
