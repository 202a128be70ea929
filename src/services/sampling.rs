//! Random variate generators used by the domain scorer.
//!
//! Every generator takes the uniform source as a parameter so callers can
//! substitute a seeded generator for reproducible tests.

use rand::Rng;
use std::f64::consts::PI;

/// Returned by [`gamma`] for a non-positive shape.
pub const GAMMA_DEGENERATE_VALUE: f64 = 0.001;

/// Minimum shape accepted by [`beta`].
pub const BETA_MIN_PARAM: f64 = 0.001;

/// Rejection-loop cap for the Marsaglia-Tsang sampler.
pub const GAMMA_MAX_ITERATIONS: usize = 1000;

/// Uniform draw in `(0, 1]`; zero is redrawn so the result is safe for `ln`.
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.gen();
        if u > 0.0 {
            return u;
        }
    }
}

/// Standard normal draw via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// Gamma(`shape`, `scale`) draw.
///
/// Shapes below one are boosted: a Gamma(`shape + 1`) draw is scaled by
/// `u^(1/shape)`. Otherwise Marsaglia-Tsang is used, capped at
/// [`GAMMA_MAX_ITERATIONS`] attempts after which the mean `shape * scale` is
/// returned.
pub fn gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> f64 {
    if shape.is_nan() || shape <= 0.0 {
        return GAMMA_DEGENERATE_VALUE;
    }

    if shape < 1.0 {
        let boosted = gamma(rng, shape + 1.0, scale);
        let u = open_unit(rng);
        return boosted * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    for _ in 0..GAMMA_MAX_ITERATIONS {
        let (x, v) = loop {
            let x = standard_normal(rng);
            let t = 1.0 + c * x;
            if t > 0.0 {
                break (x, t * t * t);
            }
        };

        let u = open_unit(rng);
        let x2 = x * x;
        if u < 1.0 - 0.0331 * x2 * x2 || u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
            return d * v * scale;
        }
    }

    tracing::debug!(shape, scale, "gamma sampler hit iteration cap, returning mean");
    shape * scale
}

/// Beta(`alpha`, `beta`) draw in `[0, 1]`.
///
/// Both parameters are clamped to at least [`BETA_MIN_PARAM`].
pub fn beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    let alpha = if alpha.is_nan() { BETA_MIN_PARAM } else { alpha.max(BETA_MIN_PARAM) };
    let beta = if beta.is_nan() { BETA_MIN_PARAM } else { beta.max(BETA_MIN_PARAM) };

    let ga = gamma(rng, alpha, 1.0);
    let gb = gamma(rng, beta, 1.0);
    let sum = ga + gb;

    if sum == 0.0 || !sum.is_finite() {
        0.5
    } else {
        (ga / sum).clamp(0.0, 1.0)
    }
}
