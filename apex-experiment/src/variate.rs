use std::f64::consts::TAU;

use rand::Rng;

use crate::error::{Error, Result};

/// Retry cap for rejection resampling; the draw is abandoned past this.
const MAX_RESAMPLES: u32 = 1000;

/// Bounded, mean-biased random draw in `[min, max]`.
///
/// Box–Muller normal squeezed onto the unit interval, rejection-sampled back
/// into it, raised to `skew`, then mapped onto the requested range. The
/// result clusters around the midpoint for `skew == 1.0`.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, skew: f64) -> Result<f64> {
    for _ in 0..MAX_RESAMPLES {
        let u = nonzero_unit(rng);
        let v = nonzero_unit(rng);
        let z = (-2.0 * u.ln()).sqrt() * (TAU * v).cos();
        let unit = z / 10.0 + 0.5;
        if !(0.0..=1.0).contains(&unit) {
            continue;
        }
        return Ok(unit.powf(skew) * (max - min) + min);
    }
    Err(Error::SamplingExhausted {
        attempts: MAX_RESAMPLES,
    })
}

/// Uniform draw with exact zeros redrawn, keeping `ln` finite.
fn nonzero_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let x: f64 = rng.random();
        if x > 0.0 {
            return x;
        }
    }
}
