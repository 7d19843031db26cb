use apex_core::Bounds;
use rand::Rng;

use crate::error::Result;
use crate::variate;

/// Re-centers a band of fixed `width` near the original center.
///
/// The candidate center range extends half a width plus 10% variance to each
/// side, clamped back into the original band. The returned band always has
/// exactly `width`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, width: f64) -> Result<Bounds> {
    let center = bounds.center();
    let variance = 0.1 * width;
    let half = width / 2.0;
    let lo = (center - half - variance).max(bounds.lower);
    let hi = (center + half + variance).min(bounds.upper);
    let new_center = variate::sample(rng, lo, hi, 1.0)?;
    Ok(Bounds::new(new_center - half, new_center + half))
}
