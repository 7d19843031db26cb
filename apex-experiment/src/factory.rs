use apex_core::{BandTier, TrialParameterSet};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::jitter;

/// Factorial trial plan for one block.
///
/// Crosses every reward amount (three per tier, three tiers) with the three
/// acceptance bands, replicates each combination `total / combinations`
/// times, jitters every instance independently at the fixed width, and
/// shuffles the whole list. The indivisible remainder of `total` is dropped.
pub fn build_trials<R: Rng + ?Sized>(
    rng: &mut R,
    reward_tiers: &[[f64; 3]; 3],
    total: usize,
    random_delay_ms: (u64, u64),
    jitter_width: f64,
) -> Result<Vec<TrialParameterSet>> {
    let rewards: Vec<f64> = reward_tiers.iter().flatten().copied().collect();
    let combinations = rewards.len() * BandTier::ALL.len();
    let replicates = total / combinations;
    if total % combinations != 0 {
        debug!(
            total,
            combinations,
            kept = combinations * replicates,
            "trial count not divisible by combination count, dropping remainder"
        );
    }

    let mut trials = Vec::with_capacity(combinations * replicates);
    for &reward in &rewards {
        for tier in BandTier::ALL {
            let original = tier.bounds();
            for _ in 0..replicates {
                let bounds = jitter::jitter(rng, original, jitter_width)?;
                trials.push(TrialParameterSet {
                    reward,
                    bounds,
                    original_bounds: original,
                    random_delay_ms,
                });
            }
        }
    }
    trials.shuffle(rng);
    Ok(trials)
}
