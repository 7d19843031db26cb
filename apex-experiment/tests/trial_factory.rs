use std::collections::HashMap;

use apex_experiment::build_trials;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TIERS: [[f64; 3]; 3] = [[1.0, 1.5, 2.0], [4.0, 4.5, 5.0], [7.0, 7.5, 8.0]];

#[test]
fn count_is_combinations_times_whole_replicates() {
    let mut rng = StdRng::seed_from_u64(21);
    // 9 rewards x 3 bands = 27 combinations
    for (total, expected) in [(54, 54), (27, 27), (55, 54), (26, 0), (108, 108)] {
        let trials = build_trials(&mut rng, &TIERS, total, (0, 0), 20.0).expect("build");
        assert_eq!(trials.len(), expected, "total={total}");
    }
}

#[test]
fn every_combination_is_replicated_equally() {
    let mut rng = StdRng::seed_from_u64(23);
    let trials = build_trials(&mut rng, &TIERS, 54, (0, 0), 20.0).expect("build");

    let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
    for t in &trials {
        let key = (t.reward.to_bits(), t.original_bounds.lower.to_bits());
        *counts.entry(key).or_insert(0) += 1;
    }
    assert_eq!(counts.len(), 27);
    for (key, count) in counts {
        assert_eq!(count, 2, "combination {key:?} not replicated twice");
    }
}

#[test]
fn every_instance_is_jittered_at_the_fixed_width() {
    let mut rng = StdRng::seed_from_u64(25);
    let trials = build_trials(&mut rng, &TIERS, 54, (400, 600), 20.0).expect("build");
    for t in &trials {
        assert!((t.bounds.width() - 20.0).abs() < 1e-5);
        assert_eq!(t.random_delay_ms, (400, 600));
        // jitter keeps the band inside the original tier band here, since
        // the jitter width equals the tier width
        assert!(t.bounds.center() >= t.original_bounds.lower - 1e-9);
        assert!(t.bounds.center() <= t.original_bounds.upper + 1e-9);
    }
}

#[test]
fn shuffling_varies_between_seeds() {
    let a = build_trials(
        &mut StdRng::seed_from_u64(1),
        &TIERS,
        54,
        (0, 0),
        20.0,
    )
    .expect("build");
    let b = build_trials(
        &mut StdRng::seed_from_u64(2),
        &TIERS,
        54,
        (0, 0),
        20.0,
    )
    .expect("build");
    let rewards_a: Vec<f64> = a.iter().map(|t| t.reward).collect();
    let rewards_b: Vec<f64> = b.iter().map(|t| t.reward).collect();
    assert_ne!(rewards_a, rewards_b, "two seeds produced identical orders");
}
