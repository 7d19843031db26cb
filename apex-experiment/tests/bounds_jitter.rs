use apex_core::BandTier;
use apex_experiment::jitter;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn jitter_preserves_width_across_all_tiers() {
    let mut rng = StdRng::seed_from_u64(3);
    for tier in BandTier::ALL {
        let band = tier.bounds();
        for _ in 0..10_000 {
            let jittered = jitter::jitter(&mut rng, band, band.width()).expect("jitter");
            assert!(
                (jittered.width() - band.width()).abs() < 1e-5,
                "width {} != {} for {:?}",
                jittered.width(),
                band.width(),
                tier
            );
        }
    }
}

#[test]
fn jittered_center_stays_inside_the_clamped_candidate_range() {
    let mut rng = StdRng::seed_from_u64(5);
    for tier in BandTier::ALL {
        let band = tier.bounds();
        let width = band.width();
        let half = width / 2.0;
        let variance = 0.1 * width;
        let lo = (band.center() - half - variance).max(band.lower);
        let hi = (band.center() + half + variance).min(band.upper);
        for _ in 0..1_000 {
            let jittered = jitter::jitter(&mut rng, band, width).expect("jitter");
            let c = jittered.center();
            assert!(c >= lo - 1e-9 && c <= hi + 1e-9, "center {c} escaped [{lo}, {hi}]");
        }
    }
}

#[test]
fn narrower_width_than_band_is_honored() {
    let mut rng = StdRng::seed_from_u64(9);
    let band = BandTier::Easy.bounds();
    for _ in 0..1_000 {
        let jittered = jitter::jitter(&mut rng, band, 10.0).expect("jitter");
        assert!((jittered.width() - 10.0).abs() < 1e-5);
    }
}
