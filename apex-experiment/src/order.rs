use apex_core::BlockType::{NarrowAsync as N, Sync as S, WideAsync as W};
use apex_core::{BlockOrder, BlockType};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

/// One pair-ordering per permutation of the three delay regimes.
const ORDERINGS: [[BlockType; 6]; 6] = [
    [S, S, N, N, W, W],
    [S, S, W, W, N, N],
    [N, N, S, S, W, W],
    [N, N, W, W, S, S],
    [W, W, S, S, N, N],
    [W, W, N, N, S, S],
];

/// Hand-curated assignment for enrolled participants.
fn assigned_ordering(participant_id: &str) -> Option<[BlockType; 6]> {
    let idx = match participant_id {
        "S01" | "S07" | "S13" | "S19" => 0,
        "S02" | "S08" | "S14" | "S20" => 1,
        "S03" | "S09" | "S15" | "P01" => 2,
        "S04" | "S10" | "S16" | "P02" => 3,
        "S05" | "S11" | "S17" => 4,
        "S06" | "S12" | "S18" => 5,
        _ => return None,
    };
    Some(ORDERINGS[idx])
}

/// Block sequence for a participant.
///
/// Known IDs get their assigned ordering; anyone else draws a uniform
/// permutation of the six block slots. Either way the sequence holds exactly
/// two blocks of each regime and is locked in here.
pub fn resolve_order<R: Rng + ?Sized>(participant_id: &str, rng: &mut R) -> BlockOrder {
    if let Some(fixed) = assigned_ordering(participant_id) {
        info!(participant_id, "using assigned block ordering");
        return BlockOrder::new(fixed.to_vec());
    }
    let mut slots = vec![S, S, N, N, W, W];
    slots.shuffle(rng);
    info!(
        participant_id,
        "participant not in assignment table, randomized ordering"
    );
    BlockOrder::new(slots)
}
