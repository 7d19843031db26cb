use serde::{Deserialize, Serialize};

/// Tap-delay regime shared by every trial of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    Sync,
    NarrowAsync,
    WideAsync,
}

impl BlockType {
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Sync => "sync",
            BlockType::NarrowAsync => "narrow-async",
            BlockType::WideAsync => "wide-async",
        }
    }
}

/// Per-participant block sequence, locked in when the participant ID is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOrder(Vec<BlockType>);

impl BlockOrder {
    pub fn new(blocks: Vec<BlockType>) -> Self {
        Self(blocks)
    }

    pub fn blocks(&self) -> &[BlockType] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count_of(&self, kind: BlockType) -> usize {
        self.0.iter().filter(|b| **b == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_of_tallies_each_regime() {
        let order = BlockOrder::new(vec![
            BlockType::Sync,
            BlockType::NarrowAsync,
            BlockType::Sync,
            BlockType::WideAsync,
        ]);
        assert_eq!(order.len(), 4);
        assert_eq!(order.count_of(BlockType::Sync), 2);
        assert_eq!(order.count_of(BlockType::NarrowAsync), 1);
        assert_eq!(order.count_of(BlockType::WideAsync), 1);
    }
}
