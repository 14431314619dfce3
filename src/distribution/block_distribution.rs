//! Per-rank element bookkeeping for block and block-cyclic layouts.

use serde::{Deserialize, Serialize};

/// Contiguous distribution descriptor: per-rank element counts together with
/// their exclusive prefix-sum offsets. Rank `r` owns the global index range
/// `[offset(r), offset(r) + count(r))`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDistribution {
    counts: Vec<usize>,
    offsets: Vec<usize>,
}

impl BlockDistribution {
    pub fn from_counts(counts: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(counts.len());
        let mut cursor = 0;
        for &count in &counts {
            offsets.push(cursor);
            cursor += count;
        }
        BlockDistribution { counts, offsets }
    }

    pub fn num_ranks(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    pub fn offset(&self, rank: usize) -> usize {
        self.offsets[rank]
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Round-robin (stride-1 block-cyclic) owner map: item `i` belongs to rank
/// `i mod num_ranks`, independent of any contiguous distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCyclic {
    num_ranks: usize,
}

impl BlockCyclic {
    pub fn new(num_ranks: usize) -> Self {
        assert!(num_ranks > 0, "a distribution needs at least one rank");
        BlockCyclic { num_ranks }
    }

    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    pub fn owner(&self, item: usize) -> usize {
        item % self.num_ranks
    }
}
