// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::types::FixedHash;
use serde::{Deserialize, Serialize};

use crate::{
    forest::{append_leaves, tree_height},
    hashing::proof_root,
    MAX_FOREST_HEIGHT,
};

/// An append-only accumulator over the chain's block indices, one leaf per
/// block. Uses the same forest layout as [`crate::ElementForest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryAccumulator {
    #[serde(with = "crate::serde_support::hash_slots")]
    trees: [FixedHash; MAX_FOREST_HEIGHT],
    num_leaves: u64,
}

impl Default for HistoryAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryAccumulator {
    pub fn new() -> Self {
        HistoryAccumulator {
            trees: [FixedHash::zero(); MAX_FOREST_HEIGHT],
            num_leaves: 0,
        }
    }

    /// Number of blocks recorded, equal to the height of the tip plus one.
    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    pub fn has_tree_at_height(&self, height: usize) -> bool {
        height < MAX_FOREST_HEIGHT && self.num_leaves & (1 << height) != 0
    }

    /// Whether the block with the given leaf hash and path is recorded.
    pub fn contains_leaf(&self, leaf_hash: FixedHash, leaf_index: u64, proof: &[FixedHash]) -> bool {
        self.has_tree_at_height(proof.len()) && self.trees[proof.len()] == proof_root(leaf_hash, leaf_index, proof)
    }

    /// Appends one block's leaf, returning its placement and the proof
    /// growth for holders of older block proofs.
    pub fn apply_block(&mut self, leaf_hash: FixedHash) -> HistoryApplyUpdate {
        let append = append_leaves(&mut self.trees, &mut self.num_leaves, &[leaf_hash]);
        let (leaf_index, proof) = append
            .placements
            .into_iter()
            .next()
            .expect("append of one leaf produced no placement");
        HistoryApplyUpdate {
            leaf_index,
            proof,
            tree_growth: append.tree_growth,
        }
    }

    /// Builds the rollback record for the most recent block. Must be called
    /// on the snapshot from *before* that block; the accumulator itself is
    /// not mutated.
    pub fn revert_block(&self) -> HistoryRevertUpdate {
        HistoryRevertUpdate {
            num_leaves: self.num_leaves,
        }
    }
}

/// Record of one appended block leaf.
#[derive(Clone, Debug)]
pub struct HistoryApplyUpdate {
    leaf_index: u64,
    proof: Vec<FixedHash>,
    tree_growth: Vec<Vec<FixedHash>>,
}

impl HistoryApplyUpdate {
    /// The leaf index assigned to the applied block (its height).
    pub fn leaf_index(&self) -> u64 {
        self.leaf_index
    }

    /// The authentication path of the applied block's leaf.
    pub fn proof(&self) -> &[FixedHash] {
        &self.proof
    }

    /// Extends an older block proof across this append.
    ///
    /// Panics if the leaf was not already recorded.
    pub fn update_proof(&self, leaf_index: u64, proof: &mut Vec<FixedHash>) {
        assert!(
            leaf_index < self.leaf_index,
            "cannot update proof for a block the history does not contain",
        );
        proof.extend_from_slice(&self.tree_growth[proof.len()]);
    }
}

/// Record of one reverted block leaf.
#[derive(Clone, Debug)]
pub struct HistoryRevertUpdate {
    num_leaves: u64,
}

impl HistoryRevertUpdate {
    /// Count of blocks in the restored history.
    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    /// Rolls a block proof back across the reverted append.
    ///
    /// Panics if the block does not exist in the restored history.
    pub fn update_proof(&self, leaf_index: u64, proof: &mut Vec<FixedHash>) {
        assert!(
            leaf_index < self.num_leaves,
            "cannot revert proof for a block the history does not contain",
        );
        proof.truncate(tree_height(self.num_leaves, leaf_index));
    }
}
