// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::types::FixedHash;
use serde::{Deserialize, Serialize};

use crate::{
    hashing::{node_hash, proof_root},
    MAX_FOREST_HEIGHT,
};

/// Where an element's leaf lives. Elements created and spent within the
/// same block are never written to the forest and stay `Ephemeral`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafPosition {
    Real(u64),
    Ephemeral,
}

impl LeafPosition {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, LeafPosition::Ephemeral)
    }

    /// The concrete leaf index. Panics on ephemeral positions; callers must
    /// branch on ephemerality before asking for an index.
    pub fn index(&self) -> u64 {
        match self {
            LeafPosition::Real(index) => *index,
            LeafPosition::Ephemeral => panic!("ephemeral leaves have no index"),
        }
    }
}

/// A leaf whose hash changes in a block (spend, revision or resolution),
/// carrying the new hash and a copy of its current authentication path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedLeaf {
    pub leaf_index: u64,
    pub hash: FixedHash,
    pub proof: Vec<FixedHash>,
}

/// A leaf created by a block. Ephemeral leaves are skipped entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLeaf {
    pub hash: FixedHash,
    pub ephemeral: bool,
}

/// The position and authentication path assigned to one created leaf,
/// returned in the same order the created leaves were supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafPlacement {
    pub position: LeafPosition,
    pub proof: Vec<FixedHash>,
}

/// The height of the tree containing `leaf_index` in a forest of
/// `num_leaves` leaves. Requires `leaf_index < num_leaves`.
pub fn tree_height(num_leaves: u64, leaf_index: u64) -> usize {
    debug_assert!(leaf_index < num_leaves);
    (64 - (num_leaves ^ leaf_index).leading_zeros() - 1) as usize
}

/// An authenticated set of state elements, arranged as one perfect Merkle
/// tree per set bit of `num_leaves`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementForest {
    #[serde(with = "crate::serde_support::hash_slots")]
    trees: [FixedHash; MAX_FOREST_HEIGHT],
    num_leaves: u64,
}

impl Default for ElementForest {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementForest {
    pub fn new() -> Self {
        ElementForest {
            trees: [FixedHash::zero(); MAX_FOREST_HEIGHT],
            num_leaves: 0,
        }
    }

    /// Monotone count of leaves ever written to the forest.
    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    pub fn has_tree_at_height(&self, height: usize) -> bool {
        height < MAX_FOREST_HEIGHT && self.num_leaves & (1 << height) != 0
    }

    /// The root of the tree at `height`. Only meaningful when
    /// `has_tree_at_height(height)` holds.
    pub fn root_at_height(&self, height: usize) -> FixedHash {
        self.trees[height]
    }

    /// Whether a leaf with the given hash and path is present. The path
    /// length identifies the tree; its folded root must match that tree.
    pub fn contains_leaf(&self, leaf_hash: FixedHash, leaf_index: u64, proof: &[FixedHash]) -> bool {
        self.has_tree_at_height(proof.len()) && self.trees[proof.len()] == proof_root(leaf_hash, leaf_index, proof)
    }

    /// Applies one block's worth of changes: re-hashes the updated leaves in
    /// place, then appends the created leaves (skipping ephemeral ones).
    /// Returns the update record for external proof holders and the
    /// placement assigned to each created leaf, in supply order.
    pub fn apply_block(
        &mut self,
        updated: Vec<UpdatedLeaf>,
        created: &[NewLeaf],
    ) -> (ElementApplyUpdate, Vec<LeafPlacement>) {
        let old_num_leaves = self.num_leaves;

        let mut per_height: Vec<Vec<UpdatedLeaf>> = (0..MAX_FOREST_HEIGHT).map(|_| Vec::new()).collect();
        for leaf in updated {
            debug_assert!(self.has_tree_at_height(leaf.proof.len()));
            per_height[leaf.proof.len()].push(leaf);
        }
        for (height, leaves) in per_height.iter_mut().enumerate() {
            if leaves.is_empty() {
                continue;
            }
            leaves.sort_by_key(|l| l.leaf_index);
            self.trees[height] = update_tree_root(leaves, height);
        }

        let hashes: Vec<FixedHash> = created.iter().filter(|c| !c.ephemeral).map(|c| c.hash).collect();
        let append = append_leaves(&mut self.trees, &mut self.num_leaves, &hashes);

        let mut assigned = append.placements.into_iter();
        let placements = created
            .iter()
            .map(|c| {
                if c.ephemeral {
                    LeafPlacement {
                        position: LeafPosition::Ephemeral,
                        proof: Vec::new(),
                    }
                } else {
                    let (leaf_index, proof) = assigned
                        .next()
                        .expect("append assigned fewer placements than created leaves");
                    LeafPlacement {
                        position: LeafPosition::Real(leaf_index),
                        proof,
                    }
                }
            })
            .collect();

        let update = ElementApplyUpdate {
            updated: per_height,
            tree_growth: append.tree_growth,
            old_num_leaves,
        };
        (update, placements)
    }

    /// Builds the record that rolls external proofs back across a block.
    /// Must be called on the forest snapshot from *before* that block; the
    /// forest itself is not mutated. The updated leaves carry their
    /// pre-block hashes and paths.
    pub fn revert_block(&self, updated: Vec<UpdatedLeaf>) -> ElementRevertUpdate {
        let mut per_height: Vec<Vec<UpdatedLeaf>> = (0..MAX_FOREST_HEIGHT).map(|_| Vec::new()).collect();
        for leaf in updated {
            debug_assert!(self.has_tree_at_height(leaf.proof.len()));
            per_height[leaf.proof.len()].push(leaf);
        }
        ElementRevertUpdate {
            updated: per_height,
            num_leaves: self.num_leaves,
        }
    }
}

/// Record of one forward step, folded into long-lived proofs.
#[derive(Clone, Debug)]
pub struct ElementApplyUpdate {
    // updated leaves grouped by tree height, paths rewritten to the
    // post-block state
    updated: Vec<Vec<UpdatedLeaf>>,
    // proof extensions per pre-append tree height, from tree merges
    tree_growth: Vec<Vec<FixedHash>>,
    old_num_leaves: u64,
}

impl ElementApplyUpdate {
    /// Updates one authentication path across the applied block. The proof
    /// must be valid for the pre-block forest.
    ///
    /// Panics if the leaf was not present before the block.
    pub fn update_leaf_proof(&self, leaf_index: u64, proof: &mut Vec<FixedHash>) {
        assert!(
            leaf_index < self.old_num_leaves,
            "cannot update proof for a leaf the accumulator does not contain",
        );
        repair_proof(&self.updated, leaf_index, proof);
        proof.extend_from_slice(&self.tree_growth[proof.len()]);
    }
}

/// Record of one backward step. Rolls proofs back to the pre-block forest.
#[derive(Clone, Debug)]
pub struct ElementRevertUpdate {
    updated: Vec<Vec<UpdatedLeaf>>,
    num_leaves: u64,
}

impl ElementRevertUpdate {
    /// Count of leaves in the restored (pre-block) forest. Elements with a
    /// leaf index at or beyond this count were created by the reverted
    /// block and no longer exist.
    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    /// Rolls one authentication path back across the reverted block. The
    /// proof must be valid for the post-block forest.
    ///
    /// Panics if the leaf does not exist in the restored forest.
    pub fn update_leaf_proof(&self, leaf_index: u64, proof: &mut Vec<FixedHash>) {
        assert!(
            leaf_index < self.num_leaves,
            "cannot revert proof for a leaf the accumulator does not contain",
        );
        proof.truncate(tree_height(self.num_leaves, leaf_index));
        repair_proof(&self.updated, leaf_index, proof);
    }
}

/// Replaces the proof nodes whose subtrees contain an updated leaf. Any
/// updated leaf inside a node's span reproduces that node's new value, since
/// the recorded paths are mutually consistent.
fn repair_proof(updated: &[Vec<UpdatedLeaf>], leaf_index: u64, proof: &mut [FixedHash]) {
    let peers = &updated[proof.len()];
    if peers.is_empty() {
        return;
    }
    for level in 0..proof.len() {
        let sibling_base = (leaf_index ^ (1 << level)) & !((1u64 << level) - 1);
        let span = sibling_base..sibling_base + (1 << level);
        if let Some(peer) = peers.iter().find(|p| span.contains(&p.leaf_index)) {
            proof[level] = subtree_root(peer, level);
        }
    }
}

/// Root of the height-`height` subtree containing `leaf`, folded from the
/// leaf's hash and the lower part of its path.
fn subtree_root(leaf: &UpdatedLeaf, height: usize) -> FixedHash {
    proof_root(leaf.hash, leaf.leaf_index, &leaf.proof[..height])
}

/// Recomputes the root of one tree after a batch of its leaves changed,
/// rewriting the batch's paths so they are valid for the new tree. `leaves`
/// must be non-empty and sorted by leaf index, all within the same tree of
/// the given height.
fn update_tree_root(leaves: &mut [UpdatedLeaf], height: usize) -> FixedHash {
    if height == 0 {
        return leaves[0].hash;
    }
    let bit = 1u64 << (height - 1);
    let split = leaves.partition_point(|l| l.leaf_index & bit == 0);
    let (left, right) = leaves.split_at_mut(split);
    let (left_root, right_root);
    if right.is_empty() {
        right_root = left[0].proof[height - 1];
        left_root = update_tree_root(left, height - 1);
    } else if left.is_empty() {
        left_root = right[0].proof[height - 1];
        right_root = update_tree_root(right, height - 1);
    } else {
        left_root = update_tree_root(left, height - 1);
        right_root = update_tree_root(right, height - 1);
    }
    for leaf in left.iter_mut() {
        leaf.proof[height - 1] = right_root;
    }
    for leaf in right.iter_mut() {
        leaf.proof[height - 1] = left_root;
    }
    node_hash(&left_root, &right_root)
}

pub(crate) struct AppendResult {
    // (leaf_index, proof) per appended leaf, in append order
    pub placements: Vec<(u64, Vec<FixedHash>)>,
    // proof extensions for pre-existing trees, keyed by their height
    pub tree_growth: Vec<Vec<FixedHash>>,
}

// A tree being assembled during an append: its root, which appended leaves
// sit under it, and which pre-existing trees it has absorbed.
struct PendingTree {
    root: FixedHash,
    batch: Vec<usize>,
    origins: Vec<usize>,
}

/// Appends leaves to a forest with binary-counter carry merges, tracking the
/// proof of every appended leaf and the proof growth of every pre-existing
/// tree that gets absorbed along the way.
pub(crate) fn append_leaves(
    trees: &mut [FixedHash; MAX_FOREST_HEIGHT],
    num_leaves: &mut u64,
    hashes: &[FixedHash],
) -> AppendResult {
    let mut slots: Vec<Option<PendingTree>> = (0..MAX_FOREST_HEIGHT)
        .map(|height| {
            if *num_leaves & (1 << height) != 0 {
                Some(PendingTree {
                    root: trees[height],
                    batch: Vec::new(),
                    origins: vec![height],
                })
            } else {
                None
            }
        })
        .collect();

    let mut proofs: Vec<Vec<FixedHash>> = vec![Vec::new(); hashes.len()];
    let mut tree_growth: Vec<Vec<FixedHash>> = vec![Vec::new(); MAX_FOREST_HEIGHT];
    let mut placements = Vec::with_capacity(hashes.len());

    for (i, &hash) in hashes.iter().enumerate() {
        placements.push(*num_leaves);
        let mut current = PendingTree {
            root: hash,
            batch: vec![i],
            origins: Vec::new(),
        };
        let mut height = 0;
        while *num_leaves & (1 << height) != 0 {
            let left = slots[height].take().expect("occupied forest slot was empty");
            // every leaf under either side gains one proof node
            for &b in &left.batch {
                proofs[b].push(current.root);
            }
            for &origin in &left.origins {
                tree_growth[origin].push(current.root);
            }
            for &b in &current.batch {
                proofs[b].push(left.root);
            }
            for &origin in &current.origins {
                tree_growth[origin].push(left.root);
            }
            current = PendingTree {
                root: node_hash(&left.root, &current.root),
                batch: left.batch.into_iter().chain(current.batch).collect(),
                origins: left.origins.into_iter().chain(current.origins).collect(),
            };
            height += 1;
        }
        slots[height] = Some(current);
        *num_leaves += 1;
    }

    for (height, slot) in slots.iter().enumerate() {
        trees[height] = match slot {
            Some(tree) => tree.root,
            None => FixedHash::zero(),
        };
    }

    AppendResult {
        placements: placements
            .into_iter()
            .zip(proofs)
            .collect(),
        tree_growth,
    }
}
