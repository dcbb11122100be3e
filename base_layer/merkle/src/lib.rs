// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! # Element forest
//!
//! The accumulators in this crate authenticate the consensus state of the
//! Basalt base layer. The element forest is a collection of perfect binary
//! Merkle trees, one per set bit of the leaf count, with 64 root slots in
//! total. Appending leaves merges trees the way incrementing a binary
//! counter merges bits: two trees of height `h` combine into one of height
//! `h + 1`, and every leaf under either tree gains one proof node.
//!
//! Leaves are never deleted. Spending an element re-hashes its leaf with a
//! spent marker and recomputes the roots along its path, which is why every
//! block application returns an update record: holders of long-lived proofs
//! fold the record in to keep their proofs current. Reverting a block never
//! mutates a forest; the consensus layer keeps forests inside by-value
//! context snapshots, so the revert record only describes how external
//! proof holders roll back.
//!
//! The history accumulator uses the same forest mechanics with exactly one
//! leaf per block.

mod forest;
mod hashing;
mod history;
mod serde_support;

pub use forest::{
    tree_height,
    ElementApplyUpdate,
    ElementForest,
    ElementRevertUpdate,
    LeafPlacement,
    LeafPosition,
    NewLeaf,
    UpdatedLeaf,
};
pub use hashing::{node_hash, proof_root};
pub use history::{HistoryAccumulator, HistoryApplyUpdate, HistoryRevertUpdate};

/// Number of root slots in a forest; also the maximum height of any tree.
pub const MAX_FOREST_HEIGHT: usize = 64;
