// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! The consensus state-transition machinery: the validation context, the
//! block apply/revert pipeline and the scratch chain for evaluating
//! candidate forks.

mod context;
mod encoding;
mod hashing;
mod scratch;
mod update;

pub use context::{block_commitment, ValidationContext};
pub use encoding::ConsensusEncoding;
pub use hashing::ConsensusHasher;
pub use scratch::{Checkpoint, ScratchChain, ScratchChainError};
pub use update::{apply_block, genesis_update, revert_block, ApplyUpdate, RevertUpdate};
