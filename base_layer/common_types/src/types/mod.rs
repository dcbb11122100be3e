// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

mod fixed_hash;

pub use fixed_hash::{FixedHash, FixedHashSizeError};

/// The hash of a block header, uniquely identifying a block.
pub type BlockHash = FixedHash;
