// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{
    fmt,
    ops::{Add, Sub},
};

use basalt_common_types::types::BlockHash;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// An amount of proof-of-work, measured as an expected number of hashes.
/// Doubles as the difficulty: the expected hashes required to produce the
/// next block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Work(U256);

impl Work {
    pub fn zero() -> Work {
        Work(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn div_u64(self, divisor: u64) -> Work {
        Work(self.0 / U256::from(divisor))
    }

    pub fn mul_u64(self, factor: u64) -> Work {
        Work(self.0 * U256::from(factor))
    }
}

impl From<u64> for Work {
    fn from(value: u64) -> Self {
        Work(U256::from(value))
    }
}

// Work arithmetic panics on overflow and underflow; both are caller
// invariant violations at this layer.
impl Add for Work {
    type Output = Work;

    fn add(self, other: Work) -> Work {
        Work(self.0 + other.0)
    }
}

impl Sub for Work {
    type Output = Work;

    fn sub(self, other: Work) -> Work {
        Work(self.0 - other.0)
    }
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estimates how much work was required to produce the given block id,
/// interpreting the id as a big-endian integer.
pub fn work_required_for_hash(id: BlockHash) -> Work {
    let id_int = U256::from_big_endian(id.as_slice());
    match id_int.checked_add(U256::one()) {
        Some(divisor) => Work(U256::MAX / divisor),
        None => Work(U256::one()),
    }
}

/// The largest block id that satisfies the given difficulty.
pub fn hash_requiring_work(work: Work) -> BlockHash {
    if work.is_zero() {
        return BlockHash::from([0xff; 32]);
    }
    let target = U256::MAX / work.0;
    let mut bytes = [0u8; 32];
    target.to_big_endian(&mut bytes);
    BlockHash::from(bytes)
}

/// Whether a block id satisfies a target, comparing both as big-endian
/// integers.
pub fn meets_target(id: &BlockHash, target: &BlockHash) -> bool {
    id.as_slice() <= target.as_slice()
}
