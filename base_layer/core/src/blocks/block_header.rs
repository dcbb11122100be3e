// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{fmt, io, io::Write};

use basalt_common_types::{
    epoch_time::EpochTime,
    types::{BlockHash, FixedHash},
};
use serde::{Deserialize, Serialize};

use crate::{
    consensus::{ConsensusEncoding, ConsensusHasher},
    transactions::Address,
};

/// A (height, block id) pair identifying one position in a chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainIndex {
    pub height: u64,
    pub id: BlockHash,
}

impl fmt::Display for ChainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.height, self.id)
    }
}

impl ConsensusEncoding for ChainIndex {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.height.consensus_encode(writer)?;
        written += self.id.consensus_encode(writer)?;
        Ok(written)
    }
}

/// The block header. The commitment is a domain-separated hash over the
/// miner address and the transaction set, so the header id commits to the
/// entire block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of this block since the genesis block (height 0).
    pub height: u64,
    /// Id of the parent block.
    pub parent_id: BlockHash,
    /// Nonce incremented while mining.
    pub nonce: u64,
    /// Timestamp at which the block was built.
    pub timestamp: EpochTime,
    /// Recipient of the block reward.
    pub miner_address: Address,
    /// Commitment to the block's contents.
    pub commitment: FixedHash,
}

impl BlockHeader {
    /// The header's id, which doubles as the block id and must meet the
    /// proof-of-work target.
    pub fn id(&self) -> BlockHash {
        ConsensusHasher::new("block_header")
            .chain(&self.height)
            .chain(&self.parent_id)
            .chain(&self.nonce)
            .chain(&self.timestamp)
            .chain(&self.miner_address)
            .chain(&self.commitment)
            .finalize()
    }

    pub fn index(&self) -> ChainIndex {
        ChainIndex {
            height: self.height,
            id: self.id(),
        }
    }

    /// The index of this header's parent. Meaningless for genesis headers.
    pub fn parent_index(&self) -> ChainIndex {
        ChainIndex {
            height: self.height.saturating_sub(1),
            id: self.parent_id,
        }
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header #{} (parent {}, timestamp {}, nonce {})",
            self.height, self.parent_id, self.timestamp, self.nonce
        )
    }
}
