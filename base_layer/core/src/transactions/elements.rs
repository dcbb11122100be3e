// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{
    fmt,
    io,
    io::Write,
};

use basalt_common_types::types::FixedHash;
use basalt_merkle::LeafPosition;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{
    consensus::{ConsensusEncoding, ConsensusHasher},
    transactions::{Currency, StorageContract},
};

/// The recipient of an output. A standard address is the domain-separated
/// hash of an ed25519 public key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub FixedHash);

impl Address {
    /// The all-zero address. Burns whatever is sent to it.
    pub const VOID: Address = Address(FixedHash::zero());

    pub fn standard(public_key: &VerifyingKey) -> Address {
        let hash = ConsensusHasher::new("address/standard")
            .chain(public_key)
            .finalize();
        Address(hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ConsensusEncoding for Address {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

/// Uniquely identifies a state element: the hash of whatever created it (a
/// transaction, or a block for block-level creations) plus a creation-order
/// index within that source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId {
    pub source: FixedHash,
    pub index: u64,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.index)
    }
}

impl ConsensusEncoding for ElementId {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.source.consensus_encode(writer)?;
        written += self.index.consensus_encode(writer)?;
        Ok(written)
    }
}

/// The accumulator-facing part of every element: its id, where its leaf
/// lives, and the authentication path into the element forest. The path is
/// mutated by every subsequent block; holders fold in apply/revert updates
/// to keep it current.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateElement {
    pub id: ElementId,
    pub leaf_position: LeafPosition,
    pub merkle_proof: Vec<FixedHash>,
}

impl StateElement {
    /// A freshly-created element: no leaf assigned yet.
    pub fn new(id: ElementId) -> StateElement {
        StateElement {
            id,
            leaf_position: LeafPosition::Ephemeral,
            merkle_proof: Vec::new(),
        }
    }
}

/// A coin payment: an amount and its recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinOutput {
    pub value: Currency,
    pub address: Address,
}

impl ConsensusEncoding for CoinOutput {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.value.consensus_encode(writer)?;
        written += self.address.consensus_encode(writer)?;
        Ok(written)
    }
}

/// An authenticated coin output. Block-level creations (rewards, subsidies,
/// contract payouts, stake claims) carry a maturity height before which
/// they cannot be spent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinElement {
    pub state: StateElement,
    pub output: CoinOutput,
    pub maturity_height: u64,
}

impl CoinElement {
    /// The forest leaf hash for this element, in the given spent state.
    pub fn leaf_hash(&self, spent: bool) -> FixedHash {
        ConsensusHasher::new("leaf/coin")
            .chain(&self.state.id)
            .chain(&self.output)
            .chain(&self.maturity_height)
            .chain(&spent)
            .finalize()
    }
}

/// A stake payment. Stake is a fixed-supply unit count, not a coin amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeOutput {
    pub value: u64,
    pub address: Address,
}

impl ConsensusEncoding for StakeOutput {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.value.consensus_encode(writer)?;
        written += self.address.consensus_encode(writer)?;
        Ok(written)
    }
}

/// An authenticated stake output. `claim_start` snapshots the tax pool at
/// creation; the difference against the pool at spend time determines the
/// accrued claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeElement {
    pub state: StateElement,
    pub output: StakeOutput,
    pub claim_start: Currency,
}

impl StakeElement {
    pub fn leaf_hash(&self, spent: bool) -> FixedHash {
        ConsensusHasher::new("leaf/stake")
            .chain(&self.state.id)
            .chain(&self.output)
            .chain(&self.claim_start)
            .chain(&spent)
            .finalize()
    }
}

/// An authenticated storage contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractElement {
    pub state: StateElement,
    pub contract: StorageContract,
}

impl ContractElement {
    pub fn leaf_hash(&self, spent: bool) -> FixedHash {
        ConsensusHasher::new("leaf/contract")
            .chain(&self.state.id)
            .chain(&self.contract)
            .chain(&spent)
            .finalize()
    }
}
