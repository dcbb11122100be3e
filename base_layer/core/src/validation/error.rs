// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::{epoch_time::EpochTime, types::BlockHash};
use thiserror::Error;

use crate::transactions::{Currency, ElementId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Expected block height to be {expected}, but was {actual}")]
    InvalidHeight { expected: u64, actual: u64 },
    #[error("Expected block parent id to be {expected}, but was {actual}")]
    InvalidParentId { expected: BlockHash, actual: BlockHash },
    #[error("Header timestamp {actual} does not exceed the median timestamp {median}")]
    TimestampTooEarly { median: EpochTime, actual: EpochTime },
    #[error("Header timestamp is beyond the future time limit")]
    TimestampTooFarInFuture,
    #[error("Header does not meet the required difficulty")]
    InsufficientWork,
    #[error("Block contents do not match the header commitment")]
    CommitmentMismatch,
    #[error("Element {0} is spent more than once in the block")]
    DoubleSpend(ElementId),
    #[error("Element {0} is not present in the state accumulator")]
    UnknownElement(ElementId),
    #[error("Ephemeral element {0} does not match an output of a preceding transaction")]
    InvalidEphemeralSpend(ElementId),
    #[error("Coin output is not spendable until height {maturity_height} (spent at height {height})")]
    ImmatureCoinOutput { maturity_height: u64, height: u64 },
    #[error("Invalid signature for element {0}")]
    InvalidSignature(ElementId),
    #[error("Coin inflow {inflow} does not match outflow {outflow}")]
    CoinBalanceMismatch { inflow: Currency, outflow: Currency },
    #[error("Coin inflow or outflow exceeds the representable range")]
    BalanceOverflow,
    #[error("Stake inflow {inflow} does not match outflow {outflow}")]
    StakeBalanceMismatch { inflow: u64, outflow: u64 },
    #[error("Contract proof window [{window_start}, {window_end}) is invalid at height {height}")]
    InvalidContractWindow {
        window_start: u64,
        window_end: u64,
        height: u64,
    },
    #[error("Contract missed host value exceeds the host payout")]
    InvalidMissedHostValue,
    #[error("Contract can no longer be revised at height {height}")]
    LateRevision { height: u64 },
    #[error("Revision number {actual} does not exceed the parent's {parent}")]
    RevisionNumberNotIncreased { parent: u64, actual: u64 },
    #[error("Contract resolution is outside its valid window")]
    ResolutionOutsideWindow,
    #[error("Renewal rollover exceeds the final revision's output value")]
    InvalidRollover,
    #[error("Storage proof does not verify against the contract's file root")]
    InvalidStorageProof,
}
