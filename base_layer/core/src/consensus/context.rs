// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::{epoch_time::EpochTime, types::FixedHash};
use basalt_merkle::{ElementForest, HistoryAccumulator};
use serde::{Deserialize, Serialize};

use crate::{
    blocks::{BlockHeader, ChainIndex},
    consensus::ConsensusHasher,
    consts::{
        FOUNDATION_SUBSIDY_COINS,
        FOUNDATION_SUBSIDY_INTERVAL,
        INITIAL_REWARD_COINS,
        MATURITY_DELAY,
        MEDIAN_TIMESTAMP_WINDOW,
        REWARD_HALVING_INTERVAL,
    },
    proof_of_work::{adjust_difficulty, decay_oak_totals, get_median_timestamp, Work},
    transactions::{Address, Currency, StorageContract, Transaction},
};

/// The summarised consensus state that every block mutates. Constant-size:
/// the element forest and block history are accumulator snapshots, not the
/// full sets. Contexts are value types; applying a block to a copy leaves
/// the original usable for reverts and forks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    /// The chain tip this context has absorbed.
    pub index: ChainIndex,
    /// Accumulator over all live (and spent-in-place) state elements.
    pub state: ElementForest,
    /// Accumulator over every block index in the chain.
    pub history: HistoryAccumulator,
    /// Cumulative work of the chain: the sum of every difficulty applied.
    pub total_work: Work,
    /// Expected hashes required for the next block.
    pub difficulty: Work,
    /// Decayed cumulative inter-block seconds.
    pub oak_time: i64,
    /// Decayed cumulative work.
    pub oak_work: Work,
    /// Timestamp of block 0.
    pub genesis_timestamp: EpochTime,
    /// Rolling window of the most recent block timestamps, oldest first.
    pub prev_timestamps: [EpochTime; MEDIAN_TIMESTAMP_WINDOW],
    /// Cumulative contract tax collected; monotonically non-decreasing.
    pub stake_pool: Currency,
    /// Current recipient of the periodic foundation subsidy.
    pub foundation_address: Address,
}

impl ValidationContext {
    /// The context a chain starts from, before its genesis block.
    pub fn new(initial_difficulty: Work, genesis_timestamp: EpochTime) -> Self {
        ValidationContext {
            index: ChainIndex::default(),
            state: ElementForest::new(),
            history: HistoryAccumulator::new(),
            total_work: Work::zero(),
            difficulty: initial_difficulty,
            oak_time: 0,
            oak_work: Work::zero(),
            genesis_timestamp,
            prev_timestamps: [EpochTime::default(); MEDIAN_TIMESTAMP_WINDOW],
            stake_pool: Currency::ZERO,
            foundation_address: Address::VOID,
        }
    }

    /// Number of valid entries in `prev_timestamps`.
    pub fn num_timestamps(&self) -> usize {
        ((self.index.height + 1).min(MEDIAN_TIMESTAMP_WINDOW as u64)) as usize
    }

    /// The height of the next block.
    pub fn child_height(&self) -> u64 {
        self.index.height + 1
    }

    /// Median of the recorded timestamp window.
    pub fn median_timestamp(&self) -> Option<EpochTime> {
        get_median_timestamp(self.prev_timestamps[..self.num_timestamps()].to_vec())
    }

    /// The coin reward paid to the miner of the next block.
    pub fn block_reward(&self) -> Currency {
        let halvings = self.child_height() / REWARD_HALVING_INTERVAL;
        if halvings >= 128 {
            return Currency::ZERO;
        }
        Currency::from_base_units(Currency::coins(INITIAL_REWARD_COINS).as_base_units() >> halvings)
    }

    /// The subsidy paid to the foundation address by the next block, or
    /// zero outside the subsidy cadence.
    pub fn foundation_subsidy(&self) -> Currency {
        if self.child_height() % FOUNDATION_SUBSIDY_INTERVAL == 0 {
            Currency::coins(FOUNDATION_SUBSIDY_COINS)
        } else {
            Currency::ZERO
        }
    }

    /// The height at which block-level coin creations of the next block
    /// become spendable.
    pub fn maturity_height(&self) -> u64 {
        self.child_height() + MATURITY_DELAY
    }

    /// The tax levied on a new contract: 4% of its payout.
    pub fn file_contract_tax(&self, contract: &StorageContract) -> Currency {
        contract.payout().div_u64(25)
    }

    /// The header commitment for a block with the given miner address and
    /// transaction set.
    pub fn commitment(&self, miner_address: Address, transactions: &[Transaction]) -> FixedHash {
        block_commitment(miner_address, transactions)
    }

    /// Advances this context by one validated header. No failures originate
    /// here; callers validate first.
    pub fn apply_header(&mut self, header: &BlockHeader) {
        if header.height == 0 {
            self.prev_timestamps[0] = header.timestamp;
            self.index = header.index();
            return;
        }
        self.total_work = self.total_work + self.difficulty;
        let parent_timestamp = self.prev_timestamps[self.num_timestamps() - 1];
        let (oak_time, oak_work) = decay_oak_totals(
            self.oak_time,
            header.timestamp.signed_delta(parent_timestamp),
            self.oak_work,
            self.difficulty,
        );
        self.oak_time = oak_time;
        self.oak_work = oak_work;
        self.difficulty = adjust_difficulty(
            self.difficulty,
            header.height,
            header.timestamp.signed_delta(self.genesis_timestamp),
            self.oak_time,
            self.oak_work,
        );
        let recorded = self.num_timestamps();
        if recorded < MEDIAN_TIMESTAMP_WINDOW {
            self.prev_timestamps[recorded] = header.timestamp;
        } else {
            self.prev_timestamps.rotate_left(1);
            self.prev_timestamps[MEDIAN_TIMESTAMP_WINDOW - 1] = header.timestamp;
        }
        self.index = header.index();
    }
}

/// The commitment a header carries: a domain-separated hash of the miner
/// address and the transaction ids in order.
pub fn block_commitment(miner_address: Address, transactions: &[Transaction]) -> FixedHash {
    let mut hasher = ConsensusHasher::new("block_commitment")
        .chain(&miner_address)
        .chain(&(transactions.len() as u64));
    for transaction in transactions {
        hasher = hasher.chain(&transaction.id());
    }
    hasher.finalize()
}
