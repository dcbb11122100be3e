// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Protocol constants. These are consensus-critical and compile-time fixed;
//! changing any of them forks the chain.

/// The ideal wall-clock time between consecutive blocks, in seconds.
pub const BLOCK_INTERVAL: u64 = 600;

/// The number of stake units in existence.
pub const STAKE_SUPPLY: u64 = 10_000;

/// Size of the rolling timestamp window used for median-timestamp checks.
pub const MEDIAN_TIMESTAMP_WINDOW: usize = 11;

/// Number of blocks before block-level coin creations become spendable.
pub const MATURITY_DELAY: u64 = 144;

/// Stride used when searching for a block nonce, so that external mining
/// hardware can partition the nonce space. The consensus check itself is
/// stride-agnostic.
pub const NONCE_FACTOR: u64 = 1009;

/// Maximum number of seconds a header timestamp may lie in the future.
pub const FUTURE_TIME_LIMIT: u64 = 2 * 60 * 60;

/// The foundation subsidy is paid every this many blocks.
pub const FOUNDATION_SUBSIDY_INTERVAL: u64 = 4320;

/// Whole coins paid to the foundation address per subsidy.
pub const FOUNDATION_SUBSIDY_COINS: u64 = 30_000;

/// Whole coins paid as the block reward before any halving.
pub const INITIAL_REWARD_COINS: u64 = 50;

/// The block reward halves every this many blocks.
pub const REWARD_HALVING_INTERVAL: u64 = 210_000;
