// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! The oak difficulty controller. A decayed cumulative (time, work) pair
//! gives a long-memory hash-rate estimate; a squared-delta shift against
//! the ideal schedule gives the short-memory correction; a 0.4% per-block
//! cap bounds oscillation.

use crate::{consts::BLOCK_INTERVAL, proof_of_work::Work};

/// Decays both oak totals by 0.5% and folds in the latest inter-block delta
/// and difficulty. Deltas can be negative: timestamps are only required to
/// exceed the rolling median, not the direct parent.
pub fn decay_oak_totals(oak_time: i64, delta_secs: i64, oak_work: Work, work: Work) -> (i64, Work) {
    let decayed_time = oak_time - oak_time / 200 + delta_secs;
    let decayed_work = oak_work - oak_work.div_u64(200) + work;
    (decayed_time, decayed_work)
}

/// The block time to aim for at the given height, where `actual_secs` is
/// the wall-clock time elapsed since genesis. Operates on integer seconds;
/// squaring sub-second precision would overflow long before it mattered.
pub(crate) fn target_block_time(height: u64, actual_secs: i64) -> u64 {
    let expected = BLOCK_INTERVAL as i128 * height as i128;
    let delta = expected - actual_secs as i128;
    // square the delta, preserving its sign, scaled so that a delta of
    // 10,000 seconds produces a ten-second shift
    let mut shift = delta * delta * 10 / (10_000 * 10_000);
    if delta < 0 {
        shift = -shift;
    }
    let min = (BLOCK_INTERVAL / 3) as i128;
    let max = (BLOCK_INTERVAL * 3) as i128;
    (BLOCK_INTERVAL as i128 + shift).clamp(min, max) as u64
}

/// Produces the difficulty for the next block.
pub fn adjust_difficulty(difficulty: Work, height: u64, actual_secs: i64, oak_time: i64, oak_work: Work) -> Work {
    let target_time = target_block_time(height, actual_secs);

    // estimate the hashrate from the decayed totals, then scale by the
    // target block time to get the expected hashes for the next block
    let elapsed_secs = oak_time.max(1) as u64;
    let estimated_hashrate = oak_work.div_u64(elapsed_secs);
    let candidate = estimated_hashrate.mul_u64(target_time);

    // clamp the adjustment to 0.4%
    let max_adjust = difficulty.div_u64(250);
    let min = difficulty - max_adjust;
    let max = difficulty + max_adjust;
    if candidate < min {
        min
    } else if candidate > max {
        max
    } else {
        candidate
    }
}
