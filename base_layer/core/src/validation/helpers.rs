// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::epoch_time::EpochTime;

use crate::{
    blocks::BlockHeader,
    consensus::ValidationContext,
    consts::FUTURE_TIME_LIMIT,
    proof_of_work::{get_median_timestamp, hash_requiring_work, meets_target},
    validation::ValidationError,
};

/// Checks that the header's timestamp is not beyond the future time limit.
pub fn check_timestamp_ftl(header: &BlockHeader) -> Result<(), ValidationError> {
    if header.timestamp.as_u64() > EpochTime::now().as_u64() + FUTURE_TIME_LIMIT {
        return Err(ValidationError::TimestampTooFarInFuture);
    }
    Ok(())
}

/// Checks that the header's timestamp strictly exceeds the median of the
/// context's recorded timestamp window.
pub fn check_timestamp_greater_than_median(
    vc: &ValidationContext,
    header: &BlockHeader,
) -> Result<(), ValidationError> {
    let timestamps = vc.prev_timestamps[..vc.num_timestamps()].to_vec();
    if let Some(median) = get_median_timestamp(timestamps) {
        if header.timestamp <= median {
            return Err(ValidationError::TimestampTooEarly {
                median,
                actual: header.timestamp,
            });
        }
    }
    Ok(())
}

/// Checks the header's proof of work against the context's difficulty.
pub fn check_pow(vc: &ValidationContext, header: &BlockHeader) -> Result<(), ValidationError> {
    let target = hash_requiring_work(vc.difficulty);
    if !meets_target(&header.id(), &target) {
        return Err(ValidationError::InsufficientWork);
    }
    Ok(())
}
