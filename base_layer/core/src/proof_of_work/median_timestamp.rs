// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::epoch_time::EpochTime;
use log::*;

pub const LOG_TARGET: &str = "basalt::pow::median";

/// The median of a timestamp set, or `None` when the set is empty. An even
/// count resolves to the average of the two middle values, so a header only
/// has to beat the centre of the window, never a single outlier.
pub fn get_median_timestamp(mut timestamps: Vec<EpochTime>) -> Option<EpochTime> {
    if timestamps.is_empty() {
        return None;
    }
    timestamps.sort_unstable();
    let middle = timestamps.len() / 2;
    let median = if timestamps.len() % 2 == 0 {
        let lower = timestamps[middle - 1].as_u64();
        let upper = timestamps[middle].as_u64();
        EpochTime::from(lower + (upper - lower) / 2)
    } else {
        timestamps[middle]
    };
    trace!(
        target: LOG_TARGET,
        "window of {} timestamps has median {}",
        timestamps.len(),
        median
    );
    Some(median)
}
