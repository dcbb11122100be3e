// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

mod difficulty;
mod median_timestamp;
mod oak;

pub use difficulty::{hash_requiring_work, meets_target, work_required_for_hash, Work};
pub use median_timestamp::get_median_timestamp;
pub use oak::{adjust_difficulty, decay_oak_totals};
