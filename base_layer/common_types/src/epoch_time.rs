// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{
    fmt,
    ops::{Add, Sub},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

/// A unix timestamp in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpochTime(u64);

impl EpochTime {
    /// The current wall-clock time.
    pub fn now() -> EpochTime {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        EpochTime(secs)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns a new EpochTime increased by `secs`.
    pub fn increase(self, secs: u64) -> EpochTime {
        EpochTime(self.0.saturating_add(secs))
    }

    pub fn checked_sub(self, other: EpochTime) -> Option<EpochTime> {
        self.0.checked_sub(other.0).map(EpochTime)
    }

    /// Signed difference in seconds. Timestamps are not required to be
    /// monotone across headers, so callers must expect negative deltas.
    pub fn signed_delta(self, other: EpochTime) -> i64 {
        self.0 as i64 - other.0 as i64
    }
}

impl From<u64> for EpochTime {
    fn from(secs: u64) -> Self {
        EpochTime(secs)
    }
}

impl Add for EpochTime {
    type Output = EpochTime;

    fn add(self, other: EpochTime) -> EpochTime {
        EpochTime(self.0 + other.0)
    }
}

impl Sub for EpochTime {
    type Output = EpochTime;

    fn sub(self, other: EpochTime) -> EpochTime {
        EpochTime(self.0 - other.0)
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
