// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{io, io::Write};

use basalt_common_types::types::FixedHash;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{
    consensus::ConsensusEncoding,
    transactions::{CoinOutput, Currency},
};

/// The terms of a renter/host storage agreement. The renter and host
/// outputs are disbursed when the contract resolves with a valid storage
/// proof (or by mutual finalization); if the proof window expires without
/// one, the host is paid `missed_host_value` instead.
///
/// Contracts are revisable until the proof window opens: a revision with a
/// higher revision number and both parties' signatures replaces the terms
/// in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageContract {
    pub filesize: u64,
    pub file_merkle_root: FixedHash,
    pub window_start: u64,
    pub window_end: u64,
    pub renter_output: CoinOutput,
    pub host_output: CoinOutput,
    pub missed_host_value: Currency,
    pub total_collateral: Currency,
    pub renter_public_key: VerifyingKey,
    pub host_public_key: VerifyingKey,
    pub revision_number: u64,
}

impl StorageContract {
    /// The host payout when the proof window expires unresolved.
    pub fn missed_host_output(&self) -> CoinOutput {
        CoinOutput {
            value: self.missed_host_value,
            address: self.host_output.address,
        }
    }

    /// The full contract payout, which the tax is levied against.
    pub fn payout(&self) -> Currency {
        self.renter_output.value + self.host_output.value
    }
}

impl ConsensusEncoding for StorageContract {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.filesize.consensus_encode(writer)?;
        written += self.file_merkle_root.consensus_encode(writer)?;
        written += self.window_start.consensus_encode(writer)?;
        written += self.window_end.consensus_encode(writer)?;
        written += self.renter_output.consensus_encode(writer)?;
        written += self.host_output.consensus_encode(writer)?;
        written += self.missed_host_value.consensus_encode(writer)?;
        written += self.total_collateral.consensus_encode(writer)?;
        written += self.renter_public_key.consensus_encode(writer)?;
        written += self.host_public_key.consensus_encode(writer)?;
        written += self.revision_number.consensus_encode(writer)?;
        Ok(written)
    }
}
