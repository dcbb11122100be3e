// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{io, io::Write};

use basalt_common_types::{epoch_time::EpochTime, types::FixedHash};
use ed25519_dalek::VerifyingKey;

use crate::transactions::Currency;

/// Abstracts the ability of a type to canonically encode itself for the
/// purposes of consensus. The canonical encoding feeds header commitments,
/// transaction ids, sig hashes and leaf hashes; it must never change once a
/// chain exists. Integers are little-endian; lists are length-prefixed.
pub trait ConsensusEncoding {
    /// Encode to the given writer, returning the number of bytes written.
    /// If writing to the writer is infallible, this must always succeed.
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error>;
}

impl ConsensusEncoding for bool {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&[u8::from(*self)])?;
        Ok(1)
    }
}

impl ConsensusEncoding for u8 {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&[*self])?;
        Ok(1)
    }
}

impl ConsensusEncoding for u64 {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&self.to_le_bytes())?;
        Ok(8)
    }
}

impl ConsensusEncoding for u128 {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&self.to_le_bytes())?;
        Ok(16)
    }
}

impl ConsensusEncoding for [u8] {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = (self.len() as u64).consensus_encode(writer)?;
        writer.write_all(self)?;
        written += self.len();
        Ok(written)
    }
}

impl<T: ConsensusEncoding> ConsensusEncoding for Vec<T> {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = (self.len() as u64).consensus_encode(writer)?;
        for item in self {
            written += item.consensus_encode(writer)?;
        }
        Ok(written)
    }
}

impl<T: ConsensusEncoding> ConsensusEncoding for Option<T> {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        match self {
            None => 0u8.consensus_encode(writer),
            Some(value) => {
                let mut written = 1u8.consensus_encode(writer)?;
                written += value.consensus_encode(writer)?;
                Ok(written)
            },
        }
    }
}

impl ConsensusEncoding for FixedHash {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(self.as_slice())?;
        Ok(FixedHash::BYTE_SIZE)
    }
}

impl ConsensusEncoding for EpochTime {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.as_u64().consensus_encode(writer)
    }
}

impl ConsensusEncoding for Currency {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.as_base_units().consensus_encode(writer)
    }
}

impl ConsensusEncoding for VerifyingKey {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(self.as_bytes())?;
        Ok(32)
    }
}
