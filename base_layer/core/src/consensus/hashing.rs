// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{io, io::Write};

use basalt_common_types::types::FixedHash;
use blake2::Blake2b;
use digest::{consts::U32, Digest};

use crate::consensus::ConsensusEncoding;

const HASH_DOMAIN: &str = "com.basalt.core.consensus.v1";

/// Domain-separated consensus hasher. Every consensus-critical hash in the
/// core goes through here, with a label separating the different uses of
/// the same byte content.
pub struct ConsensusHasher {
    writer: WriteHashWrapper<Blake2b<U32>>,
}

impl ConsensusHasher {
    pub fn new(label: &'static str) -> Self {
        let mut digest = Blake2b::<U32>::new();
        digest.update((HASH_DOMAIN.len() as u64).to_le_bytes());
        digest.update(HASH_DOMAIN.as_bytes());
        digest.update((label.len() as u64).to_le_bytes());
        digest.update(label.as_bytes());
        ConsensusHasher {
            writer: WriteHashWrapper(digest),
        }
    }

    pub fn chain<T: ConsensusEncoding + ?Sized>(mut self, data: &T) -> Self {
        data.consensus_encode(&mut self.writer)
            .expect("Incorrect implementation of ConsensusEncoding encountered. Implementations MUST be infallible.");
        self
    }

    pub fn finalize(self) -> FixedHash {
        let hash: [u8; 32] = self.writer.0.finalize().into();
        FixedHash::from(hash)
    }
}

// Wraps a Digest to satisfy the io::Write bound of ConsensusEncoding.
struct WriteHashWrapper<D>(D);

impl<D: Digest> Write for WriteHashWrapper<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
