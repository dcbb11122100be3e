// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{
    convert::TryFrom,
    fmt,
    ops::{Deref, DerefMut},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hex::{from_hex, to_hex, HexError};

#[derive(Debug, Error)]
#[error("Invalid size")]
pub struct FixedHashSizeError;

/// A 32-byte hash. Used for block ids, element sources and Merkle nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct FixedHash([u8; FixedHash::BYTE_SIZE]);

impl FixedHash {
    pub const BYTE_SIZE: usize = 32;

    /// The all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; Self::BYTE_SIZE])
    }

    pub const fn byte_size() -> usize {
        Self::BYTE_SIZE
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn into_array(self) -> [u8; Self::BYTE_SIZE] {
        self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let bytes = from_hex(s)?;
        Self::try_from(bytes.as_slice()).map_err(|_| HexError::LengthError)
    }
}

impl From<[u8; FixedHash::BYTE_SIZE]> for FixedHash {
    fn from(hash: [u8; FixedHash::BYTE_SIZE]) -> Self {
        Self(hash)
    }
}

impl TryFrom<&[u8]> for FixedHash {
    type Error = FixedHashSizeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != FixedHash::BYTE_SIZE {
            return Err(FixedHashSizeError);
        }
        let mut buf = [0u8; FixedHash::BYTE_SIZE];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }
}

impl AsRef<[u8]> for FixedHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for FixedHash {
    type Target = [u8; FixedHash::BYTE_SIZE];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FixedHash {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_hex(&self.0))
    }
}

impl fmt::Debug for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedHash({})", to_hex(&self.0))
    }
}
