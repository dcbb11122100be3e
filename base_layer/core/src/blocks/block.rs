// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::fmt;

use basalt_common_types::types::BlockHash;
use serde::{Deserialize, Serialize};

use crate::{
    blocks::{BlockHeader, ChainIndex},
    transactions::Transaction,
};

/// A Basalt block: a header plus an ordered transaction list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn id(&self) -> BlockHash {
        self.header.id()
    }

    pub fn index(&self) -> ChainIndex {
        self.header.index()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} with {} transaction(s)", self.index(), self.transactions.len())
    }
}
