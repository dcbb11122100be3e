// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    blocks::{Block, BlockHeader, ChainIndex},
    consensus::{apply_block, ValidationContext},
    proof_of_work::Work,
    validation::{validate_block, validate_header, ValidationError},
};

pub const LOG_TARGET: &str = "basalt::consensus::scratch";

/// A fully-validated block together with the context that results from
/// applying it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub block: Block,
    pub context: ValidationContext,
}

#[derive(Debug, Error)]
pub enum ScratchChainError {
    #[error("more blocks than headers")]
    MoreBlocksThanHeaders,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Processes a potential extension or fork of the best chain in two phases:
/// headers first, then block bodies. Headers advance the header-validation
/// context; bodies advance the transaction-validation context, which never
/// outruns the headers.
pub struct ScratchChain {
    base: ChainIndex,
    headers: Vec<BlockHeader>,
    // for validating headers
    hvc: ValidationContext,
    // for validating transactions
    tvc: ValidationContext,
}

impl ScratchChain {
    /// Initializes a scratch chain on top of the provided context.
    pub fn new(context: ValidationContext) -> Self {
        ScratchChain {
            base: context.index,
            headers: Vec::new(),
            hvc: context.clone(),
            tvc: context,
        }
    }

    /// Validates the supplied header and appends it to the chain. Headers
    /// must be appended before their bodies can be applied. On failure the
    /// scratch chain is unchanged and the validation error is returned
    /// as-is.
    pub fn append_header(&mut self, header: BlockHeader) -> Result<(), ValidationError> {
        validate_header(&self.hvc, &header)?;
        self.hvc.apply_header(&header);
        debug!(target: LOG_TARGET, "accepted {} (tip {})", header, self.hvc.index);
        self.headers.push(header);
        Ok(())
    }

    /// Fully validates and applies a block whose header was already
    /// accepted, returning the resulting checkpoint. On failure the scratch
    /// chain is unchanged.
    pub fn apply_block(&mut self, block: &Block) -> Result<Checkpoint, ScratchChainError> {
        if self.tvc.index.height + 1 > self.hvc.index.height {
            return Err(ScratchChainError::MoreBlocksThanHeaders);
        }
        validate_block(&self.tvc, block)?;
        self.tvc = apply_block(self.tvc.clone(), block).context;
        Ok(Checkpoint {
            block: block.clone(),
            context: self.tvc.clone(),
        })
    }

    /// The header index at the given height, which may or may not have a
    /// corresponding validated block.
    ///
    /// Panics when the height is outside the chain.
    pub fn index(&self, height: u64) -> ChainIndex {
        let offset = height
            .checked_sub(self.base.height + 1)
            .expect("height at or below the scratch chain base");
        self.headers
            .get(offset as usize)
            .expect("height above the scratch chain tip")
            .index()
    }

    /// The base of the header chain, i.e. the parent of the first header.
    pub fn base(&self) -> ChainIndex {
        self.base
    }

    /// The tip of the header chain, which may or may not have a
    /// corresponding validated block.
    pub fn tip(&self) -> ChainIndex {
        self.hvc.index
    }

    /// The tip of the validated chain: the highest index with a known valid
    /// block.
    pub fn valid_tip(&self) -> ChainIndex {
        self.tvc.index
    }

    /// The lowest index for which there is no validated block.
    ///
    /// Panics when every block has been validated.
    pub fn unvalidated_base(&self) -> ChainIndex {
        if self.tvc.index.height == self.base.height {
            return self.base;
        }
        self.index(self.tvc.index.height + 1)
    }

    /// Whether every accepted header has a validated block.
    pub fn fully_validated(&self) -> bool {
        self.tvc.index == self.hvc.index
    }

    /// The total work of the header chain.
    pub fn total_work(&self) -> Work {
        self.hvc.total_work
    }

    /// Whether the chain contains the given index. Says nothing about
    /// whether that block has been validated.
    pub fn contains(&self, index: ChainIndex) -> bool {
        if !(self.base.height < index.height && index.height <= self.tip().height) {
            return false;
        }
        self.index(index.height) == index
    }

    /// The indices of all accepted headers that still lack a validated
    /// block.
    pub fn unvalidated(&self) -> Vec<ChainIndex> {
        let validated = (self.tvc.index.height - self.base.height) as usize;
        self.headers[validated..].iter().map(BlockHeader::index).collect()
    }
}
