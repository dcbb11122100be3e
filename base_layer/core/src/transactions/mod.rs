// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! The transaction data model: currency amounts, authenticated state
//! elements and the transaction types that spend, create, revise and
//! resolve them.

mod currency;
mod elements;
mod storage_contract;
mod transaction;

pub use basalt_merkle::LeafPosition;
pub use currency::Currency;
pub use elements::{Address, CoinElement, CoinOutput, ContractElement, ElementId, StakeElement, StakeOutput, StateElement};
pub use storage_contract::StorageContract;
pub use transaction::{
    CoinInput,
    ContractFinalization,
    ContractRenewal,
    ContractResolution,
    ContractRevision,
    Resolution,
    StakeInput,
    StorageProof,
    Transaction,
};
