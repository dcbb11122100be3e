// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! # Basalt consensus core
//!
//! A pure, deterministic state-transition function for the Basalt chain.
//! Given a validation context (the constant-size summary of consensus
//! state) and a block, the core decides whether the block is valid, derives
//! the next context, and produces the complete diff of authenticated state
//! elements: coin outputs, stake outputs and storage contracts.
//!
//! The crate has no persistence, networking or scheduling of its own. Every
//! operation is synchronous and fully determined by its inputs; callers own
//! the contexts and serialise access themselves.

pub mod blocks;
pub mod consensus;
pub mod consts;
pub mod proof_of_work;
pub mod test_helpers;
pub mod transactions;
pub mod validation;
