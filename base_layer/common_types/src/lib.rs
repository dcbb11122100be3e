// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Common types shared across the Basalt base layer: fixed-size hashes,
//! epoch timestamps and hex formatting.

pub mod epoch_time;
pub mod hex;
pub mod types;
