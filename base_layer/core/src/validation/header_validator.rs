// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use crate::{
    blocks::BlockHeader,
    consensus::ValidationContext,
    validation::{
        helpers::{check_pow, check_timestamp_ftl, check_timestamp_greater_than_median},
        ValidationError,
    },
};

/// Validates a header against the given context, in order of cheapest check
/// to most expensive:
/// 1. Does the height follow the context's tip?
/// 1. Does the parent id match the tip?
/// 1. Is the timestamp within the future time limit?
/// 1. Does the timestamp exceed the median of the recent window?
/// 1. Does the header id meet the difficulty target?
pub fn validate_header(vc: &ValidationContext, header: &BlockHeader) -> Result<(), ValidationError> {
    let expected_height = vc.index.height + 1;
    if header.height != expected_height {
        return Err(ValidationError::InvalidHeight {
            expected: expected_height,
            actual: header.height,
        });
    }
    if header.parent_id != vc.index.id {
        return Err(ValidationError::InvalidParentId {
            expected: vc.index.id,
            actual: header.parent_id,
        });
    }
    check_timestamp_ftl(header)?;
    check_timestamp_greater_than_median(vc, header)?;
    check_pow(vc, header)?;
    Ok(())
}
