// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! serde helpers for the 64-slot root arrays, which exceed serde's built-in
//! array support.

pub mod hash_slots {
    use std::convert::TryInto;

    use basalt_common_types::types::FixedHash;
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    use crate::MAX_FOREST_HEIGHT;

    pub fn serialize<S: Serializer>(
        slots: &[FixedHash; MAX_FOREST_HEIGHT],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        slots.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[FixedHash; MAX_FOREST_HEIGHT], D::Error> {
        let slots: Vec<FixedHash> = Deserialize::deserialize(deserializer)?;
        slots
            .try_into()
            .map_err(|_| D::Error::custom("expected exactly 64 root slots"))
    }
}
