// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::types::FixedHash;
use blake2::Blake2b;
use digest::{consts::U32, Digest};

/// Returns a Blake2b-256 digest seeded with a length-prefixed domain label.
pub(crate) fn domain_hasher(label: &str) -> Blake2b<U32> {
    let mut digest = Blake2b::<U32>::new();
    digest.update((label.len() as u64).to_le_bytes());
    digest.update(label.as_bytes());
    digest
}

/// Hash of an interior forest node from its two children.
pub fn node_hash(left: &FixedHash, right: &FixedHash) -> FixedHash {
    let mut digest = domain_hasher("com.basalt.merkle.node.v1");
    digest.update(left.as_slice());
    digest.update(right.as_slice());
    let hash: [u8; 32] = digest.finalize().into();
    FixedHash::from(hash)
}

/// Folds a leaf hash up its authentication path. Bit `i` of `leaf_index`
/// selects on which side the leaf's ancestor sits at level `i`.
pub fn proof_root(leaf_hash: FixedHash, leaf_index: u64, proof: &[FixedHash]) -> FixedHash {
    proof.iter().enumerate().fold(leaf_hash, |acc, (i, sibling)| {
        if leaf_index & (1 << i) == 0 {
            node_hash(&acc, sibling)
        } else {
            node_hash(sibling, &acc)
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_hash_is_order_sensitive() {
        let a = FixedHash::from([1u8; 32]);
        let b = FixedHash::from([2u8; 32]);
        assert_ne!(node_hash(&a, &b), node_hash(&b, &a));
    }

    #[test]
    fn proof_root_follows_index_bits() {
        let leaf = FixedHash::from([7u8; 32]);
        let sibling = FixedHash::from([9u8; 32]);
        assert_eq!(proof_root(leaf, 0, &[sibling]), node_hash(&leaf, &sibling));
        assert_eq!(proof_root(leaf, 1, &[sibling]), node_hash(&sibling, &leaf));
    }
}
