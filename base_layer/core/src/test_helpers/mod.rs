// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

//! Helpers for building small test chains: deterministic keypairs, genesis
//! construction, mining at the current difficulty and input signing. Test
//! support only; none of this is consensus-critical.

use basalt_common_types::{epoch_time::EpochTime, types::BlockHash};
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::Rng;

use crate::{
    blocks::{Block, BlockHeader},
    consensus::{block_commitment, ValidationContext},
    consts::NONCE_FACTOR,
    proof_of_work::{hash_requiring_work, meets_target},
    transactions::{Address, CoinOutput, StakeOutput, Transaction},
    validation::input_sig_hash,
};

/// A deterministic keypair and its standard address.
pub fn testing_keypair(seed: u8) -> (SigningKey, Address) {
    let key = SigningKey::from_bytes(&[seed; 32]);
    let address = Address::standard(&key.verifying_key());
    (key, address)
}

/// A structurally-valid signature for constructing inputs before signing.
pub fn placeholder_signature() -> Signature {
    Signature::from_bytes(&[0u8; 64])
}

/// A genesis block whose single transaction creates the given outputs.
pub fn genesis_with_outputs(coin_outputs: Vec<CoinOutput>, stake_outputs: Vec<StakeOutput>) -> Block {
    let transactions = vec![Transaction {
        coin_outputs,
        stake_outputs,
        ..Default::default()
    }];
    let miner_address = Address::VOID;
    Block {
        header: BlockHeader {
            height: 0,
            parent_id: BlockHash::zero(),
            nonce: 0,
            timestamp: EpochTime::now(),
            miner_address,
            commitment: block_commitment(miner_address, &transactions),
        },
        transactions,
    }
}

/// A genesis block creating only coin outputs.
pub fn genesis_with_coin_outputs(coin_outputs: Vec<CoinOutput>) -> Block {
    genesis_with_outputs(coin_outputs, Vec::new())
}

/// Grinds the header's nonce, striding by [`NONCE_FACTOR`], until the
/// header id meets the target.
pub fn find_block_nonce(header: &mut BlockHeader, target: &BlockHash) {
    header.nonce = rand::thread_rng().gen_range(0..u64::from(u32::MAX)) * NONCE_FACTOR;
    while !meets_target(&header.id(), target) {
        header.nonce += NONCE_FACTOR;
    }
}

/// Builds and mines a child of `parent` at the context's difficulty.
pub fn mine_block(vc: &ValidationContext, parent: &Block, transactions: Vec<Transaction>) -> Block {
    let miner_address = Address::VOID;
    let mut header = BlockHeader {
        height: parent.header.height + 1,
        parent_id: parent.header.id(),
        nonce: 0,
        timestamp: parent.header.timestamp.increase(1),
        miner_address,
        commitment: block_commitment(miner_address, &transactions),
    };
    find_block_nonce(&mut header, &hash_requiring_work(vc.difficulty));
    Block { header, transactions }
}

/// Signs every coin and stake input of the transaction with the same key,
/// binding the signatures to the given context.
pub fn sign_all_inputs(transaction: &mut Transaction, vc: &ValidationContext, key: &SigningKey) {
    let sig_hash = input_sig_hash(vc, transaction);
    let signature = key.sign(sig_hash.as_slice());
    let public_key = key.verifying_key();
    for input in transaction.coin_inputs.iter_mut() {
        input.public_key = public_key;
        input.signature = signature;
    }
    for input in transaction.stake_inputs.iter_mut() {
        input.public_key = public_key;
        input.signature = signature;
    }
}
