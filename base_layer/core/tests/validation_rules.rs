// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use basalt_common_types::types::FixedHash;
use basalt_core::{
    consensus::{apply_block, genesis_update},
    proof_of_work::{hash_requiring_work, Work},
    test_helpers::{
        find_block_nonce,
        genesis_with_coin_outputs,
        mine_block,
        placeholder_signature,
        sign_all_inputs,
        testing_keypair,
    },
    transactions::{CoinInput, CoinOutput, Currency, Transaction},
    validation::{validate_block, ValidationError},
};

fn testing_difficulty() -> Work {
    Work::from(1_000)
}

fn funded_genesis() -> (ed25519_dalek::SigningKey, basalt_core::transactions::Address, basalt_core::blocks::Block) {
    let (key, address) = testing_keypair(0);
    let genesis = genesis_with_coin_outputs(vec![
        CoinOutput {
            value: Currency::coins(100),
            address,
        },
        CoinOutput {
            value: Currency::coins(100),
            address,
        },
    ]);
    (key, address, genesis)
}

#[test]
fn immature_rewards_cannot_be_spent() {
    let (key, address, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let block1 = mine_block(&update0.context, &genesis, Vec::new());
    let update1 = apply_block(update0.context, &block1);
    let reward = update1.new_coin_elements[0].clone();
    assert!(reward.maturity_height > update1.context.child_height());

    let mut txn = Transaction {
        coin_inputs: vec![CoinInput {
            parent: reward,
            public_key: key.verifying_key(),
            signature: placeholder_signature(),
        }],
        coin_outputs: vec![CoinOutput {
            value: update1.new_coin_elements[0].output.value,
            address,
        }],
        ..Default::default()
    };
    sign_all_inputs(&mut txn, &update1.context, &key);
    let block2 = mine_block(&update1.context, &block1, vec![txn]);
    match validate_block(&update1.context, &block2) {
        Err(ValidationError::ImmatureCoinOutput { .. }) => {},
        other => panic!("expected a maturity failure, got {:?}", other),
    }
}

#[test]
fn double_spends_within_a_block_are_rejected() {
    let (key, address, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());
    let parent = update0.new_coin_elements[1].clone();

    let mut txn = Transaction {
        coin_inputs: vec![
            CoinInput {
                parent: parent.clone(),
                public_key: key.verifying_key(),
                signature: placeholder_signature(),
            },
            CoinInput {
                parent,
                public_key: key.verifying_key(),
                signature: placeholder_signature(),
            },
        ],
        coin_outputs: vec![CoinOutput {
            value: Currency::coins(200),
            address,
        }],
        ..Default::default()
    };
    sign_all_inputs(&mut txn, &update0.context, &key);
    let block1 = mine_block(&update0.context, &genesis, vec![txn]);
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::DoubleSpend(_)) => {},
        other => panic!("expected a double-spend failure, got {:?}", other),
    }
}

#[test]
fn spends_need_the_owners_key() {
    let (_, address, genesis) = funded_genesis();
    let (other_key, _) = testing_keypair(7);
    let update0 = genesis_update(&genesis, testing_difficulty());

    let mut txn = Transaction {
        coin_inputs: vec![CoinInput {
            parent: update0.new_coin_elements[1].clone(),
            public_key: other_key.verifying_key(),
            signature: placeholder_signature(),
        }],
        coin_outputs: vec![CoinOutput {
            value: Currency::coins(100),
            address,
        }],
        ..Default::default()
    };
    sign_all_inputs(&mut txn, &update0.context, &other_key);
    let block1 = mine_block(&update0.context, &genesis, vec![txn]);
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::InvalidSignature(_)) => {},
        other => panic!("expected a signature failure, got {:?}", other),
    }
}

#[test]
fn unbalanced_transactions_are_rejected() {
    let (key, address, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let mut txn = Transaction {
        coin_inputs: vec![CoinInput {
            parent: update0.new_coin_elements[1].clone(),
            public_key: key.verifying_key(),
            signature: placeholder_signature(),
        }],
        coin_outputs: vec![CoinOutput {
            value: Currency::coins(101),
            address,
        }],
        ..Default::default()
    };
    sign_all_inputs(&mut txn, &update0.context, &key);
    let block1 = mine_block(&update0.context, &genesis, vec![txn]);
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::CoinBalanceMismatch { inflow, outflow }) => {
            assert_eq!(inflow, Currency::coins(100));
            assert_eq!(outflow, Currency::coins(101));
        },
        other => panic!("expected a balance failure, got {:?}", other),
    }
}

#[test]
fn tampered_bodies_break_the_commitment() {
    let (_, _, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let mut block1 = mine_block(&update0.context, &genesis, Vec::new());
    block1.transactions.push(Transaction {
        miner_fee: Currency::ZERO,
        ..Default::default()
    });
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::CommitmentMismatch) => {},
        other => panic!("expected a commitment failure, got {:?}", other),
    }
}

#[test]
fn unknown_elements_are_rejected() {
    let (key, address, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let mut fabricated = update0.new_coin_elements[1].clone();
    fabricated.output.value = Currency::coins(1_000_000);
    let mut txn = Transaction {
        coin_inputs: vec![CoinInput {
            parent: fabricated,
            public_key: key.verifying_key(),
            signature: placeholder_signature(),
        }],
        coin_outputs: vec![CoinOutput {
            value: Currency::coins(1_000_000),
            address,
        }],
        ..Default::default()
    };
    sign_all_inputs(&mut txn, &update0.context, &key);
    let block1 = mine_block(&update0.context, &genesis, vec![txn]);
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::UnknownElement(_)) => {},
        other => panic!("expected a membership failure, got {:?}", other),
    }
}

#[test]
fn timestamps_must_exceed_the_median() {
    let (_, _, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let mut block1 = mine_block(&update0.context, &genesis, Vec::new());
    // rewind the timestamp to the median (the genesis timestamp)
    block1.header.timestamp = genesis.header.timestamp;
    find_block_nonce(&mut block1.header, &hash_requiring_work(update0.context.difficulty));
    match validate_block(&update0.context, &block1) {
        Err(ValidationError::TimestampTooEarly { .. }) => {},
        other => panic!("expected a timestamp failure, got {:?}", other),
    }
}

#[test]
fn headers_must_chain_to_the_tip() {
    let (_, _, genesis) = funded_genesis();
    let update0 = genesis_update(&genesis, testing_difficulty());

    let block1 = mine_block(&update0.context, &genesis, Vec::new());
    let update1 = apply_block(update0.context.clone(), &block1);
    let block2 = mine_block(&update1.context, &block1, Vec::new());

    // a height-2 block validated against the genesis context
    match validate_block(&update0.context, &block2) {
        Err(ValidationError::InvalidHeight { expected: 1, actual: 2 }) => {},
        other => panic!("expected a height failure, got {:?}", other),
    }

    // right height, wrong parent
    let mut orphan = block2.clone();
    orphan.header.height = 1;
    orphan.header.parent_id = FixedHash::from([9u8; 32]);
    find_block_nonce(&mut orphan.header, &hash_requiring_work(update0.context.difficulty));
    match validate_block(&update0.context, &orphan) {
        Err(ValidationError::InvalidParentId { .. }) => {},
        other => panic!("expected a parent-id failure, got {:?}", other),
    }
}
