// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::collections::{HashMap, HashSet};

use basalt_common_types::types::FixedHash;
use basalt_merkle::{proof_root, LeafPosition};
use ed25519_dalek::{Signature, VerifyingKey};

use crate::{
    blocks::Block,
    consensus::{block_commitment, ConsensusHasher, ValidationContext},
    transactions::{
        Address,
        CoinOutput,
        ContractElement,
        ContractRenewal,
        Currency,
        ElementId,
        Resolution,
        StorageContract,
        StorageProof,
        Transaction,
    },
    validation::{header_validator::validate_header, ValidationError},
};

/// The hash a coin or stake input signature covers: the transaction's
/// canonical encoding bound to the chain index it was built against.
pub fn input_sig_hash(vc: &ValidationContext, transaction: &Transaction) -> FixedHash {
    ConsensusHasher::new("sig/input")
        .chain(&vc.index)
        .chain(transaction)
        .finalize()
}

/// The hash both parties sign to revise (or finalize) a contract.
pub fn revision_sig_hash(vc: &ValidationContext, parent_id: ElementId, contract: &StorageContract) -> FixedHash {
    ConsensusHasher::new("sig/contract")
        .chain(&vc.index)
        .chain(&parent_id)
        .chain(contract)
        .finalize()
}

/// The hash both parties sign to renew a contract.
pub fn renewal_sig_hash(vc: &ValidationContext, parent_id: ElementId, renewal: &ContractRenewal) -> FixedHash {
    ConsensusHasher::new("sig/renewal")
        .chain(&vc.index)
        .chain(&parent_id)
        .chain(&renewal.final_revision)
        .chain(&renewal.initial_revision)
        .chain(&renewal.renter_rollover)
        .chain(&renewal.host_rollover)
        .finalize()
}

fn verify_signature(
    key: &VerifyingKey,
    hash: FixedHash,
    signature: &Signature,
    id: ElementId,
) -> Result<(), ValidationError> {
    key.verify_strict(hash.as_slice(), signature)
        .map_err(|_| ValidationError::InvalidSignature(id))
}

/// Fully validates a block against the given context: header rules, the
/// commitment, and the transaction set.
pub fn validate_block(vc: &ValidationContext, block: &Block) -> Result<(), ValidationError> {
    validate_header(vc, &block.header)?;
    if block_commitment(block.header.miner_address, &block.transactions) != block.header.commitment {
        return Err(ValidationError::CommitmentMismatch);
    }
    validate_transaction_set(vc, block)
}

fn validate_transaction_set(vc: &ValidationContext, block: &Block) -> Result<(), ValidationError> {
    let height = vc.child_height();
    let mut spent: HashSet<ElementId> = HashSet::new();
    // coin outputs created earlier in this block, available for ephemeral
    // spends by later transactions
    let mut ephemeral_outputs: HashMap<ElementId, CoinOutput> = HashMap::new();

    for transaction in &block.transactions {
        let sig_hash = input_sig_hash(vc, transaction);

        for input in &transaction.coin_inputs {
            let id = input.parent.state.id;
            if !spent.insert(id) {
                return Err(ValidationError::DoubleSpend(id));
            }
            match input.parent.state.leaf_position {
                LeafPosition::Ephemeral => match ephemeral_outputs.get(&id) {
                    Some(output) if *output == input.parent.output => {},
                    _ => return Err(ValidationError::InvalidEphemeralSpend(id)),
                },
                LeafPosition::Real(leaf_index) => {
                    if !vc
                        .state
                        .contains_leaf(input.parent.leaf_hash(false), leaf_index, &input.parent.state.merkle_proof)
                    {
                        return Err(ValidationError::UnknownElement(id));
                    }
                },
            }
            if input.parent.maturity_height > height {
                return Err(ValidationError::ImmatureCoinOutput {
                    maturity_height: input.parent.maturity_height,
                    height,
                });
            }
            if Address::standard(&input.public_key) != input.parent.output.address {
                return Err(ValidationError::InvalidSignature(id));
            }
            verify_signature(&input.public_key, sig_hash, &input.signature, id)?;
        }

        for input in &transaction.stake_inputs {
            let id = input.parent.state.id;
            if !spent.insert(id) {
                return Err(ValidationError::DoubleSpend(id));
            }
            let leaf_index = match input.parent.state.leaf_position {
                LeafPosition::Real(leaf_index) => leaf_index,
                LeafPosition::Ephemeral => return Err(ValidationError::UnknownElement(id)),
            };
            if !vc
                .state
                .contains_leaf(input.parent.leaf_hash(false), leaf_index, &input.parent.state.merkle_proof)
            {
                return Err(ValidationError::UnknownElement(id));
            }
            if Address::standard(&input.public_key) != input.parent.output.address {
                return Err(ValidationError::InvalidSignature(id));
            }
            verify_signature(&input.public_key, sig_hash, &input.signature, id)?;
        }

        for contract in &transaction.contracts {
            check_new_contract(contract, height)?;
        }

        for revision in &transaction.contract_revisions {
            let parent = &revision.parent;
            let id = parent.state.id;
            if !spent.insert(id) {
                return Err(ValidationError::DoubleSpend(id));
            }
            check_contract_membership(vc, parent, id)?;
            if height >= parent.contract.window_start {
                return Err(ValidationError::LateRevision { height });
            }
            if revision.revision.revision_number <= parent.contract.revision_number {
                return Err(ValidationError::RevisionNumberNotIncreased {
                    parent: parent.contract.revision_number,
                    actual: revision.revision.revision_number,
                });
            }
            if revision.revision.window_end <= revision.revision.window_start {
                return Err(ValidationError::InvalidContractWindow {
                    window_start: revision.revision.window_start,
                    window_end: revision.revision.window_end,
                    height,
                });
            }
            let hash = revision_sig_hash(vc, id, &revision.revision);
            verify_signature(&parent.contract.renter_public_key, hash, &revision.renter_signature, id)?;
            verify_signature(&parent.contract.host_public_key, hash, &revision.host_signature, id)?;
        }

        for resolution in &transaction.contract_resolutions {
            let parent = &resolution.parent;
            let id = parent.state.id;
            if !spent.insert(id) {
                return Err(ValidationError::DoubleSpend(id));
            }
            check_contract_membership(vc, parent, id)?;
            let contract = &parent.contract;
            match &resolution.resolution {
                Resolution::StorageProof(proof) => {
                    if height < contract.window_start || height >= contract.window_end {
                        return Err(ValidationError::ResolutionOutsideWindow);
                    }
                    check_storage_proof(contract, proof)?;
                },
                Resolution::Expiration => {
                    if height < contract.window_end {
                        return Err(ValidationError::ResolutionOutsideWindow);
                    }
                },
                Resolution::Finalization(finalization) => {
                    if height >= contract.window_start {
                        return Err(ValidationError::ResolutionOutsideWindow);
                    }
                    if finalization.contract.revision_number <= contract.revision_number {
                        return Err(ValidationError::RevisionNumberNotIncreased {
                            parent: contract.revision_number,
                            actual: finalization.contract.revision_number,
                        });
                    }
                    let hash = revision_sig_hash(vc, id, &finalization.contract);
                    verify_signature(&contract.renter_public_key, hash, &finalization.renter_signature, id)?;
                    verify_signature(&contract.host_public_key, hash, &finalization.host_signature, id)?;
                },
                Resolution::Renewal(renewal) => {
                    if height >= contract.window_start {
                        return Err(ValidationError::ResolutionOutsideWindow);
                    }
                    if renewal.renter_rollover > renewal.final_revision.renter_output.value ||
                        renewal.host_rollover > renewal.final_revision.host_output.value
                    {
                        return Err(ValidationError::InvalidRollover);
                    }
                    let rollover = renewal.renter_rollover + renewal.host_rollover;
                    if rollover > renewal.initial_revision.payout() {
                        return Err(ValidationError::InvalidRollover);
                    }
                    check_new_contract(&renewal.initial_revision, height)?;
                    let hash = renewal_sig_hash(vc, id, renewal);
                    verify_signature(&contract.renter_public_key, hash, &renewal.renter_signature, id)?;
                    verify_signature(&contract.host_public_key, hash, &renewal.host_signature, id)?;
                },
            }
        }

        check_coin_balance(vc, transaction)?;
        check_stake_balance(transaction)?;

        let source = transaction.id();
        for (index, output) in transaction.coin_outputs.iter().enumerate() {
            ephemeral_outputs.insert(
                ElementId {
                    source,
                    index: index as u64,
                },
                output.clone(),
            );
        }
    }

    Ok(())
}

fn check_contract_membership(
    vc: &ValidationContext,
    parent: &ContractElement,
    id: ElementId,
) -> Result<(), ValidationError> {
    let leaf_index = match parent.state.leaf_position {
        LeafPosition::Real(leaf_index) => leaf_index,
        LeafPosition::Ephemeral => return Err(ValidationError::UnknownElement(id)),
    };
    if !vc
        .state
        .contains_leaf(parent.leaf_hash(false), leaf_index, &parent.state.merkle_proof)
    {
        return Err(ValidationError::UnknownElement(id));
    }
    Ok(())
}

fn check_new_contract(contract: &StorageContract, height: u64) -> Result<(), ValidationError> {
    if contract.window_start <= height || contract.window_end <= contract.window_start {
        return Err(ValidationError::InvalidContractWindow {
            window_start: contract.window_start,
            window_end: contract.window_end,
            height,
        });
    }
    if contract.missed_host_value > contract.host_output.value {
        return Err(ValidationError::InvalidMissedHostValue);
    }
    Ok(())
}

fn check_storage_proof(
    contract: &StorageContract,
    proof: &StorageProof,
) -> Result<(), ValidationError> {
    // an empty contract stores nothing; no proof body is required
    if contract.filesize == 0 {
        return Ok(());
    }
    let leaf_hash = ConsensusHasher::new("leaf/segment")
        .chain(proof.leaf.as_slice())
        .finalize();
    if proof_root(leaf_hash, proof.leaf_index, &proof.proof) != contract.file_merkle_root {
        return Err(ValidationError::InvalidStorageProof);
    }
    Ok(())
}

fn check_coin_balance(vc: &ValidationContext, transaction: &Transaction) -> Result<(), ValidationError> {
    let mut inflow = Currency::ZERO;
    for input in &transaction.coin_inputs {
        inflow = inflow
            .checked_add(input.parent.output.value)
            .ok_or(ValidationError::BalanceOverflow)?;
    }

    let mut outflow = transaction.miner_fee;
    for output in &transaction.coin_outputs {
        outflow = outflow
            .checked_add(output.value)
            .ok_or(ValidationError::BalanceOverflow)?;
    }
    for contract in &transaction.contracts {
        outflow = outflow
            .checked_add(contract.payout())
            .and_then(|sum| sum.checked_add(vc.file_contract_tax(contract)))
            .ok_or(ValidationError::BalanceOverflow)?;
    }
    for resolution in &transaction.contract_resolutions {
        if let Resolution::Renewal(renewal) = &resolution.resolution {
            // the renewal's new contract is funded by its rollover plus
            // fresh inputs, and taxed like any new contract
            let rollover = renewal
                .renter_rollover
                .checked_add(renewal.host_rollover)
                .ok_or(ValidationError::BalanceOverflow)?;
            outflow = outflow
                .checked_add(renewal.initial_revision.payout() - rollover)
                .and_then(|sum| sum.checked_add(vc.file_contract_tax(&renewal.initial_revision)))
                .ok_or(ValidationError::BalanceOverflow)?;
        }
    }

    if inflow != outflow {
        return Err(ValidationError::CoinBalanceMismatch { inflow, outflow });
    }
    Ok(())
}

fn check_stake_balance(transaction: &Transaction) -> Result<(), ValidationError> {
    let inflow: u64 = transaction
        .stake_inputs
        .iter()
        .map(|input| input.parent.output.value)
        .sum();
    let outflow: u64 = transaction.stake_outputs.iter().map(|output| output.value).sum();
    if inflow != outflow {
        return Err(ValidationError::StakeBalanceMismatch { inflow, outflow });
    }
    Ok(())
}
