// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::collections::HashSet;

use basalt_common_types::types::FixedHash;
use basalt_merkle::{
    ElementApplyUpdate,
    ElementRevertUpdate,
    HistoryApplyUpdate,
    HistoryRevertUpdate,
    LeafPosition,
    NewLeaf,
    UpdatedLeaf,
};
use log::*;

use crate::{
    blocks::{Block, ChainIndex},
    consensus::{ConsensusHasher, ValidationContext},
    consts::STAKE_SUPPLY,
    proof_of_work::Work,
    transactions::{
        CoinElement,
        CoinOutput,
        ContractElement,
        ElementId,
        Resolution,
        StakeElement,
        StateElement,
    },
};

pub const LOG_TARGET: &str = "basalt::consensus::update";

/// The history accumulator's leaf for one block.
pub(crate) fn history_leaf(index: &ChainIndex) -> FixedHash {
    ConsensusHasher::new("leaf/history").chain(index).finalize()
}

// The ordered diff a block makes to existing elements: the spent, revised
// and resolved element lists, plus the forest leaves they correspond to.
// In the apply direction leaves carry their post-block payloads and spent
// markers; in the revert direction they carry the pre-block state.
fn updated_in_block(
    block: &Block,
    apply: bool,
) -> (
    Vec<CoinElement>,
    Vec<StakeElement>,
    Vec<ContractElement>,
    Vec<ContractElement>,
    Vec<UpdatedLeaf>,
) {
    let mut spent_coins = Vec::new();
    let mut spent_stakes = Vec::new();
    let mut revised = Vec::new();
    let mut resolved = Vec::new();
    let mut leaves = Vec::new();

    for transaction in &block.transactions {
        for input in &transaction.coin_inputs {
            if let LeafPosition::Real(leaf_index) = input.parent.state.leaf_position {
                spent_coins.push(input.parent.clone());
                leaves.push(UpdatedLeaf {
                    leaf_index,
                    hash: input.parent.leaf_hash(apply),
                    proof: input.parent.state.merkle_proof.clone(),
                });
            }
        }
        for input in &transaction.stake_inputs {
            spent_stakes.push(input.parent.clone());
            leaves.push(UpdatedLeaf {
                leaf_index: input.parent.state.leaf_position.index(),
                hash: input.parent.leaf_hash(apply),
                proof: input.parent.state.merkle_proof.clone(),
            });
        }
        for revision in &transaction.contract_revisions {
            let mut element = revision.parent.clone();
            if apply {
                element.contract = revision.revision.clone();
            }
            leaves.push(UpdatedLeaf {
                leaf_index: element.state.leaf_position.index(),
                hash: element.leaf_hash(false),
                proof: element.state.merkle_proof.clone(),
            });
            revised.push(element);
        }
        for resolution in &transaction.contract_resolutions {
            let mut element = resolution.parent.clone();
            if apply {
                match &resolution.resolution {
                    Resolution::Renewal(renewal) => element.contract = renewal.final_revision.clone(),
                    Resolution::Finalization(finalization) => element.contract = finalization.contract.clone(),
                    Resolution::StorageProof(_) | Resolution::Expiration => {},
                }
            }
            leaves.push(UpdatedLeaf {
                leaf_index: element.state.leaf_position.index(),
                hash: element.leaf_hash(apply),
                proof: element.state.merkle_proof.clone(),
            });
            resolved.push(element);
        }
    }

    (spent_coins, spent_stakes, revised, resolved, leaves)
}

// The ordered elements a block creates: block-level creations first (the
// reward, then the subsidy when due), then per-transaction creations with a
// shared per-transaction id counter. Leaf positions are assigned later by
// the accumulator.
fn created_in_block(
    vc: &ValidationContext,
    block: &Block,
) -> (Vec<CoinElement>, Vec<StakeElement>, Vec<ContractElement>) {
    let mut coins = Vec::new();
    let mut stakes = Vec::new();
    let mut contracts = Vec::new();

    coins.push(CoinElement {
        state: StateElement::new(ElementId {
            source: block.id(),
            index: 0,
        }),
        output: CoinOutput {
            value: vc.block_reward(),
            address: block.header.miner_address,
        },
        maturity_height: vc.maturity_height(),
    });
    let subsidy = vc.foundation_subsidy();
    if !subsidy.is_zero() {
        coins.push(CoinElement {
            state: StateElement::new(ElementId {
                source: block.id(),
                index: 1,
            }),
            output: CoinOutput {
                value: subsidy,
                address: vc.foundation_address,
            },
            maturity_height: vc.maturity_height(),
        });
    }

    for transaction in &block.transactions {
        let source = transaction.id();
        let mut index = 0u64;
        let mut next_element = || {
            let state = StateElement::new(ElementId { source, index });
            index += 1;
            state
        };

        for output in &transaction.coin_outputs {
            coins.push(CoinElement {
                state: next_element(),
                output: output.clone(),
                maturity_height: 0,
            });
        }
        for input in &transaction.stake_inputs {
            // disburse the stake's accrued share of the tax pool
            let claim = (vc.stake_pool - input.parent.claim_start)
                .div_u64(STAKE_SUPPLY)
                .mul_u64(input.parent.output.value);
            coins.push(CoinElement {
                state: next_element(),
                output: CoinOutput {
                    value: claim,
                    address: input.claim_address,
                },
                maturity_height: vc.maturity_height(),
            });
        }
        for output in &transaction.stake_outputs {
            stakes.push(StakeElement {
                state: next_element(),
                output: output.clone(),
                claim_start: vc.stake_pool,
            });
        }
        for contract in &transaction.contracts {
            contracts.push(ContractElement {
                state: next_element(),
                contract: contract.clone(),
            });
        }
        for resolution in &transaction.contract_resolutions {
            let parent = &resolution.parent;
            let (renter, host) = match &resolution.resolution {
                Resolution::Renewal(renewal) => {
                    let mut renter = renewal.final_revision.renter_output.clone();
                    let mut host = renewal.final_revision.host_output.clone();
                    renter.value = renter.value - renewal.renter_rollover;
                    host.value = host.value - renewal.host_rollover;
                    contracts.push(ContractElement {
                        state: next_element(),
                        contract: renewal.initial_revision.clone(),
                    });
                    (renter, host)
                },
                Resolution::StorageProof(_) => {
                    (parent.contract.renter_output.clone(), parent.contract.host_output.clone())
                },
                Resolution::Finalization(finalization) => (
                    finalization.contract.renter_output.clone(),
                    finalization.contract.host_output.clone(),
                ),
                Resolution::Expiration => {
                    (parent.contract.renter_output.clone(), parent.contract.missed_host_output())
                },
            };
            coins.push(CoinElement {
                state: next_element(),
                output: renter,
                maturity_height: vc.maturity_height(),
            });
            coins.push(CoinElement {
                state: next_element(),
                output: host,
                maturity_height: vc.maturity_height(),
            });
        }
    }

    (coins, stakes, contracts)
}

/// Reflects the changes to consensus state resulting from the application
/// of a block.
#[derive(Clone, Debug)]
pub struct ApplyUpdate {
    pub element_update: ElementApplyUpdate,
    pub history_update: HistoryApplyUpdate,
    pub context: ValidationContext,
    pub spent_coins: Vec<CoinElement>,
    pub spent_stakes: Vec<StakeElement>,
    pub revised_contracts: Vec<ContractElement>,
    pub resolved_contracts: Vec<ContractElement>,
    pub new_coin_elements: Vec<CoinElement>,
    pub new_stake_elements: Vec<StakeElement>,
    pub new_contract_elements: Vec<ContractElement>,
}

impl ApplyUpdate {
    /// Folds this update into a long-lived element handle, keeping its
    /// authentication path valid for the new context.
    ///
    /// Panics on ephemeral elements.
    pub fn update_element_proof(&self, element: &mut StateElement) {
        match element.leaf_position {
            LeafPosition::Real(leaf_index) => {
                self.element_update.update_leaf_proof(leaf_index, &mut element.merkle_proof)
            },
            LeafPosition::Ephemeral => panic!("cannot update the proof of an ephemeral element"),
        }
    }

    /// Whether the given coin element was spent by the applied block.
    pub fn coin_element_was_spent(&self, element: &CoinElement) -> bool {
        self.spent_coins
            .iter()
            .any(|spent| spent.state.leaf_position == element.state.leaf_position)
    }

    /// Whether the given stake element was spent by the applied block.
    pub fn stake_element_was_spent(&self, element: &StakeElement) -> bool {
        self.spent_stakes
            .iter()
            .any(|spent| spent.state.leaf_position == element.state.leaf_position)
    }

    /// Whether the given contract was resolved by the applied block.
    pub fn contract_element_was_resolved(&self, element: &ContractElement) -> bool {
        self.resolved_contracts
            .iter()
            .any(|resolved| resolved.state.leaf_position == element.state.leaf_position)
    }
}

/// Integrates a block into the given context, producing an [`ApplyUpdate`]
/// detailing the resulting changes. The block must already be fully
/// validated.
///
/// Panics when the block is not a child of the context's tip.
pub fn apply_block(mut context: ValidationContext, block: &Block) -> ApplyUpdate {
    if context.index.height > 0 && block.header.parent_index() != context.index {
        panic!("cannot apply a non-child block");
    }
    trace!(target: LOG_TARGET, "applying {}", block);

    let (spent_coins, spent_stakes, revised_contracts, resolved_contracts, updated) = updated_in_block(block, true);
    let (mut new_coins, mut new_stakes, mut new_contracts) = created_in_block(&context, block);

    // elements spent in the same block that created them never reach the
    // accumulator
    let mut spent_ephemeral: HashSet<ElementId> = HashSet::new();
    for transaction in &block.transactions {
        for input in &transaction.coin_inputs {
            if input.parent.state.leaf_position.is_ephemeral() {
                spent_ephemeral.insert(input.parent.state.id);
            }
        }
    }

    let mut created = Vec::with_capacity(new_coins.len() + new_stakes.len() + new_contracts.len());
    for element in &new_coins {
        let ephemeral = spent_ephemeral.contains(&element.state.id);
        created.push(NewLeaf {
            hash: element.leaf_hash(ephemeral),
            ephemeral,
        });
    }
    for element in &new_stakes {
        let ephemeral = spent_ephemeral.contains(&element.state.id);
        created.push(NewLeaf {
            hash: element.leaf_hash(ephemeral),
            ephemeral,
        });
    }
    for element in &new_contracts {
        let ephemeral = spent_ephemeral.contains(&element.state.id);
        created.push(NewLeaf {
            hash: element.leaf_hash(ephemeral),
            ephemeral,
        });
    }

    let (element_update, placements) = context.state.apply_block(updated, &created);
    let mut placements = placements.into_iter();
    for element in new_coins
        .iter_mut()
        .map(|e| &mut e.state)
        .chain(new_stakes.iter_mut().map(|e| &mut e.state))
        .chain(new_contracts.iter_mut().map(|e| &mut e.state))
    {
        let placement = placements
            .next()
            .expect("accumulator assigned fewer placements than created elements");
        element.leaf_position = placement.position;
        element.merkle_proof = placement.proof;
    }

    let history_update = context.history.apply_block(history_leaf(&block.index()));

    context.apply_header(&block.header);
    for transaction in &block.transactions {
        // every contract entering the live set is taxed, including the
        // successors created by renewals
        for contract in &transaction.contracts {
            context.stake_pool = context.stake_pool + context.file_contract_tax(contract);
        }
        for resolution in &transaction.contract_resolutions {
            if let Resolution::Renewal(renewal) = &resolution.resolution {
                context.stake_pool =
                    context.stake_pool + context.file_contract_tax(&renewal.initial_revision);
            }
        }
        if let Some(address) = transaction.new_foundation_address {
            context.foundation_address = address;
        }
    }

    ApplyUpdate {
        element_update,
        history_update,
        context,
        spent_coins,
        spent_stakes,
        revised_contracts,
        resolved_contracts,
        new_coin_elements: new_coins,
        new_stake_elements: new_stakes,
        new_contract_elements: new_contracts,
    }
}

/// The [`ApplyUpdate`] for a genesis block.
pub fn genesis_update(block: &Block, initial_difficulty: Work) -> ApplyUpdate {
    apply_block(
        ValidationContext::new(initial_difficulty, block.header.timestamp),
        block,
    )
}

/// Reflects the changes to consensus state resulting from the removal of a
/// block.
#[derive(Clone, Debug)]
pub struct RevertUpdate {
    pub element_update: ElementRevertUpdate,
    pub history_update: HistoryRevertUpdate,
    pub context: ValidationContext,
    pub spent_coins: Vec<CoinElement>,
    pub spent_stakes: Vec<StakeElement>,
    pub revised_contracts: Vec<ContractElement>,
    pub resolved_contracts: Vec<ContractElement>,
    pub new_coin_elements: Vec<CoinElement>,
    pub new_stake_elements: Vec<StakeElement>,
    pub new_contract_elements: Vec<ContractElement>,
}

impl RevertUpdate {
    /// Rolls a long-lived element handle back across the reverted block.
    ///
    /// Panics on ephemeral elements and on elements that do not exist in
    /// the restored context.
    pub fn update_element_proof(&self, element: &mut StateElement) {
        match element.leaf_position {
            LeafPosition::Real(leaf_index) => {
                self.element_update.update_leaf_proof(leaf_index, &mut element.merkle_proof)
            },
            LeafPosition::Ephemeral => panic!("cannot update the proof of an ephemeral element"),
        }
    }

    /// Whether the given coin element was removed by the reversion, i.e.
    /// created by the reverted block.
    pub fn coin_element_was_removed(&self, element: &CoinElement) -> bool {
        match element.state.leaf_position {
            LeafPosition::Real(leaf_index) => leaf_index >= self.context.state.num_leaves(),
            LeafPosition::Ephemeral => false,
        }
    }

    /// Whether the given stake element was removed by the reversion.
    pub fn stake_element_was_removed(&self, element: &StakeElement) -> bool {
        match element.state.leaf_position {
            LeafPosition::Real(leaf_index) => leaf_index >= self.context.state.num_leaves(),
            LeafPosition::Ephemeral => false,
        }
    }

    /// Whether the given contract element was removed by the reversion.
    pub fn contract_element_was_removed(&self, element: &ContractElement) -> bool {
        match element.state.leaf_position {
            LeafPosition::Real(leaf_index) => leaf_index >= self.context.state.num_leaves(),
            LeafPosition::Ephemeral => false,
        }
    }
}

/// Produces a [`RevertUpdate`] from a block and the context that preceded
/// it.
///
/// Panics on genesis blocks and on blocks that are not children of the
/// given context.
pub fn revert_block(context: ValidationContext, block: &Block) -> RevertUpdate {
    if block.header.height == 0 {
        panic!("cannot revert the genesis block");
    }
    if block.header.parent_index() != context.index {
        panic!("cannot revert a non-child block");
    }
    trace!(target: LOG_TARGET, "reverting {}", block);

    let (spent_coins, spent_stakes, revised_contracts, resolved_contracts, updated) = updated_in_block(block, false);
    let (new_coins, new_stakes, new_contracts) = created_in_block(&context, block);
    let history_update = context.history.revert_block();
    let element_update = context.state.revert_block(updated);

    RevertUpdate {
        element_update,
        history_update,
        context,
        spent_coins,
        spent_stakes,
        revised_contracts,
        resolved_contracts,
        new_coin_elements: new_coins,
        new_stake_elements: new_stakes,
        new_contract_elements: new_contracts,
    }
}
