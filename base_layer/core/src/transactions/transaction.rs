// Copyright 2023. The Basalt Developers
// SPDX-License-Identifier: BSD-3-Clause

use std::{io, io::Write};

use basalt_common_types::types::FixedHash;
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    consensus::{ConsensusEncoding, ConsensusHasher},
    transactions::{Address, CoinElement, CoinOutput, ContractElement, Currency, StakeElement, StakeOutput, StorageContract},
};

/// Spends a coin element. The public key must hash to the parent output's
/// address; the signature covers the transaction and the chain index it was
/// built against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInput {
    pub parent: CoinElement,
    pub public_key: VerifyingKey,
    pub signature: Signature,
}

/// Spends a stake element. Spending also disburses the stake's accrued
/// share of the tax pool to `claim_address`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInput {
    pub parent: StakeElement,
    pub claim_address: Address,
    pub public_key: VerifyingKey,
    pub signature: Signature,
}

/// Replaces a contract's terms in place. Requires both parties' signatures
/// over the new revision and a strictly higher revision number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRevision {
    pub parent: ContractElement,
    pub revision: StorageContract,
    pub renter_signature: Signature,
    pub host_signature: Signature,
}

/// Ends one contract and begins its successor atomically. The rollovers are
/// the portions of the final revision's outputs carried directly into the
/// new contract rather than disbursed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRenewal {
    pub final_revision: StorageContract,
    pub initial_revision: StorageContract,
    pub renter_rollover: Currency,
    pub host_rollover: Currency,
    pub renter_signature: Signature,
    pub host_signature: Signature,
}

/// Proves a stored file segment against the contract's file Merkle root.
/// Contracts with a zero filesize need no proof body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    pub leaf_index: u64,
    pub leaf: Vec<u8>,
    pub proof: Vec<FixedHash>,
}

/// Terminates a contract early by mutual consent, with the embedded terms
/// deciding the payouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFinalization {
    pub contract: StorageContract,
    pub renter_signature: Signature,
    pub host_signature: Signature,
}

/// The four ways a contract leaves the live set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Renewal(ContractRenewal),
    StorageProof(StorageProof),
    Finalization(ContractFinalization),
    Expiration,
}

/// Resolves a contract, disbursing its outputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractResolution {
    pub parent: ContractElement,
    pub resolution: Resolution,
}

/// A Basalt transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub coin_inputs: Vec<CoinInput>,
    pub coin_outputs: Vec<CoinOutput>,
    pub stake_inputs: Vec<StakeInput>,
    pub stake_outputs: Vec<StakeOutput>,
    pub contracts: Vec<StorageContract>,
    pub contract_revisions: Vec<ContractRevision>,
    pub contract_resolutions: Vec<ContractResolution>,
    pub new_foundation_address: Option<Address>,
    pub miner_fee: Currency,
    pub arbitrary_data: Vec<u8>,
}

impl Transaction {
    /// The transaction id: a domain-separated hash of the canonical
    /// encoding. Signatures are not part of the canonical encoding, so ids
    /// are not malleable by re-signing.
    pub fn id(&self) -> FixedHash {
        ConsensusHasher::new("transaction").chain(self).finalize()
    }
}

// Canonical encodings. Signatures are deliberately excluded everywhere:
// they are checked against the sig hash, which is itself derived from this
// encoding.

impl ConsensusEncoding for CoinInput {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.parent.state.id.consensus_encode(writer)?;
        written += self.parent.output.consensus_encode(writer)?;
        written += self.parent.maturity_height.consensus_encode(writer)?;
        written += self.public_key.consensus_encode(writer)?;
        Ok(written)
    }
}

impl ConsensusEncoding for StakeInput {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.parent.state.id.consensus_encode(writer)?;
        written += self.parent.output.consensus_encode(writer)?;
        written += self.parent.claim_start.consensus_encode(writer)?;
        written += self.claim_address.consensus_encode(writer)?;
        written += self.public_key.consensus_encode(writer)?;
        Ok(written)
    }
}

impl ConsensusEncoding for ContractRevision {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.parent.state.id.consensus_encode(writer)?;
        written += self.parent.contract.consensus_encode(writer)?;
        written += self.revision.consensus_encode(writer)?;
        Ok(written)
    }
}

impl ConsensusEncoding for StorageProof {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.leaf_index.consensus_encode(writer)?;
        written += self.leaf.as_slice().consensus_encode(writer)?;
        written += self.proof.consensus_encode(writer)?;
        Ok(written)
    }
}

impl ConsensusEncoding for Resolution {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        match self {
            Resolution::Renewal(renewal) => {
                let mut written = 0u8.consensus_encode(writer)?;
                written += renewal.final_revision.consensus_encode(writer)?;
                written += renewal.initial_revision.consensus_encode(writer)?;
                written += renewal.renter_rollover.consensus_encode(writer)?;
                written += renewal.host_rollover.consensus_encode(writer)?;
                Ok(written)
            },
            Resolution::StorageProof(proof) => {
                let mut written = 1u8.consensus_encode(writer)?;
                written += proof.consensus_encode(writer)?;
                Ok(written)
            },
            Resolution::Finalization(finalization) => {
                let mut written = 2u8.consensus_encode(writer)?;
                written += finalization.contract.consensus_encode(writer)?;
                Ok(written)
            },
            Resolution::Expiration => 3u8.consensus_encode(writer),
        }
    }
}

impl ConsensusEncoding for ContractResolution {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.parent.state.id.consensus_encode(writer)?;
        written += self.parent.contract.consensus_encode(writer)?;
        written += self.resolution.consensus_encode(writer)?;
        Ok(written)
    }
}

impl ConsensusEncoding for Transaction {
    fn consensus_encode<W: Write>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut written = self.coin_inputs.consensus_encode(writer)?;
        written += self.coin_outputs.consensus_encode(writer)?;
        written += self.stake_inputs.consensus_encode(writer)?;
        written += self.stake_outputs.consensus_encode(writer)?;
        written += self.contracts.consensus_encode(writer)?;
        written += self.contract_revisions.consensus_encode(writer)?;
        written += self.contract_resolutions.consensus_encode(writer)?;
        written += self.new_foundation_address.consensus_encode(writer)?;
        written += self.miner_fee.consensus_encode(writer)?;
        written += self.arbitrary_data.as_slice().consensus_encode(writer)?;
        Ok(written)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn id_ignores_signatures() {
        let (key, address) = crate::test_helpers::testing_keypair(1);
        let parent = CoinElement {
            state: crate::transactions::StateElement::new(crate::transactions::ElementId {
                source: FixedHash::zero(),
                index: 0,
            }),
            output: CoinOutput {
                value: Currency::coins(3),
                address,
            },
            maturity_height: 0,
        };
        let mut txn = Transaction {
            coin_inputs: vec![CoinInput {
                parent,
                public_key: key.verifying_key(),
                signature: crate::test_helpers::placeholder_signature(),
            }],
            coin_outputs: vec![CoinOutput {
                value: Currency::coins(3),
                address,
            }],
            ..Default::default()
        };
        let unsigned_id = txn.id();
        use ed25519_dalek::Signer;
        txn.coin_inputs[0].signature = key.sign(b"anything at all");
        assert_eq!(txn.id(), unsigned_id);
    }

    #[test]
    fn id_commits_to_outputs() {
        let txn = Transaction {
            coin_outputs: vec![CoinOutput {
                value: Currency::coins(1),
                address: Address::VOID,
            }],
            ..Default::default()
        };
        let mut other = txn.clone();
        other.coin_outputs[0].value = Currency::coins(2);
        assert_ne!(txn.id(), other.id());
    }
}
