use crate::domain::digest::DigestEngine;
use crate::domain::endorsement::EndorsementResponse;
use crate::domain::proposal::{encode, UnsignedProposal};
use crate::domain::signature::{Signature, SignatureEngine};
use crate::foundation::{CommitError, Digest, EndorseError, SigningError, TxId, PAYLOAD_ENCODING_VERSION};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize)]
struct EndorsementEntry<'a> {
    peer: &'a str,
    msp_id: &'a str,
    payload: &'a [u8],
    endorsement: &'a [u8],
}

#[derive(Serialize)]
struct CommitEnvelope<'a> {
    version: u8,
    tx_id: [u8; 32],
    proposal: &'a [u8],
    endorsements: Vec<EndorsementEntry<'a>>,
}

/// The proposal together with the endorsements that satisfied its policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedCommitTransaction {
    proposal: UnsignedProposal,
    endorsements: Vec<EndorsementResponse>,
    payload: Vec<u8>,
}

impl UnsignedCommitTransaction {
    pub fn proposal(&self) -> &UnsignedProposal {
        &self.proposal
    }

    /// Endorsements ordered by peer id.
    pub fn endorsements(&self) -> &[EndorsementResponse] {
        &self.endorsements
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn tx_id(&self) -> TxId {
        self.proposal.tx_id()
    }

    pub fn digest(&self) -> Digest {
        DigestEngine::digest(&self.payload)
    }
}

/// Build the commit transaction from endorsements already judged quorate by the caller.
///
/// Rejects an empty list, failed endorsements, repeated peers and diverging simulation results.
pub fn build_commit(proposal: UnsignedProposal, mut endorsements: Vec<EndorsementResponse>) -> Result<UnsignedCommitTransaction, EndorseError> {
    let invalid = |reason: String| EndorseError::Commit(CommitError::InvalidEndorsements { reason });

    if endorsements.is_empty() {
        return Err(invalid("no endorsements supplied".to_string()));
    }
    if let Some(failed) = endorsements.iter().find(|response| !response.is_success()) {
        return Err(invalid(format!("endorsement from {} is not successful", failed.peer)));
    }
    endorsements.sort_by(|a, b| a.peer.cmp(&b.peer));
    let mut seen = BTreeSet::new();
    for response in &endorsements {
        if !seen.insert(&response.peer) {
            return Err(invalid(format!("duplicate endorsement from {}", response.peer)));
        }
    }
    let reference = &endorsements[0];
    if let Some(diverging) = endorsements.iter().find(|response| response.payload != reference.payload) {
        return Err(invalid(format!("response payload from {} differs from {}", diverging.peer, reference.peer)));
    }

    let envelope = CommitEnvelope {
        version: PAYLOAD_ENCODING_VERSION,
        tx_id: *proposal.tx_id().as_hash(),
        proposal: proposal.payload(),
        endorsements: endorsements
            .iter()
            .map(|response| EndorsementEntry {
                peer: response.peer.as_str(),
                msp_id: response.msp_id.as_str(),
                payload: &response.payload,
                endorsement: &response.endorsement,
            })
            .collect(),
    };
    let payload = encode(&envelope).map_err(|err| EndorseError::SerializationError { format: "bincode".to_string(), details: err.to_string() })?;
    Ok(UnsignedCommitTransaction { proposal, endorsements, payload })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedCommitTransaction {
    transaction: UnsignedCommitTransaction,
    signature: Signature,
    signature_der: Vec<u8>,
}

impl SignedCommitTransaction {
    pub fn new(transaction: UnsignedCommitTransaction, signature: Signature) -> Result<Self, SigningError> {
        if !signature.is_low_s() {
            return Err(SigningError::encoding("commit signature is not in low-S form"));
        }
        let signature_der = SignatureEngine::new().encode(&signature)?;
        Ok(Self { transaction, signature, signature_der })
    }

    /// Attach a DER signature produced outside this process; normalized, then verified against `public_key`.
    pub fn from_external_signature(transaction: UnsignedCommitTransaction, signature_der: &[u8], public_key: &[u8]) -> Result<Self, SigningError> {
        let engine = SignatureEngine::new();
        let signature = engine.normalize(&engine.decode(signature_der)?);
        if !engine.verify(&transaction.digest(), &signature, public_key)? {
            return Err(SigningError::encoding("external signature does not verify against the commit digest"));
        }
        Self::new(transaction, signature)
    }

    pub fn transaction(&self) -> &UnsignedCommitTransaction {
        &self.transaction
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signature_der(&self) -> &[u8] {
        &self.signature_der
    }

    pub fn tx_id(&self) -> TxId {
        self.transaction.tx_id()
    }
}
