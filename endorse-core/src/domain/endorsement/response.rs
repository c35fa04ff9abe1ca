use crate::foundation::{MspId, PeerId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndorsementStatus {
    Success,
    /// Application-level refusal (chaincode error, policy or ACL failure).
    Rejected { reason: String },
}

/// One peer's answer to a signed proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementResponse {
    pub peer: PeerId,
    pub msp_id: MspId,
    pub status: EndorsementStatus,
    /// Simulation result; must be identical across endorsing peers.
    pub payload: Vec<u8>,
    /// The peer's signature over the payload, opaque to the client.
    pub endorsement: Vec<u8>,
}

impl EndorsementResponse {
    pub fn success(peer: impl Into<PeerId>, msp_id: impl Into<MspId>, payload: Vec<u8>, endorsement: Vec<u8>) -> Self {
        Self { peer: peer.into(), msp_id: msp_id.into(), status: EndorsementStatus::Success, payload, endorsement }
    }

    pub fn rejected(peer: impl Into<PeerId>, msp_id: impl Into<MspId>, reason: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            msp_id: msp_id.into(),
            status: EndorsementStatus::Rejected { reason: reason.into() },
            payload: Vec::new(),
            endorsement: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, EndorsementStatus::Success)
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.status {
            EndorsementStatus::Rejected { reason } => Some(reason),
            EndorsementStatus::Success => None,
        }
    }
}
