use crate::domain::digest::DigestEngine;
use crate::domain::signature::{Signature, SignatureEngine};
use crate::foundation::{ChannelId, ContractId, Digest, IdentityRef, MspId, SigningError, TxId, NONCE_SIZE};
use serde::{Deserialize, Serialize};

pub type Nonce = [u8; NONCE_SIZE];

/// A contract function call to be endorsed and committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub channel: ChannelId,
    pub contract: ContractId,
    pub function: String,
    pub args: Vec<Vec<u8>>,
    pub identity: IdentityRef,
    /// Explicit nonce; when absent one is derived from the request and signer certificate.
    #[serde(default)]
    pub nonce: Option<Nonce>,
}

impl InvocationRequest {
    pub fn new(channel: impl Into<ChannelId>, contract: impl Into<ContractId>, function: impl Into<String>, identity: impl Into<IdentityRef>) -> Self {
        Self { channel: channel.into(), contract: contract.into(), function: function.into(), args: Vec::new(), identity: identity.into(), nonce: None }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Fresh random nonce, for submitting the same logical call more than once.
    pub fn with_random_nonce(self) -> Self {
        self.with_nonce(rand::random::<Nonce>())
    }
}

/// Signer identity as embedded in the proposal header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub reference: IdentityRef,
    pub msp_id: MspId,
    /// PEM or DER certificate bytes, opaque to this crate.
    pub certificate: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedProposal {
    pub(crate) payload: Vec<u8>,
    pub(crate) request: InvocationRequest,
    pub(crate) msp_id: MspId,
    pub(crate) tx_id: TxId,
    pub(crate) nonce: Nonce,
}

impl UnsignedProposal {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn request(&self) -> &InvocationRequest {
        &self.request
    }

    pub fn msp_id(&self) -> &MspId {
        &self.msp_id
    }

    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    pub fn digest(&self) -> Digest {
        DigestEngine::digest(&self.payload)
    }
}

/// An unsigned proposal with a canonical (low-S) signature over its digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedProposal {
    proposal: UnsignedProposal,
    signature: Signature,
    signature_der: Vec<u8>,
    signer: IdentityRef,
}

impl SignedProposal {
    pub fn new(proposal: UnsignedProposal, signature: Signature, signer: IdentityRef) -> Result<Self, SigningError> {
        if !signature.is_low_s() {
            return Err(SigningError::encoding("proposal signature is not in low-S form"));
        }
        let signature_der = SignatureEngine::new().encode(&signature)?;
        Ok(Self { proposal, signature, signature_der, signer })
    }

    /// Attach a DER signature produced outside this process.
    ///
    /// The signature is normalized to low-S and must verify against `public_key` (SEC1).
    pub fn from_external_signature(
        proposal: UnsignedProposal,
        signature_der: &[u8],
        public_key: &[u8],
        signer: IdentityRef,
    ) -> Result<Self, SigningError> {
        let engine = SignatureEngine::new();
        let signature = engine.normalize(&engine.decode(signature_der)?);
        if !engine.verify(&proposal.digest(), &signature, public_key)? {
            return Err(SigningError::encoding("external signature does not verify against the proposal digest"));
        }
        Self::new(proposal, signature, signer)
    }

    pub fn proposal(&self) -> &UnsignedProposal {
        &self.proposal
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signature_der(&self) -> &[u8] {
        &self.signature_der
    }

    pub fn signer(&self) -> &IdentityRef {
        &self.signer
    }

    pub fn tx_id(&self) -> TxId {
        self.proposal.tx_id
    }
}
