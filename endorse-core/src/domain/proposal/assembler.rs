use super::types::{Identity, InvocationRequest, Nonce, UnsignedProposal};
use crate::domain::digest::DigestEngine;
use crate::foundation::{AssemblyError, EndorseError, TxId, DERIVED_NONCE_DOMAIN, NONCE_SIZE, PAYLOAD_ENCODING_VERSION};
use bincode::Options;
use log::debug;
use serde::Serialize;

#[derive(Serialize)]
struct Creator<'a> {
    msp_id: &'a str,
    certificate: &'a [u8],
}

#[derive(Serialize)]
struct ProposalEnvelope<'a> {
    version: u8,
    tx_id: [u8; 32],
    nonce: Nonce,
    channel: &'a str,
    contract: &'a str,
    function: &'a str,
    args: &'a [Vec<u8>],
    creator: Creator<'a>,
}

#[derive(Serialize)]
struct NonceSeed<'a> {
    channel: &'a str,
    contract: &'a str,
    function: &'a str,
    args: &'a [Vec<u8>],
    creator: Creator<'a>,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AssemblyError> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .serialize(value)
        .map_err(|err| AssemblyError::Encoding { details: err.to_string() })
}

/// Builds canonical proposal payloads. Pure: the same request and identity always produce the
/// same bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProposalAssembler;

impl ProposalAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, request: &InvocationRequest, identity: &Identity) -> Result<UnsignedProposal, EndorseError> {
        validate(request, identity)?;

        let creator = Creator { msp_id: identity.msp_id.as_str(), certificate: &identity.certificate };
        let creator_bytes = encode(&creator)?;
        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => derive_nonce(request, identity)?,
        };
        let tx_id = TxId::new(*DigestEngine::digest_parts(&[nonce.as_slice(), creator_bytes.as_slice()]).as_hash());

        let envelope = ProposalEnvelope {
            version: PAYLOAD_ENCODING_VERSION,
            tx_id: *tx_id.as_hash(),
            nonce,
            channel: request.channel.as_str(),
            contract: request.contract.as_str(),
            function: &request.function,
            args: &request.args,
            creator,
        };
        let payload = encode(&envelope)?;
        debug!(
            "proposal assembled tx_id={} channel={} contract={} function={} payload_len={}",
            tx_id,
            request.channel,
            request.contract,
            request.function,
            payload.len()
        );

        Ok(UnsignedProposal { payload, request: request.clone(), msp_id: identity.msp_id.clone(), tx_id, nonce })
    }
}

fn validate(request: &InvocationRequest, identity: &Identity) -> Result<(), EndorseError> {
    if request.function.trim().is_empty() {
        return Err(EndorseError::invalid_request("function name is empty"));
    }
    if request.channel.is_blank() {
        return Err(EndorseError::invalid_request("channel identifier is missing"));
    }
    if request.contract.is_blank() {
        return Err(EndorseError::invalid_request("contract identifier is missing"));
    }
    if identity.reference != request.identity {
        return Err(EndorseError::invalid_request(format!(
            "identity {} does not match requesting identity {}",
            identity.reference, request.identity
        )));
    }
    if identity.msp_id.is_blank() {
        return Err(EndorseError::invalid_request(format!("identity {} has no MSP id", identity.reference)));
    }
    if identity.certificate.is_empty() {
        return Err(EndorseError::invalid_request(format!("identity {} has an empty certificate", identity.reference)));
    }
    Ok(())
}

fn derive_nonce(request: &InvocationRequest, identity: &Identity) -> Result<Nonce, AssemblyError> {
    let seed = NonceSeed {
        channel: request.channel.as_str(),
        contract: request.contract.as_str(),
        function: &request.function,
        args: &request.args,
        creator: Creator { msp_id: identity.msp_id.as_str(), certificate: &identity.certificate },
    };
    let seed_bytes = encode(&seed)?;
    let digest = DigestEngine::digest_parts(&[DERIVED_NONCE_DOMAIN, seed_bytes.as_slice()]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&digest.as_slice()[..NONCE_SIZE]);
    Ok(nonce)
}
