use crate::application::commit::CommitCoordinator;
use crate::application::endorsement::{EndorsementCoordinator, QuorateRound};
use crate::application::lifecycle::RoundObserver;
use crate::domain::{
    CommitResult, EndorsementResponse, InvocationRequest, ProposalAssembler, SignatureEngine, SignedCommitTransaction, SignedProposal,
    UnsignedCommitTransaction, UnsignedProposal,
};
use crate::foundation::{IdentityRef, Result, TxId};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::keys::IdentityProvider;
use crate::infrastructure::transport::{CommitTransport, PeerDiscovery, PeerTransport};
use log::info;
use std::sync::Arc;

/// Outcome of a full submit: endorsed, ordered and committed per the commit strategy.
#[derive(Clone, Debug)]
pub struct SubmitResult {
    pub tx_id: TxId,
    /// Simulation result agreed by every endorsing peer.
    pub payload: Vec<u8>,
    pub endorsements: Vec<EndorsementResponse>,
    pub commit: CommitResult,
}

/// Entry point for applications: wires identities, both coordinators and the engines.
///
/// `submit` and `evaluate` run the whole pipeline. The step methods (`prepare_proposal`,
/// `endorse`, `prepare_commit`, `commit`) support signing outside this process.
pub struct Gateway {
    identities: Arc<dyn IdentityProvider>,
    assembler: ProposalAssembler,
    engine: SignatureEngine,
    endorsement: EndorsementCoordinator,
    commit: CommitCoordinator,
}

impl Gateway {
    pub fn new(
        config: &AppConfig,
        identities: Arc<dyn IdentityProvider>,
        discovery: Arc<dyn PeerDiscovery>,
        peers: Arc<dyn PeerTransport>,
        orderer: Arc<dyn CommitTransport>,
    ) -> Self {
        Self {
            identities,
            assembler: ProposalAssembler::new(),
            engine: SignatureEngine::new(),
            endorsement: EndorsementCoordinator::new(discovery, peers, config.endorsement.clone(), config.discovery.clone()),
            commit: CommitCoordinator::new(orderer, config.commit.clone()),
        }
    }

    pub fn with_observer(self, observer: Arc<dyn RoundObserver>) -> Self {
        Self {
            endorsement: self.endorsement.with_observer(observer.clone()),
            commit: self.commit.with_observer(observer),
            ..self
        }
    }

    pub fn endorsement_coordinator(&self) -> &EndorsementCoordinator {
        &self.endorsement
    }

    pub fn commit_coordinator(&self) -> &CommitCoordinator {
        &self.commit
    }

    /// Assemble the unsigned proposal; its `digest()` is what an external signer signs.
    pub async fn prepare_proposal(&self, request: &InvocationRequest) -> Result<UnsignedProposal> {
        let identity = self.identities.identity(&request.identity).await?;
        self.assembler.assemble(request, &identity)
    }

    pub async fn sign_proposal(&self, proposal: UnsignedProposal) -> Result<SignedProposal> {
        let signer = proposal.request().identity.clone();
        let signature = {
            let key = self.identities.private_key(&signer).await?;
            self.engine.sign_canonical(&proposal.digest(), &key)?
        };
        Ok(SignedProposal::new(proposal, signature, signer)?)
    }

    pub async fn endorse(&self, proposal: &SignedProposal) -> Result<QuorateRound> {
        self.endorsement.endorse(proposal).await
    }

    pub fn prepare_commit(&self, proposal: &SignedProposal, round: &QuorateRound) -> Result<UnsignedCommitTransaction> {
        self.commit.build_commit(proposal.proposal().clone(), round.endorsements.clone())
    }

    pub async fn sign_commit(&self, transaction: UnsignedCommitTransaction, signer: &IdentityRef) -> Result<SignedCommitTransaction> {
        let key = self.identities.private_key(signer).await?;
        self.commit.sign(transaction, &key)
    }

    /// Submit a signed commit; events are awaited from the peers of `round`.
    pub async fn commit(&self, transaction: &SignedCommitTransaction, round: &QuorateRound) -> Result<CommitResult> {
        let own_msp = transaction.transaction().proposal().msp_id().clone();
        self.commit.submit(transaction, &own_msp, &round.peers).await
    }

    pub async fn submit(&self, request: &InvocationRequest) -> Result<SubmitResult> {
        let proposal = self.prepare_proposal(request).await?;
        let signed = self.sign_proposal(proposal).await?;
        let tx_id = signed.tx_id();
        info!("submitting transaction tx_id={} channel={} contract={} function={}", tx_id, request.channel, request.contract, request.function);

        let round = self.endorse(&signed).await?;
        let unsigned = self.prepare_commit(&signed, &round)?;
        let payload = unsigned.endorsements().first().map(|response| response.payload.clone()).unwrap_or_default();
        let transaction = self.sign_commit(unsigned, &request.identity).await?;
        let commit = self.commit(&transaction, &round).await?;
        Ok(SubmitResult { tx_id, payload, endorsements: round.endorsements, commit })
    }

    /// Run the proposal on a single peer and return its result without ordering anything.
    pub async fn evaluate(&self, request: &InvocationRequest) -> Result<Vec<u8>> {
        let proposal = self.prepare_proposal(request).await?;
        let signed = self.sign_proposal(proposal).await?;
        let response = self.endorsement.query(&signed).await?;
        Ok(response.payload)
    }
}
