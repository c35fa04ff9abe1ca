use crate::application::lifecycle::{NoopObserver, RoundObserver};
use crate::domain::{EndorsementPolicy, EndorsementResponse, EndorsementSet, PeerEndpoint, QuorumDecision, RoundPhase, SignedProposal};
use crate::foundation::{ChannelId, DiscoveryError, EndorseError, EndorsementError, MspId, PeerFailure, Result, TxId};
use crate::infrastructure::config::{DiscoveryConfig, EndorsementConfig};
use crate::infrastructure::retry::retry_with_backoff;
use crate::infrastructure::transport::{PeerDiscovery, PeerTransport};
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::{timeout, timeout_at, Instant};

/// A round that reached quorum.
#[derive(Clone, Debug)]
pub struct QuorateRound {
    pub tx_id: TxId,
    /// The policy the round was judged against.
    pub policy: EndorsementPolicy,
    /// Peers the proposal was dispatched to.
    pub peers: Vec<PeerEndpoint>,
    /// One successful response per distinct peer, ordered by peer id.
    pub endorsements: Vec<EndorsementResponse>,
}

struct PhaseTracker<'a> {
    tx_id: TxId,
    phase: RoundPhase,
    observer: &'a dyn RoundObserver,
}

impl PhaseTracker<'_> {
    fn advance(&mut self, to: RoundPhase) -> Result<()> {
        let next = self.phase.transition(to)?;
        self.observer.on_phase_changed(&self.tx_id, self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn fail(&mut self, error: &EndorseError) {
        if self.phase.can_transition_to(RoundPhase::Failed) {
            self.observer.on_phase_changed(&self.tx_id, self.phase, RoundPhase::Failed);
            self.phase = RoundPhase::Failed;
        }
        self.observer.on_round_failed(&self.tx_id, error);
    }
}

/// Drives one endorsement round per signed proposal: discovery, concurrent fan-out, aggregation
/// and the quorum decision.
pub struct EndorsementCoordinator {
    discovery: Arc<dyn PeerDiscovery>,
    transport: Arc<dyn PeerTransport>,
    config: EndorsementConfig,
    discovery_config: DiscoveryConfig,
    observer: Arc<dyn RoundObserver>,
}

impl EndorsementCoordinator {
    pub fn new(discovery: Arc<dyn PeerDiscovery>, transport: Arc<dyn PeerTransport>, config: EndorsementConfig, discovery_config: DiscoveryConfig) -> Self {
        Self { discovery, transport, config, discovery_config, observer: Arc::new(NoopObserver) }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RoundObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &EndorsementConfig {
        &self.config
    }

    /// Endorsing peers for `channel`, scoped to the organizations the quorum rule names.
    ///
    /// Discovery failures are retried with backoff; an empty result is `NoPeersAvailable`.
    pub async fn discover(&self, channel: &ChannelId) -> Result<Vec<PeerEndpoint>> {
        let scope = self.config.quorum.discovery_scope();
        let discovered = if self.discovery_config.enabled {
            let discovery = self.discovery.as_ref();
            let scope = &scope;
            retry_with_backoff(&self.discovery_config.retry, "discover_peers", move || discovery.discover_peers(channel, scope)).await?
        } else {
            self.discovery_config
                .static_peers
                .iter()
                .filter(|peer| scope.is_empty() || scope.contains(&peer.msp_id))
                .cloned()
                .collect()
        };

        let mut peers: Vec<PeerEndpoint> = Vec::with_capacity(discovered.len());
        for peer in discovered {
            let peer = if self.discovery_config.as_localhost { peer.as_localhost() } else { peer };
            if !peers.contains(&peer) {
                peers.push(peer);
            }
        }
        if peers.is_empty() {
            return Err(DiscoveryError::NoPeersAvailable { channel: channel.clone() }.into());
        }
        debug!("peers discovered channel={} count={} static={}", channel, peers.len(), !self.discovery_config.enabled);
        Ok(peers)
    }

    /// Run a full round for `proposal`. Stragglers are abandoned as soon as the round is decided.
    pub async fn endorse(&self, proposal: &SignedProposal) -> Result<QuorateRound> {
        let tx_id = proposal.tx_id();
        let mut tracker = PhaseTracker { tx_id, phase: RoundPhase::Draft, observer: self.observer.as_ref() };
        info!("endorsement round started tx_id={} channel={}", tx_id, proposal.proposal().request().channel);

        let result = self.run_round(&mut tracker, proposal).await;
        match &result {
            Ok(round) => {
                self.observer.on_quorate(&tx_id, round.endorsements.len());
            }
            Err(err) => tracker.fail(err),
        }
        result
    }

    async fn run_round(&self, tracker: &mut PhaseTracker<'_>, proposal: &SignedProposal) -> Result<QuorateRound> {
        tracker.advance(RoundPhase::Discovering)?;
        let peers = self.discover(&proposal.proposal().request().channel).await?;
        let policy = self.config.quorum.resolve(&peers);

        tracker.advance(RoundPhase::AwaitingEndorsements)?;
        let endorsements = self.collect(proposal, &peers, &policy).await?;

        tracker.advance(RoundPhase::Quorate)?;
        Ok(QuorateRound { tx_id: proposal.tx_id(), policy, peers, endorsements })
    }

    async fn collect(&self, proposal: &SignedProposal, peers: &[PeerEndpoint], policy: &EndorsementPolicy) -> Result<Vec<EndorsementResponse>> {
        let tx_id = proposal.tx_id();
        // Discovery time does not count against the round.
        let deadline = Instant::now() + self.config.timeout();
        let transport = self.transport.as_ref();
        let observer = self.observer.as_ref();

        let mut outstanding: Vec<PeerEndpoint> = peers.to_vec();
        let mut set = EndorsementSet::new();
        let mut decision = set.evaluate(policy, &organizations(&outstanding));

        let mut calls = stream::iter(peers.iter().cloned())
            .map(|peer| {
                observer.on_dispatched(&tx_id, &peer);
                async move {
                    let result = transport.send_proposal(&peer, proposal).await;
                    (peer, result)
                }
            })
            .buffer_unordered(self.config.max_concurrent_peers.max(1));

        loop {
            match decision {
                QuorumDecision::Quorate => {
                    if !outstanding.is_empty() {
                        debug!("quorum reached; abandoning stragglers tx_id={} outstanding={}", tx_id, outstanding.len());
                    }
                    return Ok(set.into_endorsements());
                }
                QuorumDecision::Rejected { peer, reason } => {
                    return Err(EndorsementError::PeerRejected { peer, reason }.into());
                }
                QuorumDecision::Unsatisfiable => return Err(not_satisfied(policy, &set, false)),
                QuorumDecision::Pending => {}
            }

            let (peer, result) = match timeout_at(deadline, calls.next()).await {
                Ok(Some(completed)) => completed,
                Ok(None) => return Err(not_satisfied(policy, &set, false)),
                Err(_) => {
                    warn!(
                        "endorsement round timed out tx_id={} timeout_ms={} outstanding={}",
                        tx_id,
                        self.config.timeout_ms,
                        outstanding.len()
                    );
                    for peer in &outstanding {
                        set.record_failure(peer.name.clone(), format!("no response within {}ms", self.config.timeout_ms));
                    }
                    return Err(not_satisfied(policy, &set, true));
                }
            };

            if let Some(idx) = outstanding.iter().position(|pending| pending == &peer) {
                outstanding.swap_remove(idx);
            }

            match result {
                Ok(response) if response.peer != peer.name || response.msp_id != peer.msp_id => {
                    let details = format!("response identity {}({}) does not match endpoint", response.peer, response.msp_id);
                    observer.on_peer_failed(&tx_id, &peer.name, &details);
                    set.record_failure(peer.name.clone(), details);
                }
                Ok(response) => {
                    observer.on_response(&tx_id, &response);
                    if !set.record(response) {
                        observer.on_duplicate_dropped(&tx_id, &peer.name);
                    }
                }
                Err(err) => {
                    let details = err.to_string();
                    observer.on_peer_failed(&tx_id, &peer.name, &details);
                    set.record_failure(peer.name.clone(), details);
                }
            }
            decision = set.evaluate(policy, &organizations(&outstanding));
        }
    }

    /// Send `proposal` to one peer at a time until one answers; for read-only queries.
    ///
    /// A rejection is returned as `PeerRejected`. If every peer fails in transit the error lists them.
    pub async fn query(&self, proposal: &SignedProposal) -> Result<EndorsementResponse> {
        let peers = self.discover(&proposal.proposal().request().channel).await?;
        let mut failures = Vec::new();
        for peer in &peers {
            self.observer.on_dispatched(&proposal.tx_id(), peer);
            let outcome = timeout(self.config.timeout(), self.transport.send_proposal(peer, proposal)).await;
            match outcome {
                Ok(Ok(response)) => {
                    if let Some(reason) = response.rejection_reason() {
                        return Err(EndorsementError::PeerRejected { peer: response.peer.clone(), reason: reason.to_string() }.into());
                    }
                    return Ok(response);
                }
                Ok(Err(err)) => failures.push(PeerFailure { peer: peer.name.clone(), details: err.to_string() }),
                Err(_) => failures.push(PeerFailure { peer: peer.name.clone(), details: format!("no response within {}ms", self.config.timeout_ms) }),
            }
            debug!("query peer failed; trying next tx_id={} peer={}", proposal.tx_id(), peer.name);
        }
        Err(EndorsementError::PolicyNotSatisfied {
            policy: "any single peer".to_string(),
            satisfied_orgs: Vec::new(),
            endorsements: 0,
            timed_out: false,
            failures,
        }
        .into())
    }
}

fn organizations(peers: &[PeerEndpoint]) -> BTreeSet<MspId> {
    peers.iter().map(|peer| peer.msp_id.clone()).collect()
}

fn not_satisfied(policy: &EndorsementPolicy, set: &EndorsementSet, timed_out: bool) -> EndorseError {
    EndorsementError::PolicyNotSatisfied {
        policy: policy.to_string(),
        satisfied_orgs: set.endorsing_orgs().into_iter().collect(),
        endorsements: set.endorsements().count(),
        timed_out,
        failures: set.failures(),
    }
    .into()
}
