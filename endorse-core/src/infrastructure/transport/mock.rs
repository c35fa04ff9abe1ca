//! In-process peers and orderer for tests and local tooling.

use super::traits::{CommitEventSubscription, CommitTransport, PeerDiscovery, PeerEndpoint, PeerTransport};
use crate::domain::{CommitAck, CommitAckStatus, CommitEvent, DigestEngine, EndorsementResponse, SignedCommitTransaction, SignedProposal, ValidationCode};
use crate::foundation::{ChannelId, CommitError, DiscoveryError, EndorseError, MspId, PeerId, Result, TxId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerBehavior {
    /// Success with the payload every honest peer computes for the proposal.
    Endorse,
    /// Success with a chosen simulation result.
    EndorseWith { payload: Vec<u8> },
    Reject { reason: String },
    Unreachable { details: String },
    /// Never answers.
    Hang,
    Delay { delay: Duration, then: Box<PeerBehavior> },
}

impl PeerBehavior {
    pub fn reject(reason: impl Into<String>) -> Self {
        PeerBehavior::Reject { reason: reason.into() }
    }

    pub fn unreachable(details: impl Into<String>) -> Self {
        PeerBehavior::Unreachable { details: details.into() }
    }

    pub fn delayed(delay: Duration, then: PeerBehavior) -> Self {
        PeerBehavior::Delay { delay, then: Box::new(then) }
    }
}

/// Counts calls dropped before they produced a result.
struct AbandonGuard<'a> {
    abandoned: &'a AtomicUsize,
    armed: bool,
}

impl AbandonGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Scripted peers acting as both discovery service and endorsing peers.
#[derive(Default)]
pub struct MockPeerNetwork {
    peers: Mutex<Vec<PeerEndpoint>>,
    behaviors: Mutex<HashMap<PeerId, PeerBehavior>>,
    discovery_failures: AtomicU32,
    discovery_calls: AtomicUsize,
    calls: Mutex<Vec<PeerId>>,
    completed: AtomicUsize,
    abandoned: AtomicUsize,
}

impl MockPeerNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peer(self, peer: PeerEndpoint, behavior: PeerBehavior) -> Self {
        self.add_peer(peer, behavior);
        self
    }

    /// Adds the endpoint to discovery results (once per distinct endpoint) and sets its behavior.
    pub fn add_peer(&self, peer: PeerEndpoint, behavior: PeerBehavior) {
        self.behaviors.lock().insert(peer.name.clone(), behavior);
        let mut peers = self.peers.lock();
        if !peers.contains(&peer) {
            peers.push(peer);
        }
    }

    pub fn set_behavior(&self, peer: impl Into<PeerId>, behavior: PeerBehavior) {
        self.behaviors.lock().insert(peer.into(), behavior);
    }

    /// The next `count` discovery calls fail with `DiscoveryError::Unavailable`.
    pub fn fail_discovery(&self, count: u32) {
        self.discovery_failures.store(count, Ordering::SeqCst);
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    /// Peers contacted, in dispatch order.
    pub fn calls(&self) -> Vec<PeerId> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, peer: &str) -> usize {
        self.calls.lock().iter().filter(|called| called.as_str() == peer).count()
    }

    pub fn completed_calls(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Calls dropped by the caller before they finished.
    pub fn abandoned_calls(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, peer: &PeerId) -> PeerBehavior {
        self.behaviors.lock().get(peer).cloned().unwrap_or_else(|| PeerBehavior::unreachable("unknown peer"))
    }

    async fn respond(&self, peer: &PeerEndpoint, proposal: &SignedProposal, behavior: PeerBehavior) -> Result<EndorsementResponse> {
        let mut behavior = behavior;
        loop {
            match behavior {
                PeerBehavior::Delay { delay, then } => {
                    tokio::time::sleep(delay).await;
                    behavior = *then;
                }
                PeerBehavior::Hang => {
                    std::future::pending::<()>().await;
                }
                PeerBehavior::Endorse => {
                    let payload = DigestEngine::digest(proposal.proposal().payload()).as_slice().to_vec();
                    return Ok(endorse(peer, payload));
                }
                PeerBehavior::EndorseWith { payload } => return Ok(endorse(peer, payload)),
                PeerBehavior::Reject { reason } => return Ok(EndorsementResponse::rejected(peer.name.clone(), peer.msp_id.clone(), reason)),
                PeerBehavior::Unreachable { details } => {
                    return Err(EndorseError::Message(format!("peer {} unreachable at {}: {details}", peer.name, peer.url)));
                }
            }
        }
    }
}

fn endorse(peer: &PeerEndpoint, payload: Vec<u8>) -> EndorsementResponse {
    let endorsement = DigestEngine::digest_parts(&[peer.name.as_bytes(), payload.as_slice()]).as_slice().to_vec();
    EndorsementResponse::success(peer.name.clone(), peer.msp_id.clone(), payload, endorsement)
}

#[async_trait]
impl PeerDiscovery for MockPeerNetwork {
    async fn discover_peers(&self, channel: &ChannelId, organizations: &BTreeSet<MspId>) -> Result<Vec<PeerEndpoint>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.discovery_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.discovery_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(DiscoveryError::Unavailable { channel: channel.clone(), details: "discovery service unavailable".to_string() }.into());
        }
        let peers = self.peers.lock();
        Ok(peers.iter().filter(|peer| organizations.is_empty() || organizations.contains(&peer.msp_id)).cloned().collect())
    }
}

#[async_trait]
impl PeerTransport for MockPeerNetwork {
    async fn send_proposal(&self, peer: &PeerEndpoint, proposal: &SignedProposal) -> Result<EndorsementResponse> {
        self.calls.lock().push(peer.name.clone());
        let behavior = self.behavior_for(&peer.name);
        let guard = AbandonGuard { abandoned: &self.abandoned, armed: true };
        let result = self.respond(peer, proposal, behavior).await;
        guard.disarm();
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrdererBehavior {
    Accept,
    Reject { reason: String },
    /// Transport failure before the orderer saw the transaction.
    Unavailable { details: String },
    /// The acknowledgement never arrives.
    Hang,
    Delay { delay: Duration },
    /// Records the submission but acknowledges an unrelated transaction id.
    AcknowledgeOther,
}

/// What the event stream does after emitting the scripted commit events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamEnd {
    #[default]
    StayOpen,
    Close,
    /// The stream yields a transport error.
    Fail,
}

/// Scripted ordering service plus commit event source.
///
/// Accepted transactions are announced to subscribers, which then emit one event per configured
/// committing peer.
pub struct MockOrderer {
    behavior: Mutex<OrdererBehavior>,
    committers: Mutex<Vec<(PeerEndpoint, ValidationCode)>>,
    stream_end: Mutex<StreamEnd>,
    accepted: broadcast::Sender<TxId>,
    submissions: Mutex<Vec<TxId>>,
    subscriptions: AtomicUsize,
    next_block: AtomicU64,
}

impl Default for MockOrderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderer {
    pub fn new() -> Self {
        Self {
            behavior: Mutex::new(OrdererBehavior::Accept),
            committers: Mutex::new(Vec::new()),
            stream_end: Mutex::new(StreamEnd::StayOpen),
            accepted: broadcast::channel(64).0,
            submissions: Mutex::new(Vec::new()),
            subscriptions: AtomicUsize::new(0),
            next_block: AtomicU64::new(1),
        }
    }

    pub fn with_behavior(self, behavior: OrdererBehavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    /// `peer` reports a commit event with `validation` for every accepted transaction.
    pub fn with_committer(self, peer: PeerEndpoint, validation: ValidationCode) -> Self {
        self.committers.lock().push((peer, validation));
        self
    }

    pub fn with_stream_end(self, end: StreamEnd) -> Self {
        *self.stream_end.lock() = end;
        self
    }

    pub fn set_behavior(&self, behavior: OrdererBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn submissions(&self) -> Vec<TxId> {
        self.submissions.lock().clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    fn accept(&self, tx_id: TxId) -> CommitAck {
        // No subscribers is not an error: strategy `none` never listens.
        let _ = self.accepted.send(tx_id);
        CommitAck { tx_id, status: CommitAckStatus::Accepted }
    }
}

#[async_trait]
impl CommitTransport for MockOrderer {
    async fn submit_commit(&self, transaction: &SignedCommitTransaction) -> Result<CommitAck> {
        let tx_id = transaction.tx_id();
        let behavior = self.behavior.lock().clone();
        match behavior {
            OrdererBehavior::Accept => {
                self.submissions.lock().push(tx_id);
                Ok(self.accept(tx_id))
            }
            OrdererBehavior::Delay { delay } => {
                tokio::time::sleep(delay).await;
                self.submissions.lock().push(tx_id);
                Ok(self.accept(tx_id))
            }
            OrdererBehavior::Reject { reason } => {
                self.submissions.lock().push(tx_id);
                Ok(CommitAck { tx_id, status: CommitAckStatus::Rejected { reason } })
            }
            OrdererBehavior::Unavailable { details } => Err(CommitError::Transport { tx_id, details }.into()),
            OrdererBehavior::AcknowledgeOther => {
                self.submissions.lock().push(tx_id);
                Ok(CommitAck { tx_id: TxId::new([0xee; 32]), status: CommitAckStatus::Accepted })
            }
            OrdererBehavior::Hang => {
                self.submissions.lock().push(tx_id);
                std::future::pending::<Result<CommitAck>>().await
            }
        }
    }

    async fn commit_events(&self, tx_id: &TxId) -> Result<CommitEventSubscription> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let tx_id = *tx_id;
        let committers = self.committers.lock().clone();
        let stream_end = *self.stream_end.lock();
        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst);
        let mut accepted = self.accepted.subscribe();

        let stream = async_stream::stream! {
            loop {
                match accepted.recv().await {
                    Ok(accepted_tx) if accepted_tx == tx_id => break,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
            for (peer, validation) in committers {
                yield Ok::<CommitEvent, EndorseError>(CommitEvent { tx_id, peer: peer.name, msp_id: peer.msp_id, block_number, validation });
            }
            match stream_end {
                StreamEnd::StayOpen => std::future::pending::<()>().await,
                StreamEnd::Fail => yield Err(EndorseError::Message("event stream reset by peer".to_string())),
                StreamEnd::Close => {}
            }
        };
        Ok(CommitEventSubscription::new(Box::pin(stream)))
    }
}
