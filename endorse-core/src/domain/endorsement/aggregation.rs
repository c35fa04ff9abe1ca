use super::policy::EndorsementPolicy;
use super::response::EndorsementResponse;
use crate::foundation::{MspId, PeerFailure, PeerId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuorumDecision {
    Quorate,
    /// At least one recorded response is a refusal; `peer` is the smallest rejecting peer id among
    /// the responses recorded so far.
    Rejected { peer: PeerId, reason: String },
    /// Still reachable with the outstanding peers.
    Pending,
    /// No combination of outstanding peers can satisfy the policy.
    Unsatisfiable,
}

/// Responses of one endorsement round, keyed by peer identity.
///
/// The first response recorded for a peer wins; later ones are dropped. Iteration and decisions
/// depend only on the set of responses, never on arrival order.
#[derive(Clone, Debug, Default)]
pub struct EndorsementSet {
    responses: BTreeMap<PeerId, EndorsementResponse>,
    failures: BTreeMap<PeerId, String>,
}

impl EndorsementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if this peer already answered.
    pub fn record(&mut self, response: EndorsementResponse) -> bool {
        if self.responses.contains_key(&response.peer) {
            return false;
        }
        self.failures.remove(&response.peer);
        self.responses.insert(response.peer.clone(), response);
        true
    }

    /// Note a transport failure. Ignored once the peer has a response.
    pub fn record_failure(&mut self, peer: PeerId, details: impl Into<String>) {
        if !self.responses.contains_key(&peer) {
            self.failures.entry(peer).or_insert_with(|| details.into());
        }
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.responses.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn endorsements(&self) -> impl Iterator<Item = &EndorsementResponse> {
        self.responses.values().filter(|response| response.is_success())
    }

    pub fn endorsing_orgs(&self) -> BTreeSet<MspId> {
        self.endorsements().map(|response| response.msp_id.clone()).collect()
    }

    pub fn failures(&self) -> Vec<PeerFailure> {
        self.failures.iter().map(|(peer, details)| PeerFailure { peer: peer.clone(), details: details.clone() }).collect()
    }

    pub fn first_rejection(&self) -> Option<(&PeerId, &str)> {
        self.responses.values().find_map(|response| response.rejection_reason().map(|reason| (&response.peer, reason)))
    }

    /// Decide the round given the organizations of peers still outstanding.
    pub fn evaluate(&self, policy: &EndorsementPolicy, outstanding_orgs: &BTreeSet<MspId>) -> QuorumDecision {
        if let Some((peer, reason)) = self.first_rejection() {
            return QuorumDecision::Rejected { peer: peer.clone(), reason: reason.to_string() };
        }
        let endorsed = self.endorsing_orgs();
        if policy.is_satisfied_by(&endorsed) {
            return QuorumDecision::Quorate;
        }
        let reachable: BTreeSet<MspId> = endorsed.union(outstanding_orgs).cloned().collect();
        if policy.is_satisfied_by(&reachable) {
            QuorumDecision::Pending
        } else {
            QuorumDecision::Unsatisfiable
        }
    }

    /// Successful endorsements ordered by peer id.
    pub fn into_endorsements(self) -> Vec<EndorsementResponse> {
        self.responses.into_values().filter(|response| response.is_success()).collect()
    }
}
