use crate::domain::endorsement::PeerEndpoint;
use crate::foundation::{CommitError, MspId, PeerId, TxId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordering service answer to a submitted commit transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAck {
    pub tx_id: TxId,
    pub status: CommitAckStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitAckStatus {
    Accepted,
    Rejected { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationCode {
    Valid,
    /// Ledger validation failure such as `MVCC_READ_CONFLICT` or `ENDORSEMENT_POLICY_FAILURE`.
    Invalid { code: String },
}

/// A peer reporting the block that committed (or invalidated) a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEvent {
    pub tx_id: TxId,
    pub peer: PeerId,
    pub msp_id: MspId,
    pub block_number: u64,
    pub validation: ValidationCode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub tx_id: TxId,
    pub strategy: CommitStrategy,
    /// Block reported by the first committing peer; `None` when no events were awaited.
    pub block_number: Option<u64>,
    pub committed_by: Vec<PeerId>,
}

/// Which commit events to wait for after the orderer accepted a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStrategy {
    /// Every peer of the submitter's organization.
    #[default]
    MspScopeAllForTx,
    MspScopeAnyForTx,
    NetworkScopeAllForTx,
    NetworkScopeAnyForTx,
    /// Return as soon as the orderer accepts.
    None,
}

impl CommitStrategy {
    fn is_msp_scoped(self) -> bool {
        matches!(self, CommitStrategy::MspScopeAllForTx | CommitStrategy::MspScopeAnyForTx)
    }

    fn needs_all(self) -> bool {
        matches!(self, CommitStrategy::MspScopeAllForTx | CommitStrategy::NetworkScopeAllForTx)
    }
}

/// Folds commit events into a completion decision for one transaction.
#[derive(Clone, Debug)]
pub struct CommitTracker {
    tx_id: TxId,
    strategy: CommitStrategy,
    scope: BTreeSet<PeerId>,
    committed: BTreeSet<PeerId>,
    block_number: Option<u64>,
}

impl CommitTracker {
    pub fn new(tx_id: TxId, strategy: CommitStrategy, own_msp: &MspId, peers: &[PeerEndpoint]) -> Self {
        let scope = match strategy {
            CommitStrategy::None => BTreeSet::new(),
            s if s.is_msp_scoped() => peers.iter().filter(|peer| &peer.msp_id == own_msp).map(|peer| peer.name.clone()).collect(),
            _ => peers.iter().map(|peer| peer.name.clone()).collect(),
        };
        Self { tx_id, strategy, scope, committed: BTreeSet::new(), block_number: None }
    }

    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    /// Peers whose events count toward completion.
    pub fn scope(&self) -> &BTreeSet<PeerId> {
        &self.scope
    }

    /// An empty scope completes on the orderer acknowledgement alone.
    pub fn requires_events(&self) -> bool {
        !self.scope.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        if !self.requires_events() {
            return true;
        }
        if self.strategy.needs_all() {
            self.scope.is_subset(&self.committed)
        } else {
            !self.committed.is_empty()
        }
    }

    /// Returns whether the strategy is now satisfied. Events for other transactions or peers
    /// outside the scope are ignored; an invalid validation code is a rejection.
    pub fn observe(&mut self, event: &CommitEvent) -> Result<bool, CommitError> {
        if event.tx_id != self.tx_id {
            return Ok(self.is_complete());
        }
        if let ValidationCode::Invalid { code } = &event.validation {
            return Err(CommitError::Rejected { tx_id: self.tx_id, reason: format!("peer {} reported validation code {code}", event.peer) });
        }
        if self.scope.contains(&event.peer) {
            self.committed.insert(event.peer.clone());
            self.block_number.get_or_insert(event.block_number);
        }
        Ok(self.is_complete())
    }

    pub fn into_result(self) -> CommitResult {
        CommitResult { tx_id: self.tx_id, strategy: self.strategy, block_number: self.block_number, committed_by: self.committed.into_iter().collect() }
    }
}
